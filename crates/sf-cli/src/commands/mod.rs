//! CLI subcommand implementations.

pub mod classify;
pub mod contrast;
pub mod key;
pub mod summary;
pub mod util;

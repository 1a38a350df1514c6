//! Shop-floor scheduling CLI library.
//!
//! This crate provides the `sf` command-line interface over `sf-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, KeyAction};
pub use config::Config;

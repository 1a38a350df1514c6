//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::classify::ClassifyArgs;
use crate::commands::summary::SummaryArgs;

/// Shop-floor scheduling payload tools.
///
/// Works offline on JSON captured from the Live and PE services: flattens
/// identifiers to wire keys, classifies jobs and resource events, and
/// summarizes event durations.
#[derive(Debug, Parser)]
#[command(name = "sf", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Encode, decode and compare identifiers.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Print a legible text color for each background color.
    Contrast {
        /// Background colors (6 or 8 hex digits, optional '#').
        #[arg(required = true, allow_hyphen_values = true)]
        colors: Vec<String>,
    },

    /// Normalize dates and classify the entries of a JSON payload.
    Classify(ClassifyArgs),

    /// Sum resource event durations per group and resource.
    Summary(SummaryArgs),
}

/// Identifier operations.
#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Encode identifier parts as a wire key.
    Encode {
        /// Parts in order. Integer text becomes an integer part.
        #[arg(allow_hyphen_values = true)]
        parts: Vec<String>,
    },

    /// Decode a wire key and print the identifier as JSON.
    Decode {
        /// The wire key (e.g. "GRP@12@3").
        #[arg(allow_hyphen_values = true)]
        key: String,
    },

    /// Compare two identifiers given as JSON or as wire keys.
    Equals {
        #[arg(allow_hyphen_values = true)]
        left: String,
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
}

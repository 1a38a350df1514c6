use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sf_cli::commands::{classify, contrast, key, summary};
use sf_cli::{Cli, Commands, Config, KeyAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout carries command output, so logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Key { action }) => match action {
            KeyAction::Encode { parts } => key::encode(&mut out, parts)?,
            KeyAction::Decode { key: wire_key } => key::decode(&mut out, wire_key)?,
            KeyAction::Equals { left, right } => key::equals(&mut out, left, right)?,
        },
        Some(Commands::Contrast { colors }) => contrast::run(&mut out, colors)?,
        Some(Commands::Classify(args)) => classify::run(&mut out, args, &config)?,
        Some(Commands::Summary(args)) => summary::run(&mut out, args, &config)?,
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}

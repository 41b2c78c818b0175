use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use madrasa_cli::commands::{class, summary};
use madrasa_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so report output on stdout stays machine-readable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Summary {
            window,
            subject,
            days,
            json,
        }) => {
            summary::run(&mut out, window, subject.as_deref(), *days, *json, &config)?;
        }
        Some(Commands::Class { window, json }) => {
            class::run(&mut out, window, *json, &config)?;
        }
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

//! Ion CLI - compiler driver for the Ion language

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use ion::frontend::IonFrontend;
use ion::ops::{Driver, DriverError};
use ion::util::config::{global_config_path, load_config, project_config_path};

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<DriverError>() {
            Some(err) => {
                eprint!("{}", err.render());
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("ion=debug")
        } else if cli.quiet {
            EnvFilter::new("ion=error")
        } else {
            EnvFilter::new("ion=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Merge config files under the command line
    let cwd = std::env::current_dir().context("failed to determine the current directory")?;
    let project_config = project_config_path(&cli.project_dir(&cwd));
    let config = load_config(global_config_path().as_deref(), &project_config);
    let options = cli.options().with_config(&config);

    let shell = Arc::new(cli.shell());
    let frontend = IonFrontend::new();

    Driver::new(shell, &frontend).process(&options)?;
    Ok(())
}

//! vedit CLI
//!
//! # Usage
//!
//! ```bash
//! vedit edit --input beach.mp4 --start 1000 --end 6000 --width 1280
//! vedit edit --input beach.mp4 --exact --width 720 --height 720 --json
//! vedit thumbnail --input beach.mp4 --at 2500 --width 320
//! vedit probe --input beach.mp4 --json
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use vedit::adapters::init_logging;
use vedit::cli::{commands, Cli, Commands};
use vedit::{DefaultAppContainer, VeditError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<VeditError>() {
            Some(vedit_err) => {
                if !vedit_err.already_reported() {
                    eprintln!("Error: {:#}", err);
                }
                error!(error = %vedit_err, "Command failed");
                ExitCode::from(u8::try_from(vedit_err.exit_code()).unwrap_or(1))
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = commands::resolve_config(&cli).context("Invalid configuration")?;
    init_logging(config.log_level, config.log_format);
    info!(output_dir = %config.output_dir.display(), "Starting vedit");

    let container = DefaultAppContainer::new(&config).context("Failed to initialize adapters")?;

    match cli.command {
        Commands::Edit(args) => commands::edit(&container, args).await?,
        Commands::Thumbnail(args) => commands::thumbnail(&container, args).await?,
        Commands::Probe(args) => commands::probe(&container, args).await?,
    }

    info!("vedit completed successfully");
    Ok(())
}

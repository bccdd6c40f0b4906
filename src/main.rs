//! Clipr - split a video into fixed-length clips
//!
//! # Usage
//!
//! ```bash
//! clipr split --input talk.mp4 --length 60 --crop --crop-ratio 9:16
//! clipr inspect --input talk.mp4 --length 60
//! clipr plan --input talk.mp4 --length 01:30
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use clipr::adapters::{LogFormat, TracingLogAdapter};
use clipr::app::container::DefaultAppContainer;
use clipr::cli::{commands, Cli, Commands};
use clipr::config_initialization::initialize_configuration_hierarchy;
use clipr::ports::{LogLevel, LogPort};

/// Main entry point for the Clipr CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let (config, warnings) = initialize_configuration_hierarchy(&cli)?;

    let level = if config.verbose {
        LogLevel::Debug
    } else {
        LogLevel::parse(&cli.log_level)?
    };
    let format = LogFormat::parse(&cli.log_format)?;
    let log_port: Arc<dyn LogPort> = Arc::new(TracingLogAdapter::init(level, format));

    info!("Starting Clipr");
    for warning in &warnings {
        warn!("{}", warning);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted. Stopping after cleaning up the current clip...");
            on_interrupt.cancel();
        }
    });

    let console = !matches!(&cli.command, Commands::Split(args) if args.json);
    let container = DefaultAppContainer::new(config.clone(), log_port, console);

    let code = match cli.command {
        Commands::Split(args) => {
            info!("Executing split command");
            commands::split(args, &container, cancel).await?
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args, &container).await?
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args, &container, &config).await?
        }
    };

    info!("Clipr finished with exit code {}", code);
    Ok(code)
}

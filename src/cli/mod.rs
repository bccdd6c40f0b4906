//! CLI module for Clipr
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Clipr - split a video into fixed-length clips
///
/// Each clip is encoded by ffmpeg on its own. Clips that already exist in the
/// export directory are skipped, so an interrupted run can simply be repeated.
#[derive(Parser, Debug)]
#[command(name = "clipr")]
#[command(about = "Split a video into fixed-length clips with ffmpeg")]
#[command(version)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true, env = "CLIPR_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: String,

    /// Configuration file (default: ./clipr.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging, same as --log-level debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a video into fixed-length clips
    Split(args::SplitArgs),
    /// Show duration and size of a video, and optionally a split preview
    Inspect(args::InspectArgs),
    /// Print the planned clips without encoding anything
    Plan(args::PlanArgs),
}

//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::rules::SegmentPlanner;
use crate::utils::time::TimeParser;

/// Parse a clip length given as seconds, `MM:SS` or `HH:MM:SS`; at least one second
pub fn parse_segment_length(value: &str) -> Result<f64, String> {
    let seconds = TimeParser::parse_time(value).map_err(|e| e.to_string())?;
    if seconds <= 0.0 {
        return Err(format!("clip length must be positive, got {}", value));
    }
    if seconds < SegmentPlanner::MIN_SEGMENT_LENGTH {
        return Err(format!("clip length must be at least 1 second, got {}", value));
    }
    Ok(seconds)
}

fn parse_workers(value: &str) -> Result<usize, String> {
    clap_num::number_range(value, 1, 256)
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Length of each clip (seconds, MM:SS or HH:MM:SS)
    #[arg(short, long, value_parser = parse_segment_length)]
    pub length: f64,

    /// Crop every clip to the configured aspect ratio
    #[arg(long)]
    pub crop: bool,

    /// Aspect ratio used with --crop (9:16, 1:1, 4:5, 4:3, 16:9, 21:9)
    #[arg(long)]
    pub crop_ratio: Option<String>,

    /// Encoder family
    #[arg(long, value_parser = ["cpu", "gpu"])]
    pub encoder: Option<String>,

    /// GPU vendor used with --encoder gpu
    #[arg(long, value_parser = ["nvidia", "intel", "amd"])]
    pub gpu_brand: Option<String>,

    /// Encode several clips at once
    #[arg(long)]
    pub parallel: bool,

    /// Number of parallel workers (default: half the CPU cores)
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Directory clips are written to
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Do not remux a source whose duration cannot be read
    #[arg(long)]
    pub no_fix_seekability: bool,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub format: String,

    /// Also preview a split with this clip length
    #[arg(short, long, value_parser = parse_segment_length)]
    pub length: Option<f64>,

    /// Preview assumes cropping
    #[arg(long)]
    pub crop: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Length of each clip (seconds, MM:SS or HH:MM:SS)
    #[arg(short, long, value_parser = parse_segment_length)]
    pub length: f64,

    /// Directory clips would be written to
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

//! Command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::container::AppContainer;
use crate::app::inspect_interactor::{InspectInteractor, InspectReport};
use crate::app::split_interactor::{summary_line, SplitRequest};
use crate::cli::args::{InspectArgs, PlanArgs, SplitArgs};
use crate::domain::model::AppConfig;
use crate::domain::rules::{SegmentPlanner, SplitPreview};
use crate::utils::time::TimeParser;

/// Exit code for a run stopped by the operator
pub const EXIT_CANCELLED: i32 = 130;

/// Execute the split command; returns the process exit code
pub async fn split(
    args: SplitArgs,
    container: &dyn AppContainer,
    cancel: CancellationToken,
) -> Result<i32> {
    info!("Starting split operation");
    info!("Input: {}", args.input.display());
    info!("Clip length: {}s", args.length);

    let interactor = container.split_interactor();
    let request = SplitRequest {
        input_path: args.input.clone(),
        segment_length: args.length,
        crop: args.crop,
    };

    let prepared = interactor
        .prepare(&request)
        .await
        .with_context(|| format!("Cannot split {}", args.input.display()))?;

    for warning in &prepared.warnings {
        eprintln!("Warning: {}", warning);
    }
    emit(args.json, &InspectInteractor::format_preview(&prepared.preview));

    if cancel.is_cancelled() {
        return Ok(EXIT_CANCELLED);
    }
    if !args.yes && !confirm("Proceed with splitting? (y/n): ", &cancel).await? {
        emit(args.json, "Aborted. No clips were created.");
        return Ok(if cancel.is_cancelled() { EXIT_CANCELLED } else { 0 });
    }

    emit(args.json, "Processing clips...");
    let report = interactor.run(&prepared, &cancel).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("\n{}", summary_line(&report));
        println!("Clips saved to: {}", interactor.config().export_dir.display());
    }

    Ok(report.exit_code())
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, container: &dyn AppContainer) -> Result<i32> {
    info!("Inspecting {}", args.input.display());
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let media = container.inspect_interactor().inspect(&args.input).await;
    let preview = args.length.and_then(|length| {
        SegmentPlanner::plan(media.duration_seconds, length)
            .ok()
            .map(|plan| SplitPreview::from_plan(&media, &plan, args.crop))
    });
    let report = InspectReport { media, preview };

    let output = InspectInteractor::format_report(&report, &args.format)?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(0)
}

#[derive(Debug, Serialize)]
struct PlannedClip {
    index: usize,
    start_seconds: f64,
    end_seconds: f64,
    output_path: String,
}

/// Execute the plan command
pub async fn plan(args: PlanArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<i32> {
    let media = container
        .inspect_interactor()
        .prepare_source(&args.input, false)
        .await
        .with_context(|| format!("Cannot plan {}", args.input.display()))?;
    let plan = SegmentPlanner::plan(media.duration_seconds, args.length)?;
    let outputs = plan.output_paths(
        &config.export_dir,
        &media.base_name(),
        &config.output_extension,
    );

    let clips: Vec<PlannedClip> = plan
        .iter()
        .zip(outputs)
        .map(|(window, output)| PlannedClip {
            index: window.index,
            start_seconds: window.start_seconds,
            end_seconds: window.end_seconds,
            output_path: output.display().to_string(),
        })
        .collect();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&clips).context("Failed to serialize plan")?
        );
    } else {
        println!("{} clips:", clips.len());
        for clip in &clips {
            println!(
                "  #{:<3} {} - {}  {}",
                clip.index,
                TimeParser::format_time(clip.start_seconds),
                TimeParser::format_time(clip.end_seconds),
                clip.output_path
            );
        }
    }
    Ok(0)
}

/// Human-readable output goes to stderr when stdout carries JSON
fn emit(json: bool, text: &str) {
    if json {
        eprintln!("{}", text.trim_end());
    } else {
        println!("{}", text.trim_end());
    }
}

/// Ask a yes/no question on stdin. End of input or cancellation means no.
async fn confirm(prompt: &str, cancel: &CancellationToken) -> Result<bool> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(prompt.as_bytes()).await?;
    stderr.flush().await?;

    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    let read = tokio::select! {
        read = stdin.read_line(&mut line) => read.context("Failed to read confirmation")?,
        _ = cancel.cancelled() => return Ok(false),
    };
    if read == 0 {
        return Ok(false);
    }
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

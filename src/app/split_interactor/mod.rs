// Split interactor - Orchestrates the segment batch use case

pub mod dispatcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::app::inspect_interactor::InspectInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::progress::{progress_channel, ConsoleProgress};
use crate::ports::*;

pub use dispatcher::SegmentDispatcher;

/// Split request
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRequest {
    pub input_path: PathBuf,
    pub segment_length: f64,
    pub crop: bool,
}

/// Everything decided before the first encode starts
#[derive(Debug, Clone)]
pub struct PreparedSplit {
    /// Path clip names are derived from; stays the operator's file even when
    /// encoding reads a seekable copy
    pub input_path: PathBuf,
    pub media: SourceMedia,
    pub plan: SegmentPlan,
    pub profile: EncodeProfile,
    pub preview: SplitPreview,
    pub warnings: Vec<ConfigurationWarning>,
}

impl PreparedSplit {
    pub fn base_name(&self) -> String {
        SourceMedia::new(&self.input_path, 0.0, 0).base_name()
    }

    /// Output path for every window, in plan order
    pub fn output_paths(&self, config: &AppConfig) -> Vec<PathBuf> {
        self.plan
            .output_paths(&config.export_dir, &self.base_name(), &config.output_extension)
    }
}

/// Interactor for the split use case
pub struct SplitInteractor {
    inspect: Arc<InspectInteractor>,
    encode_port: Arc<dyn EncodePort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
    config: AppConfig,
    console: bool,
}

impl SplitInteractor {
    /// Create new split interactor with injected ports
    pub fn new(
        inspect: Arc<InspectInteractor>,
        encode_port: Arc<dyn EncodePort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
        config: AppConfig,
    ) -> Self {
        Self {
            inspect,
            encode_port,
            fs_port,
            log_port,
            config,
            console: false,
        }
    }

    /// Print per-clip lines and draw live progress on the terminal
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Inspect the source, plan the windows and resolve the encode profile.
    /// Fails only on plan preconditions and the seekability fix.
    pub async fn prepare(&self, request: &SplitRequest) -> Result<PreparedSplit, DomainError> {
        let media = self
            .inspect
            .prepare_source(&request.input_path, self.config.fix_seekability)
            .await?;
        let plan = SegmentPlanner::plan(media.duration_seconds, request.segment_length)?;

        let Resolution { profile, warnings } =
            EncodeStrategySelector::resolve(&self.config, request.crop);
        for warning in &warnings {
            self.log_port.warn(&warning.to_string()).await;
        }

        let preview = SplitPreview::from_plan(&media, &plan, request.crop);

        self.log_port
            .info(&format!(
                "Planned {} clips of {}s from {} using {}",
                plan.len(),
                request.segment_length,
                media.path.display(),
                profile.video_codec
            ))
            .await;

        Ok(PreparedSplit {
            input_path: request.input_path.clone(),
            media,
            plan,
            profile,
            preview,
            warnings,
        })
    }

    /// Dispatch every window and fold the outcomes into a report.
    ///
    /// Individual failures never abort the batch. Once `cancel` fires no
    /// further window starts and the report is marked cancelled.
    pub async fn run(
        &self,
        prepared: &PreparedSplit,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, DomainError> {
        self.fs_port.create_directory(&self.config.export_dir).await?;

        let jobs: Vec<SegmentJob> = prepared
            .plan
            .iter()
            .cloned()
            .zip(prepared.output_paths(&self.config))
            .map(|(window, output_path)| SegmentJob::new(window, output_path))
            .collect();
        let total = jobs.len();

        let (sender, receiver) = progress_channel();
        let live = self.console && self.config.scheduling == Scheduling::Sequential;
        let console_task = tokio::spawn(ConsoleProgress::new(total, live).run(receiver));
        let dispatcher = SegmentDispatcher::new(
            self.encode_port.clone(),
            self.fs_port.clone(),
            self.log_port.clone(),
            Some(sender),
        );

        let mut report = BatchReport::new(total);
        match self.config.scheduling {
            Scheduling::Sequential => {
                self.log_port.info("Processing clips sequentially").await;
                for mut job in jobs {
                    let outcome = dispatcher
                        .dispatch(&mut job, &prepared.profile, &prepared.media.path, cancel)
                        .await;
                    self.fold(&mut report, &job, &outcome, total).await;
                }
            }
            Scheduling::Parallel => {
                let workers = self.config.effective_workers();
                self.log_port
                    .info(&format!("Processing clips with {} workers", workers))
                    .await;
                let results = Self::run_parallel(
                    &dispatcher,
                    jobs,
                    &prepared.profile,
                    &prepared.media.path,
                    workers,
                    cancel,
                )
                .await;
                for (job, outcome) in results {
                    self.fold(&mut report, &job, &outcome, total).await;
                }
            }
        }

        // Closing the last sender lets the progress consumer finish
        drop(dispatcher);
        let _ = console_task.await;

        report.cancelled = cancel.is_cancelled();
        report.finish();
        self.log_port.info(&summary_line(&report)).await;
        Ok(report)
    }

    async fn run_parallel(
        dispatcher: &SegmentDispatcher,
        jobs: Vec<SegmentJob>,
        profile: &EncodeProfile,
        source: &Path,
        workers: usize,
        cancel: &CancellationToken,
    ) -> Vec<(SegmentJob, SegmentOutcome)> {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let profile = Arc::new(profile.clone());
        let source = Arc::new(source.to_path_buf());
        let windows: Vec<SegmentJob> = jobs.clone();

        let mut set = JoinSet::new();
        for mut job in jobs {
            let semaphore = semaphore.clone();
            let dispatcher = dispatcher.clone();
            let profile = profile.clone();
            let source = source.clone();
            let cancel = cancel.clone();
            set.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => dispatcher.dispatch(&mut job, &profile, &source, &cancel).await,
                    Err(_) => SegmentOutcome::NotAttempted,
                };
                (job, outcome)
            });
        }

        let mut results: Vec<Option<(SegmentJob, SegmentOutcome)>> =
            (0..windows.len()).map(|_| None).collect();
        let mut join_failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((job, outcome)) => {
                    if let Some(slot) = results.get_mut(job.id().saturating_sub(1)) {
                        *slot = Some((job, outcome));
                    }
                }
                Err(e) => join_failures.push(e.to_string()),
            }
        }

        // Report in window order regardless of completion order
        windows
            .into_iter()
            .zip(results)
            .map(|(mut job, result)| {
                result.unwrap_or_else(|| {
                    job.status = SegmentStatus::Failed;
                    let reason = join_failures
                        .first()
                        .cloned()
                        .unwrap_or_else(|| "worker task ended unexpectedly".to_string());
                    (
                        job,
                        SegmentOutcome::Failed(DomainError::ExternalToolError {
                            status: "aborted".to_string(),
                            message: reason,
                        }),
                    )
                })
            })
            .collect()
    }

    async fn fold(
        &self,
        report: &mut BatchReport,
        job: &SegmentJob,
        outcome: &SegmentOutcome,
        total: usize,
    ) {
        report.record(job, outcome);

        if let Some(line) = outcome_line(job.id(), total, &job.file_name(), outcome) {
            if job.status == SegmentStatus::Failed {
                self.log_port.error(&line).await;
            } else {
                self.log_port.debug(&line).await;
            }
            if self.console {
                println!("{}", line);
            }
        }
    }
}

/// Console line for one finished window; `None` for windows never attempted
pub fn outcome_line(
    index: usize,
    total: usize,
    file_name: &str,
    outcome: &SegmentOutcome,
) -> Option<String> {
    match outcome {
        SegmentOutcome::Succeeded => Some(format!(
            "✅ [{}/{}] Created clip: {}",
            index, total, file_name
        )),
        SegmentOutcome::Skipped => Some(format!(
            "⏭ [{}/{}] Skipped existing clip: {}",
            index, total, file_name
        )),
        SegmentOutcome::Failed(reason) => Some(format!(
            "❌ [{}/{}] Failed clip: {}: {}",
            index, total, file_name, reason
        )),
        SegmentOutcome::NotAttempted => None,
    }
}

/// Closing line for a finished batch
pub fn summary_line(report: &BatchReport) -> String {
    let counts = format!(
        "{} created, {} skipped, {} failed",
        report.succeeded, report.skipped, report.failed
    );
    if report.cancelled {
        format!(
            "Cancelled: {}, {} not attempted",
            counts, report.not_attempted
        )
    } else if report.failed > 0 {
        format!("Processing finished with errors: {}", counts)
    } else {
        format!("Processing complete! {}", counts)
    }
}

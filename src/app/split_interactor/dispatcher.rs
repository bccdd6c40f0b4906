//! Runs one segment window through the encoder

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::{ProgressMonitor, ProgressSender};
use crate::engine::EncodeInvocation;
use crate::ports::*;

/// Turns a segment job into a terminal outcome
#[derive(Clone)]
pub struct SegmentDispatcher {
    encode_port: Arc<dyn EncodePort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
    progress: Option<ProgressSender>,
}

impl SegmentDispatcher {
    pub fn new(
        encode_port: Arc<dyn EncodePort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
        progress: Option<ProgressSender>,
    ) -> Self {
        Self {
            encode_port,
            fs_port,
            log_port,
            progress,
        }
    }

    /// Dispatch one job. Never returns an error: every failure is folded into
    /// the outcome so the batch can carry on.
    pub async fn dispatch(
        &self,
        job: &mut SegmentJob,
        profile: &EncodeProfile,
        source: &Path,
        cancel: &CancellationToken,
    ) -> SegmentOutcome {
        if cancel.is_cancelled() {
            return SegmentOutcome::NotAttempted;
        }

        match self.fs_port.file_exists(&job.output_path).await {
            Ok(true) => {
                job.status = SegmentStatus::Skipped;
                job.progress_fraction = 1.0;
                return SegmentOutcome::Skipped;
            }
            Ok(false) => {}
            Err(e) => {
                job.status = SegmentStatus::Failed;
                return SegmentOutcome::Failed(e);
            }
        }

        job.status = SegmentStatus::Running;
        let invocation = EncodeInvocation::new(&job.window, profile, source, &job.output_path);
        let mut monitor =
            ProgressMonitor::new(job.id(), job.window.duration(), self.progress.clone());

        let result = self
            .encode_port
            .encode_segment(&invocation, &mut monitor, cancel)
            .await;
        job.progress_fraction = monitor.fraction();

        match result {
            Ok(()) => {
                job.status = SegmentStatus::Succeeded;
                job.progress_fraction = 1.0;
                SegmentOutcome::Succeeded
            }
            Err(e) => {
                // A truncated clip left behind would be skipped on the next run
                if let Err(delete_err) = self.fs_port.delete_file(&job.output_path).await {
                    self.log_port
                        .warn(&format!(
                            "Could not remove partial clip {}: {}",
                            job.output_path.display(),
                            delete_err
                        ))
                        .await;
                }
                if e == DomainError::Cancelled {
                    job.status = SegmentStatus::Pending;
                    SegmentOutcome::NotAttempted
                } else {
                    job.status = SegmentStatus::Failed;
                    SegmentOutcome::Failed(e)
                }
            }
        }
    }
}

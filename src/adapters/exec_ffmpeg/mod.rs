//! FFmpeg execution adapter
//!
//! Spawns ffmpeg for segment encodes and for the seekability remux. Progress
//! is read from stderr, where ffmpeg writes its stats lines; stdout is unused.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::engine::progress::ProgressMonitor;
use crate::engine::{EncodeInvocation, RemuxInvocation};
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    program: String,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter running `program` (a name on PATH or a full path)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn not_started(&self, e: std::io::Error) -> DomainError {
        DomainError::ExternalToolError {
            status: "not started".to_string(),
            message: format!("failed to run {}: {}", self.program, e),
        }
    }
}

#[async_trait]
impl EncodePort for FFmpegAdapter {
    async fn encode_segment(
        &self,
        invocation: &EncodeInvocation,
        monitor: &mut ProgressMonitor,
        cancel: &CancellationToken,
    ) -> Result<(), DomainError> {
        let args = invocation.args();
        debug!("Running {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.not_started(e))?;

        let stderr = child.stderr.take().ok_or_else(|| DomainError::ExternalToolError {
            status: "not started".to_string(),
            message: "child stderr was not captured".to_string(),
        })?;

        let run = async {
            let summary = monitor.consume(stderr).await;
            let status = child.wait().await;
            (summary, status)
        };

        let finished = tokio::select! {
            result = run => Some(result),
            _ = cancel.cancelled() => None,
        };

        let Some((summary, status)) = finished else {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill {}: {}", self.program, e);
            }
            return Err(DomainError::Cancelled);
        };

        let status = status.map_err(|e| DomainError::ExternalToolError {
            status: "unknown".to_string(),
            message: format!("failed to wait for {}: {}", self.program, e),
        })?;

        if status.success() {
            Ok(())
        } else {
            let message = summary
                .tail
                .last()
                .cloned()
                .unwrap_or_else(|| format!("{} produced no diagnostics", self.program));
            Err(DomainError::from_exit_status(status, message))
        }
    }
}

#[async_trait]
impl RemuxPort for FFmpegAdapter {
    async fn remux(&self, invocation: &RemuxInvocation) -> Result<(), DomainError> {
        let args = invocation.args();
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::NormalizeFailed(format!("failed to run {}: {}", self.program, e))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DomainError::NormalizeFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.lines().last().unwrap_or("").trim()
            )))
        }
    }
}

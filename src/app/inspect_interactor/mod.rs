// Inspect interactor - Probes the source and makes it seekable when needed

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::SplitPreview;
use crate::engine::RemuxInvocation;
use crate::ports::*;
use crate::utils::path::PathUtils;
use crate::utils::Utils;

/// Probe result plus the optional split preview, as printed by `inspect`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub media: SourceMedia,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<SplitPreview>,
}

/// Interactor for media inspection and the seekability fix
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
    remux_port: Arc<dyn RemuxPort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        remux_port: Arc<dyn RemuxPort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            probe_port,
            remux_port,
            fs_port,
            log_port,
        }
    }

    /// Probe duration and size. Never fails: any probe error is logged and
    /// reported as an unknown duration and size.
    pub async fn inspect(&self, path: &Path) -> SourceMedia {
        match self.probe_port.probe_duration_and_size(path).await {
            Ok((duration, size)) => {
                self.log_port
                    .debug(&format!(
                        "Probed {}: {:.3}s, {} bytes",
                        path.display(),
                        duration,
                        size
                    ))
                    .await;
                SourceMedia::new(path, duration, size)
            }
            Err(e) => {
                self.log_port.warn(&e.to_string()).await;
                SourceMedia::new(path, 0.0, 0)
            }
        }
    }

    /// Stream-copy `path` into a seek-safe sibling and return the new path.
    /// The original is left in place.
    pub async fn fix_seekability(&self, path: &Path) -> Result<PathBuf, DomainError> {
        let output = PathUtils::seekable_copy_path(path);
        self.log_port
            .info(&format!(
                "Making {} seekable as {}",
                path.display(),
                output.display()
            ))
            .await;

        self.remux_port
            .remux(&RemuxInvocation::new(path, &output))
            .await?;
        Ok(output)
    }

    /// Inspect the source and return media with a usable duration.
    ///
    /// When the probe reports no duration for a file that has content, the
    /// seekability fix runs once (if enabled) and the copy is re-inspected.
    pub async fn prepare_source(
        &self,
        path: &Path,
        fix_seekability: bool,
    ) -> Result<SourceMedia, DomainError> {
        if !self.fs_port.file_exists(path).await? {
            return Err(DomainError::FsFail(format!(
                "Input file does not exist: {}",
                path.display()
            )));
        }

        let media = self.inspect(path).await;
        if media.has_duration() {
            return Ok(media);
        }

        if !fix_seekability {
            return Err(DomainError::InvalidPlanInput(format!(
                "duration of {} is unknown",
                path.display()
            )));
        }
        if !self.has_content(&media).await {
            return Err(DomainError::InvalidPlanInput(format!(
                "{} is empty or unreadable",
                path.display()
            )));
        }

        self.log_port
            .warn("Source reports no duration; attempting to fix seekability")
            .await;
        let fixed_path = self.fix_seekability(path).await?;
        let fixed = self.inspect(&fixed_path).await;
        if !fixed.has_duration() {
            return Err(DomainError::InvalidPlanInput(format!(
                "duration of {} is still unknown after remux",
                fixed_path.display()
            )));
        }

        self.log_port
            .info(&format!("Using seekable copy {}", fixed_path.display()))
            .await;
        Ok(fixed)
    }

    async fn has_content(&self, media: &SourceMedia) -> bool {
        if media.size_bytes > 0 {
            return true;
        }
        // The probe may have failed outright; ask the filesystem instead
        matches!(self.fs_port.get_file_size(&media.path).await, Ok(size) if size > 0)
    }

    /// Render an inspect report as `text`, `json` or `yaml`
    pub fn format_report(report: &InspectReport, format: &str) -> Result<String, DomainError> {
        match format {
            "json" => serde_json::to_string_pretty(report)
                .map_err(|e| DomainError::BadArgs(format!("JSON serialization failed: {}", e))),
            "yaml" => serde_yaml::to_string(report)
                .map_err(|e| DomainError::BadArgs(format!("YAML serialization failed: {}", e))),
            _ => Ok(Self::format_as_text(report)),
        }
    }

    fn format_as_text(report: &InspectReport) -> String {
        let media = &report.media;
        let mut output = String::new();

        output.push_str("Media File Information:\n");
        output.push_str(&format!("  File: {}\n", media.path.display()));
        if media.has_duration() {
            output.push_str(&format!(
                "  Duration: {:.3}s ({})\n",
                media.duration_seconds,
                Utils::format_minutes(media.duration_seconds)
            ));
        } else {
            output.push_str("  Duration: unknown\n");
        }
        output.push_str(&format!(
            "  File Size: {}\n",
            Utils::format_file_size(media.size_bytes)
        ));

        if let Some(preview) = &report.preview {
            output.push('\n');
            output.push_str(&Self::format_preview(preview));
        }
        output
    }

    /// Human-readable split preview shown before confirmation
    pub fn format_preview(preview: &SplitPreview) -> String {
        let mut output = String::new();
        output.push_str("Split Preview:\n");
        output.push_str(&format!(
            "  Video duration: {}\n",
            Utils::format_minutes(preview.duration_seconds)
        ));
        output.push_str(&format!("  Clip length: {} seconds\n", preview.segment_length));
        output.push_str(&format!("  Number of clips: {}\n", preview.clip_count));
        output.push_str(&format!(
            "  Estimated total size: {}\n",
            Utils::format_file_size(preview.estimated_size_bytes)
        ));
        if preview.size_estimate_unreliable {
            output.push_str("  Note: cropping re-encodes each clip; actual size may differ\n");
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::adapters::TracingLogAdapter;
    use crate::domain::rules::SegmentPlanner;

    struct FakeProbe {
        answers: Vec<(String, Result<(f64, u64), DomainError>)>,
    }

    #[async_trait]
    impl ProbePort for FakeProbe {
        async fn probe_duration_and_size(&self, file_path: &Path) -> Result<(f64, u64), DomainError> {
            let name = file_path.to_string_lossy();
            self.answers
                .iter()
                .find(|(key, _)| name.ends_with(key.as_str()))
                .map(|(_, answer)| answer.clone())
                .unwrap_or(Err(DomainError::ProbeUnavailable("no answer".to_string())))
        }
    }

    #[derive(Default)]
    struct FakeRemux {
        calls: Mutex<Vec<RemuxInvocation>>,
        fail: bool,
    }

    #[async_trait]
    impl RemuxPort for FakeRemux {
        async fn remux(&self, invocation: &RemuxInvocation) -> Result<(), DomainError> {
            self.calls.lock().unwrap().push(invocation.clone());
            if self.fail {
                Err(DomainError::NormalizeFailed("exit code 1".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct FakeFs {
        size: u64,
    }

    #[async_trait]
    impl FsPort for FakeFs {
        async fn file_exists(&self, _file_path: &Path) -> Result<bool, DomainError> {
            Ok(true)
        }
        async fn get_file_size(&self, _file_path: &Path) -> Result<u64, DomainError> {
            Ok(self.size)
        }
        async fn create_directory(&self, _dir_path: &Path) -> Result<(), DomainError> {
            Ok(())
        }
        async fn delete_file(&self, _file_path: &Path) -> Result<(), DomainError> {
            Ok(())
        }
    }

    fn interactor(
        answers: Vec<(&str, Result<(f64, u64), DomainError>)>,
        remux: Arc<FakeRemux>,
        size: u64,
    ) -> InspectInteractor {
        InspectInteractor::new(
            Arc::new(FakeProbe {
                answers: answers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            }),
            remux,
            Arc::new(FakeFs { size }),
            Arc::new(TracingLogAdapter::new(LogLevel::Error)),
        )
    }

    #[tokio::test]
    async fn test_probe_failure_maps_to_zero() {
        let inspector = interactor(vec![], Arc::new(FakeRemux::default()), 0);
        let media = inspector.inspect(Path::new("in.mp4")).await;
        assert_eq!(media.duration_seconds, 0.0);
        assert_eq!(media.size_bytes, 0);
    }

    #[tokio::test]
    async fn test_prepare_source_with_duration_skips_fix() {
        let remux = Arc::new(FakeRemux::default());
        let inspector = interactor(vec![("in.mp4", Ok((125.0, 1000)))], remux.clone(), 1000);

        let media = inspector.prepare_source(Path::new("in.mp4"), true).await.unwrap();
        assert_eq!(media.duration_seconds, 125.0);
        assert!(remux.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_source_fixes_unseekable_file() {
        let remux = Arc::new(FakeRemux::default());
        let inspector = interactor(
            vec![
                ("rec_seekable.mp4", Ok((90.0, 5000))),
                ("rec.mp4", Ok((0.0, 5000))),
            ],
            remux.clone(),
            5000,
        );

        let media = inspector.prepare_source(Path::new("rec.mp4"), true).await.unwrap();
        assert_eq!(media.path, PathBuf::from("rec_seekable.mp4"));
        assert_eq!(media.duration_seconds, 90.0);

        let calls = remux.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].output_path, PathBuf::from("rec_seekable.mp4"));
    }

    #[tokio::test]
    async fn test_prepare_source_still_unknown_after_fix() {
        let inspector = interactor(
            vec![("rec.mp4", Ok((0.0, 5000)))],
            Arc::new(FakeRemux::default()),
            5000,
        );
        let err = inspector
            .prepare_source(Path::new("rec.mp4"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidPlanInput(_)));
    }

    #[tokio::test]
    async fn test_prepare_source_remux_failure_is_fatal() {
        let remux = Arc::new(FakeRemux {
            fail: true,
            ..FakeRemux::default()
        });
        let inspector = interactor(vec![("rec.mp4", Ok((0.0, 5000)))], remux, 5000);
        let err = inspector
            .prepare_source(Path::new("rec.mp4"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NormalizeFailed(_)));
    }

    #[tokio::test]
    async fn test_prepare_source_without_fix_or_content() {
        let remux = Arc::new(FakeRemux::default());
        let inspector = interactor(vec![], remux.clone(), 0);

        let disabled = inspector.prepare_source(Path::new("a.mp4"), false).await;
        assert!(matches!(disabled, Err(DomainError::InvalidPlanInput(_))));

        let empty = inspector.prepare_source(Path::new("a.mp4"), true).await;
        assert!(matches!(empty, Err(DomainError::InvalidPlanInput(_))));
        assert!(remux.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_format_report() {
        let media = SourceMedia::new("in.mp4", 125.0, 2048);
        let report = InspectReport {
            preview: Some(SplitPreview::from_plan(
                &media,
                &SegmentPlanner::plan(125.0, 60.0).unwrap(),
                true,
            )),
            media,
        };

        let text = InspectInteractor::format_report(&report, "text").unwrap();
        assert!(text.contains("Duration: 125.000s (2.08 minutes)"));
        assert!(text.contains("Number of clips: 3"));
        assert!(text.contains("actual size may differ"));

        let json = InspectInteractor::format_report(&report, "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["preview"]["clip_count"], 3);

        let yaml = InspectInteractor::format_report(&report, "yaml").unwrap();
        assert!(yaml.contains("duration_seconds: 125.0"));
    }
}

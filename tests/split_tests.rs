//! Batch runner tests against fake probe and encoder ports

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use clipr::adapters::{LocalFsAdapter, TracingLogAdapter};
use clipr::app::inspect_interactor::InspectInteractor;
use clipr::app::split_interactor::{SplitInteractor, SplitRequest};
use clipr::domain::errors::{ConfigurationWarning, DomainError};
use clipr::domain::model::{AppConfig, EncoderChoice, Scheduling};
use clipr::engine::progress::ProgressMonitor;
use clipr::engine::{EncodeInvocation, RemuxInvocation};
use clipr::ports::{EncodePort, LogLevel, ProbePort, RemuxPort};

struct FakeProbe {
    answer: Result<(f64, u64), DomainError>,
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe_duration_and_size(&self, _file_path: &Path) -> Result<(f64, u64), DomainError> {
        self.answer.clone()
    }
}

struct NoopRemux;

#[async_trait]
impl RemuxPort for NoopRemux {
    async fn remux(&self, _invocation: &RemuxInvocation) -> Result<(), DomainError> {
        Ok(())
    }
}

/// What the fake encoder does for a given window index
#[derive(Clone, Copy, PartialEq)]
enum Behaviour {
    Succeed,
    /// Write a partial file, then exit nonzero
    Fail,
    /// Write a partial file, fire the cancel token, report cancellation
    Interrupt,
    /// Succeed after a delay in milliseconds
    Slow(u64),
}

struct FakeEncoder {
    behaviours: Vec<(usize, Behaviour)>,
    calls: Mutex<Vec<EncodeInvocation>>,
}

impl FakeEncoder {
    fn new(behaviours: Vec<(usize, Behaviour)>) -> Arc<Self> {
        Arc::new(Self {
            behaviours,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn behaviour_for(&self, start_seconds: f64, length: f64) -> Behaviour {
        let index = (start_seconds / length).round() as usize + 1;
        self.behaviours
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, b)| *b)
            .unwrap_or(Behaviour::Succeed)
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

const SEGMENT_LENGTH: f64 = 60.0;

#[async_trait]
impl EncodePort for FakeEncoder {
    async fn encode_segment(
        &self,
        invocation: &EncodeInvocation,
        monitor: &mut ProgressMonitor,
        cancel: &CancellationToken,
    ) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(invocation.clone());
        monitor.observe_line("frame=10 time=00:00:01.00 speed=1x");

        match self.behaviour_for(invocation.start_seconds, SEGMENT_LENGTH) {
            Behaviour::Succeed => {
                std::fs::write(&invocation.output_path, b"clip").unwrap();
                Ok(())
            }
            Behaviour::Slow(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                std::fs::write(&invocation.output_path, b"clip").unwrap();
                Ok(())
            }
            Behaviour::Fail => {
                std::fs::write(&invocation.output_path, b"trunc").unwrap();
                Err(DomainError::ExternalToolError {
                    status: "exit code 1".to_string(),
                    message: "Conversion failed!".to_string(),
                })
            }
            Behaviour::Interrupt => {
                std::fs::write(&invocation.output_path, b"trunc").unwrap();
                cancel.cancel();
                Err(DomainError::Cancelled)
            }
        }
    }
}

struct Fixture {
    temp: TempDir,
    input: PathBuf,
    config: AppConfig,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp4");
        std::fs::write(&input, b"source").unwrap();
        let config = AppConfig {
            export_dir: temp.path().join("Exports"),
            ..AppConfig::default()
        };
        Self {
            temp,
            input,
            config,
        }
    }

    fn export(&self, name: &str) -> PathBuf {
        self.config.export_dir.join(name)
    }

    fn interactor(
        &self,
        probe: Result<(f64, u64), DomainError>,
        encoder: Arc<FakeEncoder>,
    ) -> SplitInteractor {
        let fs = Arc::new(LocalFsAdapter::new());
        let log = Arc::new(TracingLogAdapter::new(LogLevel::Error));
        let inspect = Arc::new(InspectInteractor::new(
            Arc::new(FakeProbe { answer: probe }),
            Arc::new(NoopRemux),
            fs.clone(),
            log.clone(),
        ));
        SplitInteractor::new(inspect, encoder, fs, log, self.config.clone())
    }

    fn request(&self) -> SplitRequest {
        SplitRequest {
            input_path: self.input.clone(),
            segment_length: SEGMENT_LENGTH,
            crop: false,
        }
    }
}

#[tokio::test]
async fn test_existing_second_clip_is_skipped() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(&fixture.config.export_dir).unwrap();
    std::fs::write(fixture.export("in_60-120.mp4"), b"done").unwrap();

    let encoder = FakeEncoder::new(vec![]);
    let interactor = fixture.interactor(Ok((125.0, 1_000)), encoder.clone());
    let prepared = interactor.prepare(&fixture.request()).await.unwrap();
    let report = interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.planned, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.exit_code(), 0);

    let calls = encoder.calls.lock().unwrap();
    let durations: Vec<f64> = calls.iter().map(|c| c.duration_seconds).collect();
    assert_eq!(durations, vec![60.0, 5.0]);
    assert!(fixture.export("in_00-60.mp4").exists());
    assert!(fixture.export("in_120-125.mp4").exists());
    assert_eq!(std::fs::read(fixture.export("in_60-120.mp4")).unwrap(), b"done");
}

#[tokio::test]
async fn test_rerun_after_success_invokes_nothing() {
    let fixture = Fixture::new();
    let encoder = FakeEncoder::new(vec![]);
    let interactor = fixture.interactor(Ok((125.0, 1_000)), encoder.clone());
    let prepared = interactor.prepare(&fixture.request()).await.unwrap();

    interactor.run(&prepared, &CancellationToken::new()).await.unwrap();
    assert_eq!(encoder.call_count(), 3);

    let second = interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(encoder.call_count(), 3);
    assert_eq!(second.skipped, 3);
    assert!(second.is_success());
}

#[tokio::test]
async fn test_failure_is_isolated_and_partial_output_removed() {
    let fixture = Fixture::new();
    let encoder = FakeEncoder::new(vec![(2, Behaviour::Fail)]);
    let interactor = fixture.interactor(Ok((125.0, 1_000)), encoder.clone());
    let prepared = interactor.prepare(&fixture.request()).await.unwrap();

    let report = interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].index, 2);
    assert_eq!(report.failures[0].file_name, "in_60-120.mp4");
    assert_eq!(report.exit_code(), 1);
    assert!(!fixture.export("in_60-120.mp4").exists());

    // A second run only retries the failed clip
    let retry = FakeEncoder::new(vec![]);
    let interactor = fixture.interactor(Ok((125.0, 1_000)), retry.clone());
    let report = interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(retry.call_count(), 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.succeeded, 1);
}

#[tokio::test]
async fn test_unavailable_probe_dispatches_nothing() {
    let fixture = Fixture::new();
    let encoder = FakeEncoder::new(vec![]);
    let interactor = fixture.interactor(
        Err(DomainError::ProbeUnavailable("ffprobe not found".to_string())),
        encoder.clone(),
    );

    let err = interactor.prepare(&fixture.request()).await.unwrap_err();

    assert!(matches!(err, DomainError::InvalidPlanInput(_)));
    assert_eq!(encoder.call_count(), 0);
    assert!(!fixture.config.export_dir.exists());
}

#[tokio::test]
async fn test_missing_input_is_reported() {
    let fixture = Fixture::new();
    let interactor = fixture.interactor(Ok((125.0, 1_000)), FakeEncoder::new(vec![]));
    let request = SplitRequest {
        input_path: fixture.temp.path().join("nope.mp4"),
        ..fixture.request()
    };
    let err = interactor.prepare(&request).await.unwrap_err();
    assert!(matches!(err, DomainError::FsFail(_)));
}

#[tokio::test]
async fn test_parallel_report_is_in_window_order() {
    let mut fixture = Fixture::new();
    fixture.config.scheduling = Scheduling::Parallel;
    fixture.config.workers = Some(3);

    let encoder = FakeEncoder::new(vec![
        (1, Behaviour::Slow(60)),
        (2, Behaviour::Slow(30)),
        (3, Behaviour::Fail),
        (4, Behaviour::Slow(5)),
    ]);
    let interactor = fixture.interactor(Ok((230.0, 1_000)), encoder.clone());
    let prepared = interactor.prepare(&fixture.request()).await.unwrap();
    let report = interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();

    let indices: Vec<usize> = report.records.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(report.records[2].outcome, "failed");
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(encoder.call_count(), 4);
}

#[tokio::test]
async fn test_cancellation_stops_remaining_windows() {
    let fixture = Fixture::new();
    let encoder = FakeEncoder::new(vec![(2, Behaviour::Interrupt)]);
    let interactor = fixture.interactor(Ok((125.0, 1_000)), encoder.clone());
    let prepared = interactor.prepare(&fixture.request()).await.unwrap();
    let cancel = CancellationToken::new();

    let report = interactor.run(&prepared, &cancel).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.not_attempted, 2);
    assert_eq!(report.exit_code(), 130);
    assert_eq!(encoder.call_count(), 2);
    assert!(!fixture.export("in_60-120.mp4").exists());
    assert!(!fixture.export("in_120-125.mp4").exists());
}

#[tokio::test]
async fn test_gpu_without_brand_falls_back_to_software() {
    let mut fixture = Fixture::new();
    fixture.config.encoder = EncoderChoice::Gpu;
    fixture.config.gpu_brand = None;

    let encoder = FakeEncoder::new(vec![]);
    let interactor = fixture.interactor(Ok((30.0, 1_000)), encoder.clone());
    let prepared = interactor.prepare(&fixture.request()).await.unwrap();

    assert_eq!(prepared.profile.video_codec, "libx264");
    assert_eq!(prepared.profile.quality_param, "23");
    assert_eq!(
        prepared.warnings,
        vec![ConfigurationWarning::UnknownGpuBrand]
    );

    let report = interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.succeeded, 1);
    let calls = encoder.calls.lock().unwrap();
    assert!(calls[0].args().contains(&"libx264".to_string()));
}

#[tokio::test]
async fn test_crop_profile_reaches_encoder() {
    let fixture = Fixture::new();
    let encoder = FakeEncoder::new(vec![]);
    let interactor = fixture.interactor(Ok((30.0, 1_000)), encoder.clone());
    let request = SplitRequest {
        crop: true,
        ..fixture.request()
    };
    let prepared = interactor.prepare(&request).await.unwrap();
    assert!(prepared.preview.size_estimate_unreliable);

    interactor
        .run(&prepared, &CancellationToken::new())
        .await
        .unwrap();
    let calls = encoder.calls.lock().unwrap();
    let args = calls[0].args();
    let vf = args.iter().position(|a| a == "-vf").unwrap();
    assert!(args[vf + 1].starts_with("crop=ih*9/16"));
}

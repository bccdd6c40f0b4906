// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Media file as reported by the probe tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMedia {
    pub path: PathBuf,
    /// Zero means unknown (unseekable or probe failure), not an empty file
    pub duration_seconds: f64,
    pub size_bytes: u64,
}

impl SourceMedia {
    pub fn new(path: impl Into<PathBuf>, duration_seconds: f64, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            duration_seconds: duration_seconds.max(0.0),
            size_bytes,
        }
    }

    /// Whether the probe produced a usable duration
    pub fn has_duration(&self) -> bool {
        self.duration_seconds > 0.0
    }

    /// File name without extension, used as the clip name prefix
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "clip".to_string())
    }
}

/// One contiguous time range of the source rendered into its own file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentWindow {
    /// 1-based position in the plan
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl SegmentWindow {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Deterministic output name: `<base>_<start>-<end>.<ext>` with truncated,
    /// two-digit-minimum integer seconds
    pub fn file_name(&self, base_name: &str, extension: &str) -> String {
        format!(
            "{}_{:02}-{:02}.{}",
            base_name,
            self.start_seconds as u64,
            self.end_seconds as u64,
            extension.trim_start_matches('.')
        )
    }
}

impl fmt::Display for SegmentWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{:.3}s - {:.3}s]",
            self.index, self.start_seconds, self.end_seconds
        )
    }
}

/// Ordered, gapless list of windows covering `[0, duration)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub duration_seconds: f64,
    pub segment_length: f64,
    pub windows: Vec<SegmentWindow>,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentWindow> {
        self.windows.iter()
    }

    /// Output path for every window, in plan order
    pub fn output_paths(&self, export_dir: &Path, base_name: &str, extension: &str) -> Vec<PathBuf> {
        self.windows
            .iter()
            .map(|w| export_dir.join(w.file_name(base_name, extension)))
            .collect()
    }
}

/// Encoder family chosen by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderChoice {
    /// High quality software encoding
    Cpu,
    /// Fast hardware encoding
    Gpu,
}

impl EncoderChoice {
    /// Parse encoder choice; accepts the legacy menu codes `1`/`2`
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "cpu" | "1" => Ok(EncoderChoice::Cpu),
            "gpu" | "2" => Ok(EncoderChoice::Gpu),
            other => Err(DomainError::BadArgs(format!(
                "Invalid encoder: {}. Valid encoders: cpu, gpu",
                other
            ))),
        }
    }
}

/// GPU vendor for hardware encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuBrand {
    Nvidia,
    Intel,
    Amd,
}

impl GpuBrand {
    /// Parse GPU brand; accepts the legacy menu codes `1`/`2`/`3`
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "nvidia" | "1" => Ok(GpuBrand::Nvidia),
            "intel" | "2" => Ok(GpuBrand::Intel),
            "amd" | "3" => Ok(GpuBrand::Amd),
            other => Err(DomainError::BadArgs(format!(
                "Invalid GPU brand: {}. Valid brands: nvidia, intel, amd",
                other
            ))),
        }
    }
}

/// How windows are scheduled onto the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheduling {
    Sequential,
    Parallel,
}

impl Scheduling {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "sequential" => Ok(Scheduling::Sequential),
            "parallel" => Ok(Scheduling::Parallel),
            other => Err(DomainError::BadArgs(format!(
                "Invalid scheduling mode: {}. Valid modes: sequential, parallel",
                other
            ))),
        }
    }
}

/// Quality flag family understood by a codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityMode {
    /// `-crf q` (libx264)
    Crf,
    /// `-cq q` (NVENC)
    Cq,
    /// `-global_quality q` (QSV)
    GlobalQuality,
    /// `-rc cqp -qp_i q -qp_p q` (AMF)
    ConstantQp,
}

/// Concrete encoder settings shared by every segment job of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeProfile {
    pub video_codec: String,
    pub quality_mode: QualityMode,
    pub quality_param: String,
    pub preset_param: String,
    pub audio_codec: String,
    pub crop_filter: Option<String>,
}

/// Immutable run configuration, built once at process start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub export_dir: PathBuf,
    pub encoder: EncoderChoice,
    pub gpu_brand: Option<GpuBrand>,
    pub crop_ratio: String,
    pub preset: String,
    pub cpu_quality: u8,
    pub gpu_quality: u8,
    pub audio_codec: String,
    pub output_extension: String,
    pub scheduling: Scheduling,
    /// Worker pool size for parallel scheduling; `None` derives it from the CPU count
    pub workers: Option<usize>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub fix_seekability: bool,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("Exports"),
            encoder: EncoderChoice::Cpu,
            gpu_brand: Some(GpuBrand::Nvidia),
            crop_ratio: "9:16".to_string(),
            preset: "medium".to_string(),
            cpu_quality: 18,
            gpu_quality: 23,
            audio_codec: "aac".to_string(),
            output_extension: "mp4".to_string(),
            scheduling: Scheduling::Sequential,
            workers: None,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            fix_seekability: true,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Worker pool size: configured value, else half the logical cores, never below one
    pub fn effective_workers(&self) -> usize {
        match self.scheduling {
            Scheduling::Sequential => 1,
            Scheduling::Parallel => self
                .workers
                .unwrap_or_else(|| num_cpus::get() / 2)
                .max(1),
        }
    }
}

/// Lifecycle of one segment job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentStatus {
    Pending,
    Running,
    Skipped,
    Succeeded,
    Failed,
}

/// Ephemeral per-window state owned by the dispatcher
#[derive(Debug, Clone)]
pub struct SegmentJob {
    pub window: SegmentWindow,
    pub output_path: PathBuf,
    pub status: SegmentStatus,
    pub progress_fraction: f64,
}

impl SegmentJob {
    pub fn new(window: SegmentWindow, output_path: PathBuf) -> Self {
        Self {
            window,
            output_path,
            status: SegmentStatus::Pending,
            progress_fraction: 0.0,
        }
    }

    pub fn id(&self) -> usize {
        self.window.index
    }

    /// Output file name without the export directory
    pub fn file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Terminal result of dispatching one window
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOutcome {
    /// Output already existed; encoder not invoked
    Skipped,
    Succeeded,
    Failed(DomainError),
    /// Run was cancelled before or while this window was encoding
    NotAttempted,
}

impl SegmentOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentOutcome::Skipped => "skipped",
            SegmentOutcome::Succeeded => "succeeded",
            SegmentOutcome::Failed(_) => "failed",
            SegmentOutcome::NotAttempted => "not_attempted",
        }
    }
}

/// A window that failed, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSegment {
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub file_name: String,
    pub reason: String,
}

/// Per-window line of the final report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRecord {
    pub index: usize,
    pub file_name: String,
    pub outcome: String,
    /// Share of the window encoded when the job stopped
    pub progress_fraction: f64,
}

/// Aggregate result of one batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub planned: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub not_attempted: usize,
    pub cancelled: bool,
    pub failures: Vec<FailedSegment>,
    pub records: Vec<SegmentRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchReport {
    pub fn new(planned: usize) -> Self {
        Self {
            planned,
            skipped: 0,
            succeeded: 0,
            failed: 0,
            not_attempted: 0,
            cancelled: false,
            failures: Vec::new(),
            records: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one terminal outcome into the report
    pub fn record(&mut self, job: &SegmentJob, outcome: &SegmentOutcome) {
        let window = &job.window;
        let file_name = job.file_name();
        match outcome {
            SegmentOutcome::Skipped => self.skipped += 1,
            SegmentOutcome::Succeeded => self.succeeded += 1,
            SegmentOutcome::NotAttempted => self.not_attempted += 1,
            SegmentOutcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push(FailedSegment {
                    index: window.index,
                    start_seconds: window.start_seconds,
                    end_seconds: window.end_seconds,
                    file_name: file_name.clone(),
                    reason: reason.to_string(),
                });
            }
        }
        self.records.push(SegmentRecord {
            index: window.index,
            file_name,
            outcome: outcome.label().to_string(),
            progress_fraction: job.progress_fraction,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed == 0 && self.not_attempted == 0
    }

    /// Process exit code for this report
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            130
        } else if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

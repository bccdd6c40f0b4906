//! Invocation builders for the external media tools
//!
//! Each builder turns domain values into the exact argument vector handed to
//! ffprobe or ffmpeg. Adapters only spawn what these produce, so the argument
//! contract is testable without either tool installed.

use std::path::{Path, PathBuf};

use crate::domain::model::{EncodeProfile, QualityMode, SegmentWindow};
use crate::utils::path::PathUtils;

pub mod progress;

/// Token ffprobe prints for a field it cannot determine
pub const UNAVAILABLE_TOKEN: &str = "N/A";

/// Probe request for the container duration and byte size
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeInvocation {
    pub input_path: PathBuf,
}

impl ProbeInvocation {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration,size".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            PathUtils::display(&self.input_path),
        ]
    }

    /// Parse the two-line `duration\nsize` answer. Each field may be the
    /// unavailable token, which maps to zero. Anything else malformed is `None`.
    pub fn parse_output(stdout: &str) -> Option<(f64, u64)> {
        let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
        let duration = lines.next()?;
        let size = lines.next()?;

        let duration = if duration == UNAVAILABLE_TOKEN {
            0.0
        } else {
            let value: f64 = duration.parse().ok()?;
            if !value.is_finite() || value < 0.0 {
                return None;
            }
            value
        };
        let size = if size == UNAVAILABLE_TOKEN {
            0
        } else {
            size.parse().ok()?
        };

        Some((duration, size))
    }
}

/// One segment encode: seek, read the window, re-encode, write
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeInvocation {
    pub input_path: PathBuf,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub profile: EncodeProfile,
    pub output_path: PathBuf,
}

impl EncodeInvocation {
    pub fn new(
        window: &SegmentWindow,
        profile: &EncodeProfile,
        input_path: &Path,
        output_path: &Path,
    ) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            start_seconds: window.start_seconds,
            // Window length, not the requested length, so the tail does not overrun
            duration_seconds: window.duration(),
            profile: profile.clone(),
            output_path: output_path.to_path_buf(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format_seconds(self.start_seconds),
            "-i".to_string(),
            PathUtils::display(&self.input_path),
            "-t".to_string(),
            format_seconds(self.duration_seconds),
            "-c:v".to_string(),
            self.profile.video_codec.clone(),
        ];
        args.extend(quality_args(
            self.profile.quality_mode,
            &self.profile.quality_param,
        ));
        args.push("-preset".to_string());
        args.push(self.profile.preset_param.clone());
        if let Some(filter) = &self.profile.crop_filter {
            args.push("-vf".to_string());
            args.push(filter.clone());
        }
        args.push("-c:a".to_string());
        args.push(self.profile.audio_codec.clone());
        args.push(PathUtils::display(&self.output_path));
        args
    }
}

/// Full-file stream copy that moves the index to the front of the container
#[derive(Debug, Clone, PartialEq)]
pub struct RemuxInvocation {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl RemuxInvocation {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            PathUtils::display(&self.input_path),
            "-map".to_string(),
            "0".to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            PathUtils::display(&self.output_path),
        ]
    }
}

fn quality_args(mode: QualityMode, quality: &str) -> Vec<String> {
    let quality = quality.to_string();
    match mode {
        QualityMode::Crf => vec!["-crf".to_string(), quality],
        QualityMode::Cq => vec!["-cq".to_string(), quality],
        QualityMode::GlobalQuality => vec!["-global_quality".to_string(), quality],
        QualityMode::ConstantQp => vec![
            "-rc".to_string(),
            "cqp".to_string(),
            "-qp_i".to_string(),
            quality.clone(),
            "-qp_p".to_string(),
            quality,
        ],
    }
}

/// Seconds with millisecond precision and no trailing zeros: `60`, `12.5`
fn format_seconds(seconds: f64) -> String {
    let formatted = format!("{:.3}", seconds);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(crop: Option<&str>) -> EncodeProfile {
        EncodeProfile {
            video_codec: "libx264".to_string(),
            quality_mode: QualityMode::Crf,
            quality_param: "18".to_string(),
            preset_param: "medium".to_string(),
            audio_codec: "aac".to_string(),
            crop_filter: crop.map(str::to_string),
        }
    }

    #[test]
    fn test_probe_args() {
        let args = ProbeInvocation::new("in.mp4").args();
        assert_eq!(args[3], "format=duration,size");
        assert_eq!(args.last().unwrap(), "in.mp4");
    }

    #[test]
    fn test_probe_parse_output() {
        assert_eq!(
            ProbeInvocation::parse_output("125.400000\n52428800\n"),
            Some((125.4, 52_428_800))
        );
        assert_eq!(ProbeInvocation::parse_output("N/A\nN/A\n"), Some((0.0, 0)));
        assert_eq!(ProbeInvocation::parse_output("N/A\n1024"), Some((0.0, 1024)));
        assert_eq!(ProbeInvocation::parse_output("12.0\n"), None);
        assert_eq!(ProbeInvocation::parse_output("abc\n12"), None);
        assert_eq!(ProbeInvocation::parse_output(""), None);
    }

    #[test]
    fn test_encode_args_without_crop() {
        let window = SegmentWindow {
            index: 3,
            start_seconds: 120.0,
            end_seconds: 125.0,
        };
        let invocation = EncodeInvocation::new(
            &window,
            &profile(None),
            Path::new("in.mp4"),
            Path::new("out/in_120-125.mp4"),
        );
        assert_eq!(
            invocation.args(),
            vec![
                "-hide_banner", "-y", "-ss", "120", "-i", "in.mp4", "-t", "5", "-c:v", "libx264",
                "-crf", "18", "-preset", "medium", "-c:a", "aac", "out/in_120-125.mp4",
            ]
        );
    }

    #[test]
    fn test_encode_args_with_crop_and_amf() {
        let window = SegmentWindow {
            index: 1,
            start_seconds: 0.0,
            end_seconds: 12.5,
        };
        let mut p = profile(Some("crop=ih*9/16:ih:(iw-ih*9/16)/2:0,scale=1080:1920"));
        p.video_codec = "h264_amf".to_string();
        p.quality_mode = QualityMode::ConstantQp;
        p.quality_param = "23".to_string();

        let args = EncodeInvocation::new(&window, &p, Path::new("a.mkv"), Path::new("o.mp4")).args();
        let joined = args.join(" ");
        assert!(joined.contains("-t 12.5"));
        assert!(joined.contains("-rc cqp -qp_i 23 -qp_p 23"));
        assert!(joined.contains("-vf crop=ih*9/16"));
        assert_eq!(args.last().unwrap(), "o.mp4");
    }

    #[test]
    fn test_remux_args() {
        let args = RemuxInvocation::new("a.mp4", "a_seekable.mp4").args();
        let joined = args.join(" ");
        assert!(joined.contains("-c copy"));
        assert!(joined.contains("-movflags +faststart"));
        assert_eq!(args.last().unwrap(), "a_seekable.mp4");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(60.0), "60");
        assert_eq!(format_seconds(0.0), "0");
        assert_eq!(format_seconds(12.5), "12.5");
        assert_eq!(format_seconds(1.23456), "1.235");
    }
}

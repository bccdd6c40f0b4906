// Domain rules - Business logic and policies

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Business rules for cutting a duration into fixed-length windows
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// Shortest window whose truncated start second is always unique
    pub const MIN_SEGMENT_LENGTH: f64 = 1.0;

    /// Plan `ceil(duration / segment_length)` windows covering `[0, duration)`.
    ///
    /// Every window is exactly `segment_length` long except possibly the last,
    /// which is kept short rather than merged into its predecessor. Lengths
    /// under one second are rejected: output names carry whole seconds and
    /// two windows must never share a name.
    pub fn plan(duration: f64, segment_length: f64) -> Result<SegmentPlan, DomainError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidPlanInput(format!(
                "duration must be positive, got {}",
                duration
            )));
        }
        if !segment_length.is_finite() || segment_length <= 0.0 {
            return Err(DomainError::InvalidPlanInput(format!(
                "segment length must be positive, got {}",
                segment_length
            )));
        }
        if segment_length < Self::MIN_SEGMENT_LENGTH {
            return Err(DomainError::InvalidPlanInput(format!(
                "segment length must be at least {} second, got {}",
                Self::MIN_SEGMENT_LENGTH,
                segment_length
            )));
        }

        let mut windows = Vec::new();
        let mut k: u64 = 0;
        loop {
            // Multiply instead of accumulating so boundaries do not drift
            let start = k as f64 * segment_length;
            if start >= duration {
                break;
            }
            let end = ((k + 1) as f64 * segment_length).min(duration);
            windows.push(SegmentWindow {
                index: k as usize + 1,
                start_seconds: start,
                end_seconds: end,
            });
            k += 1;
        }

        Ok(SegmentPlan {
            duration_seconds: duration,
            segment_length,
            windows,
        })
    }
}

/// Crop ratio keys and the filter expression applied for each
const CROP_FILTERS: &[(&str, &str)] = &[
    ("9:16", "crop=ih*9/16:ih:(iw-ih*9/16)/2:0,scale=1080:1920"),
    ("1:1", "crop=min(iw\\,ih):min(iw\\,ih),scale=1080:1080"),
    ("4:5", "crop=ih*4/5:ih:(iw-ih*4/5)/2:0,scale=1080:1350"),
    ("4:3", "crop=ih*4/3:ih:(iw-ih*4/3)/2:0,scale=1440:1080"),
    ("16:9", "crop=iw:iw*9/16:0:(ih-iw*9/16)/2,scale=1920:1080"),
    ("21:9", "crop=iw:iw*9/21:0:(ih-iw*9/21)/2,scale=2560:1080"),
];

/// Encode profile together with the warnings raised while resolving it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub profile: EncodeProfile,
    pub warnings: Vec<ConfigurationWarning>,
}

/// Business rules mapping encoder choices to concrete codec settings
pub struct EncodeStrategySelector;

impl EncodeStrategySelector {
    pub const SOFTWARE_CODEC: &'static str = "libx264";

    /// Resolve the profile for a run. Never fails: unknown vendors fall back to
    /// software encoding and unknown crop ratios disable cropping.
    pub fn resolve(config: &AppConfig, crop: bool) -> Resolution {
        let mut warnings = Vec::new();

        let (video_codec, quality_mode, quality) = match config.encoder {
            EncoderChoice::Cpu => (Self::SOFTWARE_CODEC, QualityMode::Crf, config.cpu_quality),
            EncoderChoice::Gpu => match config.gpu_brand {
                Some(GpuBrand::Nvidia) => ("h264_nvenc", QualityMode::Cq, config.gpu_quality),
                Some(GpuBrand::Intel) => {
                    ("h264_qsv", QualityMode::GlobalQuality, config.gpu_quality)
                }
                Some(GpuBrand::Amd) => ("h264_amf", QualityMode::ConstantQp, config.gpu_quality),
                None => {
                    warnings.push(ConfigurationWarning::UnknownGpuBrand);
                    (Self::SOFTWARE_CODEC, QualityMode::Crf, config.gpu_quality)
                }
            },
        };

        let crop_filter = if crop {
            match Self::crop_filter(&config.crop_ratio) {
                Some(filter) => Some(filter.to_string()),
                None => {
                    warnings.push(ConfigurationWarning::UnknownCropRatio(
                        config.crop_ratio.clone(),
                    ));
                    None
                }
            }
        } else {
            None
        };

        Resolution {
            profile: EncodeProfile {
                video_codec: video_codec.to_string(),
                quality_mode,
                quality_param: quality.to_string(),
                preset_param: config.preset.clone(),
                audio_codec: config.audio_codec.clone(),
                crop_filter,
            },
            warnings,
        }
    }

    /// Look up the filter expression for a ratio key such as `9:16`
    pub fn crop_filter(ratio: &str) -> Option<&'static str> {
        let ratio = ratio.trim();
        CROP_FILTERS
            .iter()
            .find(|(key, _)| *key == ratio)
            .map(|(_, filter)| *filter)
    }

    /// All ratio keys with a known filter
    pub fn supported_crop_ratios() -> Vec<&'static str> {
        CROP_FILTERS.iter().map(|(key, _)| *key).collect()
    }
}

/// Summary shown to the operator before a run starts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitPreview {
    pub duration_seconds: f64,
    pub segment_length: f64,
    pub clip_count: usize,
    /// Splitting keeps roughly the source bitrate, so the source size is the estimate
    pub estimated_size_bytes: u64,
    /// Cropping re-frames the picture and can change the output size a lot
    pub size_estimate_unreliable: bool,
}

impl SplitPreview {
    /// Counts come from the plan itself so the preview never disagrees with the run
    pub fn from_plan(media: &SourceMedia, plan: &SegmentPlan, crop: bool) -> Self {
        Self {
            duration_seconds: plan.duration_seconds,
            segment_length: plan.segment_length,
            clip_count: plan.len(),
            estimated_size_bytes: media.size_bytes,
            size_estimate_unreliable: crop,
        }
    }
}

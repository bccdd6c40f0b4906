// TOML config adapter - Builds the run configuration from file, environment and defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "clipr.toml";

/// Environment variables and the settings they override
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("CLIPR_EXPORT_DIR", "export_dir"),
    ("CLIPR_ENCODER", "encoder"),
    ("CLIPR_GPU_BRAND", "gpu_brand"),
    ("CLIPR_CROP_RATIO", "crop_ratio"),
    ("CLIPR_PRESET", "preset"),
    ("CLIPR_SCHEDULING", "scheduling"),
    ("CLIPR_WORKERS", "workers"),
    ("CLIPR_FFMPEG", "ffmpeg_path"),
    ("CLIPR_FFPROBE", "ffprobe_path"),
    ("CLIPR_VERBOSE", "verbose"),
];

/// Unvalidated settings, as written in the `[clipr]` table of the config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub export_dir: Option<String>,
    pub encoder: Option<String>,
    pub gpu_brand: Option<String>,
    pub crop_ratio: Option<String>,
    pub preset: Option<String>,
    pub cpu_quality: Option<u8>,
    pub gpu_quality: Option<u8>,
    pub audio_codec: Option<String>,
    pub output_extension: Option<String>,
    pub scheduling: Option<String>,
    pub workers: Option<usize>,
    pub ffmpeg_path: Option<String>,
    pub ffprobe_path: Option<String>,
    pub fix_seekability: Option<bool>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    clipr: RawConfig,
}

/// TOML configuration adapter
#[derive(Debug, Default)]
pub struct TomlConfigAdapter {
    raw: RawConfig,
    config_file_path: Option<PathBuf>,
    warnings: Vec<ConfigurationWarning>,
}

impl TomlConfigAdapter {
    /// Create adapter holding only defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. A missing `[clipr]` table yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        let parsed: ConfigFile = toml::from_str(content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))?;
        Ok(Self {
            raw: parsed.clipr,
            ..Self::default()
        })
    }

    /// Load configuration from file
    pub fn load_config(file_path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        let mut adapter = Self::from_toml_str(&content)?;
        adapter.config_file_path = Some(file_path.to_path_buf());
        info!("Loaded configuration from {}", file_path.display());
        Ok(adapter)
    }

    /// Load the explicit file if given, else `clipr.toml` when present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, DomainError> {
        match explicit {
            Some(path) => Self::load_config(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_config(default_path)
                } else {
                    Ok(Self::new())
                }
            }
        }
    }

    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    pub fn raw(&self) -> &RawConfig {
        &self.raw
    }

    /// Mutable access for layering command-line overrides on top
    pub fn raw_mut(&mut self) -> &mut RawConfig {
        &mut self.raw
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F) -> usize
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = 0;
        for (env_var, key) in ENV_MAPPINGS {
            if let Some(value) = lookup(env_var) {
                info!("Found environment override: {} = {}", env_var, value);
                self.set(key, value);
                overrides += 1;
            }
        }
        overrides
    }

    fn set(&mut self, key: &str, value: String) {
        let raw = &mut self.raw;
        match key {
            "export_dir" => raw.export_dir = Some(value),
            "encoder" => raw.encoder = Some(value),
            "gpu_brand" => raw.gpu_brand = Some(value),
            "crop_ratio" => raw.crop_ratio = Some(value),
            "preset" => raw.preset = Some(value),
            "scheduling" => raw.scheduling = Some(value),
            "ffmpeg_path" => raw.ffmpeg_path = Some(value),
            "ffprobe_path" => raw.ffprobe_path = Some(value),
            "workers" => match value.trim().parse::<usize>() {
                Ok(workers) => raw.workers = Some(workers),
                Err(_) => self.warnings.push(ConfigurationWarning::InvalidValue {
                    key: key.to_string(),
                    value,
                }),
            },
            "verbose" => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => raw.verbose = Some(true),
                "0" | "false" | "no" => raw.verbose = Some(false),
                _ => self.warnings.push(ConfigurationWarning::InvalidValue {
                    key: key.to_string(),
                    value,
                }),
            },
            _ => {}
        }
    }

    /// Validate into the immutable run configuration. Invalid choices fall
    /// back to defaults and are reported as warnings, never as errors.
    pub fn resolve(self) -> (AppConfig, Vec<ConfigurationWarning>) {
        let defaults = AppConfig::default();
        let mut warnings = self.warnings;
        let raw = self.raw;

        let encoder = match raw.encoder.as_deref() {
            None => defaults.encoder,
            Some(value) => EncoderChoice::parse(value).unwrap_or_else(|_| {
                warnings.push(ConfigurationWarning::UnknownEncoder(value.to_string()));
                defaults.encoder
            }),
        };

        // An unrecognised brand is kept as "none". The strategy selector is
        // the one place that warns about it, and only when GPU is chosen.
        let gpu_brand = match raw.gpu_brand.as_deref() {
            None => defaults.gpu_brand,
            Some(value) => GpuBrand::parse(value).ok(),
        };

        let scheduling = match raw.scheduling.as_deref() {
            None => defaults.scheduling,
            Some(value) => Scheduling::parse(value).unwrap_or_else(|_| {
                warnings.push(ConfigurationWarning::UnknownScheduling(value.to_string()));
                defaults.scheduling
            }),
        };

        let config = AppConfig {
            export_dir: raw.export_dir.map(PathBuf::from).unwrap_or(defaults.export_dir),
            encoder,
            gpu_brand,
            crop_ratio: raw.crop_ratio.unwrap_or(defaults.crop_ratio),
            preset: raw.preset.unwrap_or(defaults.preset),
            cpu_quality: raw.cpu_quality.unwrap_or(defaults.cpu_quality),
            gpu_quality: raw.gpu_quality.unwrap_or(defaults.gpu_quality),
            audio_codec: raw.audio_codec.unwrap_or(defaults.audio_codec),
            output_extension: raw
                .output_extension
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or(defaults.output_extension),
            scheduling,
            workers: raw.workers.or(defaults.workers),
            ffmpeg_path: raw.ffmpeg_path.unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: raw.ffprobe_path.unwrap_or(defaults.ffprobe_path),
            fix_seekability: raw.fix_seekability.unwrap_or(defaults.fix_seekability),
            verbose: raw.verbose.unwrap_or(defaults.verbose),
        };

        (config, warnings)
    }
}

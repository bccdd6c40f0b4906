// Domain errors - Error types for the domain layer

use std::fmt;

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Probe tool failed or returned unusable data
    #[error("Probe unavailable: {0}")]
    ProbeUnavailable(String),

    /// Seekability fix (full-file remux) failed
    #[error("Could not make source seekable: {0}")]
    NormalizeFailed(String),

    /// Non-positive duration or segment length
    #[error("Invalid plan input: {0}")]
    InvalidPlanInput(String),

    /// External encode invocation failed
    #[error("External tool failed ({status}): {message}")]
    ExternalToolError {
        /// Exit status as reported by the OS, or "not started"
        status: String,
        message: String,
    },

    /// Filesystem operation failed
    #[error("Filesystem error: {0}")]
    FsFail(String),

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Operator cancelled the run
    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Build an `ExternalToolError` from a finished child's exit status
    pub fn from_exit_status(status: std::process::ExitStatus, message: impl Into<String>) -> Self {
        let status = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        DomainError::ExternalToolError {
            status,
            message: message.into(),
        }
    }
}

/// Non-fatal configuration problem that resolved to a safe default
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationWarning {
    /// GPU encoding requested without a recognised vendor
    UnknownGpuBrand,
    /// Crop requested with a ratio key missing from the filter table
    UnknownCropRatio(String),
    /// Encoder choice in configuration was not `cpu`/`gpu`
    UnknownEncoder(String),
    /// Scheduling mode in configuration was not `sequential`/`parallel`
    UnknownScheduling(String),
    /// Numeric setting could not be parsed
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationWarning::UnknownGpuBrand => {
                write!(f, "No valid GPU brand selected. Reverting to CPU encoding.")
            }
            ConfigurationWarning::UnknownCropRatio(ratio) => {
                write!(f, "Unknown crop ratio '{}'. Clips will not be cropped.", ratio)
            }
            ConfigurationWarning::UnknownEncoder(value) => {
                write!(f, "Unknown encoder '{}'. Using CPU encoding.", value)
            }
            ConfigurationWarning::UnknownScheduling(value) => {
                write!(f, "Unknown scheduling mode '{}'. Running sequentially.", value)
            }
            ConfigurationWarning::InvalidValue { key, value } => {
                write!(f, "Ignoring invalid value '{}' for '{}'", value, key)
            }
        }
    }
}

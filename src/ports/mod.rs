// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::*;
use crate::engine::progress::ProgressMonitor;
use crate::engine::{EncodeInvocation, RemuxInvocation};

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Container duration in seconds and size in bytes. Fields the tool
    /// reports as unavailable come back as zero; tool failures are errors.
    async fn probe_duration_and_size(&self, file_path: &Path) -> Result<(f64, u64), DomainError>;
}

/// Port for running one segment encode
#[async_trait]
pub trait EncodePort: Send + Sync {
    /// Run the invocation to completion, streaming its output through
    /// `monitor`. Returns `ExternalToolError` on nonzero exit and `Cancelled`
    /// if `cancel` fired first, in which case the child has been killed.
    async fn encode_segment(
        &self,
        invocation: &EncodeInvocation,
        monitor: &mut ProgressMonitor,
        cancel: &CancellationToken,
    ) -> Result<(), DomainError>;
}

/// Port for the full-file stream copy used to make a source seekable
#[async_trait]
pub trait RemuxPort: Send + Sync {
    async fn remux(&self, invocation: &RemuxInvocation) -> Result<(), DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Get file size
    async fn get_file_size(&self, file_path: &Path) -> Result<u64, DomainError>;

    /// Create directory (including parent directories); succeeds if it already exists
    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError>;

    /// Delete file; succeeds if it is already gone
    async fn delete_file(&self, file_path: &Path) -> Result<(), DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

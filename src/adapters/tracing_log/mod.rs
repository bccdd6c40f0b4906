// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;
use crate::ports::*;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(format_str: &str) -> Result<Self, DomainError> {
        match format_str.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log format: {}. Valid formats: text, json",
                format_str
            ))),
        }
    }
}

/// Tracing log adapter
pub struct TracingLogAdapter {
    current_level: LogLevel,
}

impl TracingLogAdapter {
    /// Install the global subscriber. `RUST_LOG` wins over `level` when set.
    /// Logs go to stderr so stdout stays clean for reports.
    pub fn init(level: LogLevel, format: LogFormat) -> Self {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

        // A subscriber may already be installed (tests, embedding); keep it
        let _ = match format {
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };

        Self {
            current_level: level,
        }
    }

    /// Adapter that forwards to whatever subscriber is active, without installing one
    pub fn new(level: LogLevel) -> Self {
        Self {
            current_level: level,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.current_level
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.current_level
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        if self.should_log(LogLevel::Info) {
            info!("{}", message);
        }
    }

    async fn warn(&self, message: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!("{}", message);
        }
    }

    async fn error(&self, message: &str) {
        if self.should_log(LogLevel::Error) {
            error!("{}", message);
        }
    }

    async fn debug(&self, message: &str) {
        if self.should_log(LogLevel::Debug) {
            debug!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("text").unwrap(), LogFormat::Text);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_level_filtering() {
        let adapter = TracingLogAdapter::new(LogLevel::Warn);
        assert!(adapter.should_log(LogLevel::Error));
        assert!(adapter.should_log(LogLevel::Warn));
        assert!(!adapter.should_log(LogLevel::Info));
        assert_eq!(adapter.level(), LogLevel::Warn);
    }
}

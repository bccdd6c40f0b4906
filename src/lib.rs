//! Clipr Library
//!
//! Splits a video into fixed-length clips by running one ffmpeg encode per
//! clip, with resume-by-skip, optional cropping and GPU encoders.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{ConfigurationWarning, DomainError};
pub use domain::model::{AppConfig, BatchReport, SegmentPlan, SegmentWindow, SourceMedia};
pub use domain::rules::{EncodeStrategySelector, SegmentPlanner};

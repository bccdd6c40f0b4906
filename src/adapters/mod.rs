// Adapters - External tool and environment integrations

pub mod exec_ffmpeg;
pub mod fs_local;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

pub use exec_ffmpeg::*;
pub use fs_local::*;
pub use probe_ffprobe::*;
pub use toml_config::*;
pub use tracing_log::*;

use std::sync::Arc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter, LocalFsAdapter};
use crate::app::{inspect_interactor::InspectInteractor, split_interactor::SplitInteractor};
use crate::domain::model::AppConfig;
use crate::ports::{EncodePort, FsPort, LogPort, ProbePort, RemuxPort};

pub trait AppContainer: Send + Sync {
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn split_interactor(&self) -> Arc<SplitInteractor>;
}

/// Wires the ffmpeg, ffprobe and local filesystem adapters for one run
pub struct DefaultAppContainer {
    inspect_interactor: Arc<InspectInteractor>,
    split_interactor: Arc<SplitInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: AppConfig, log_port: Arc<dyn LogPort>, console: bool) -> Self {
        let probe_port = Arc::new(FFprobeAdapter::new(config.ffprobe_path.clone()));
        let ffmpeg = Arc::new(FFmpegAdapter::new(config.ffmpeg_path.clone()));
        let fs_port = Arc::new(LocalFsAdapter::new());

        let inspect_interactor = Arc::new(InspectInteractor::new(
            probe_port as Arc<dyn ProbePort>,
            Arc::clone(&ffmpeg) as Arc<dyn RemuxPort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&log_port),
        ));

        let split_interactor = Arc::new(
            SplitInteractor::new(
                Arc::clone(&inspect_interactor),
                ffmpeg as Arc<dyn EncodePort>,
                fs_port as Arc<dyn FsPort>,
                log_port,
                config,
            )
            .with_console(console),
        );

        Self {
            inspect_interactor,
            split_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::clone(&self.split_interactor)
    }
}

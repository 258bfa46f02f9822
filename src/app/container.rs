use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    EditorConfig, FfmpegCliEngine, FsLocalAdapter, JpegImageAdapter, ProbeLibavAdapter,
};
use crate::app::{EditInteractor, InspectInteractor, ThumbnailInteractor};
use crate::domain::errors::DomainError;
use crate::engine::LifecycleController;
use crate::ports::{FsPort, ImageEncoderPort, MetadataPort, TranscodeEngine};

pub trait AppContainer: Send + Sync {
    fn edit_interactor(&self) -> Arc<EditInteractor>;
    fn thumbnail_interactor(&self) -> Arc<ThumbnailInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    edit_interactor: Arc<EditInteractor>,
    thumbnail_interactor: Arc<ThumbnailInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters from `config`
    pub fn new(config: &EditorConfig) -> Result<Self, DomainError> {
        let metadata_port = Arc::new(ProbeLibavAdapter::new()?);
        let engine = Arc::new(FfmpegCliEngine::new(
            config.ffmpeg_path.clone(),
            config.encoder_threads,
        ));
        let image_port = Arc::new(JpegImageAdapter::new());
        let fs_port = Arc::new(FsLocalAdapter::new(config.output_dir.clone())?);

        Ok(Self::from_ports(
            metadata_port,
            engine,
            image_port,
            fs_port,
            config.engine_timeout(),
        ))
    }

    /// Wire interactors over arbitrary port implementations
    pub fn from_ports(
        metadata_port: Arc<dyn MetadataPort>,
        engine: Arc<dyn TranscodeEngine>,
        image_port: Arc<dyn ImageEncoderPort>,
        fs_port: Arc<dyn FsPort>,
        engine_timeout: Option<Duration>,
    ) -> Self {
        let controller = Arc::new(
            LifecycleController::new(engine, Arc::clone(&fs_port))
                .with_engine_timeout(engine_timeout),
        );

        let edit_interactor = Arc::new(EditInteractor::new(
            Arc::clone(&metadata_port),
            Arc::clone(&fs_port),
            controller,
        ));

        let thumbnail_interactor = Arc::new(ThumbnailInteractor::new(
            Arc::clone(&metadata_port),
            image_port,
            Arc::clone(&fs_port),
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(metadata_port, fs_port));

        Self {
            edit_interactor,
            thumbnail_interactor,
            inspect_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn edit_interactor(&self) -> Arc<EditInteractor> {
        Arc::clone(&self.edit_interactor)
    }

    fn thumbnail_interactor(&self) -> Arc<ThumbnailInteractor> {
        Arc::clone(&self.thumbnail_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}

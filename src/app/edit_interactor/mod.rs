// Edit interactor - Orchestrates the trim and transcode use case

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{JobHandle, LifecycleController};
use crate::ports::*;

/// Prefix of generated video file names
pub const VIDEO_FILE_PREFIX: &str = "VID";

/// Interactor for the edit (trim + transcode) use case
pub struct EditInteractor {
    metadata_port: Arc<dyn MetadataPort>,
    fs_port: Arc<dyn FsPort>,
    controller: Arc<LifecycleController>,
}

impl EditInteractor {
    /// Create new edit interactor with injected ports
    pub fn new(
        metadata_port: Arc<dyn MetadataPort>,
        fs_port: Arc<dyn FsPort>,
        controller: Arc<LifecycleController>,
    ) -> Self {
        Self {
            metadata_port,
            fs_port,
            controller,
        }
    }

    /// Validate, probe and submit an edit request
    ///
    /// Every validation failure is returned before the engine is started.
    /// Once a handle is returned, all further outcomes go through `sink`.
    pub async fn edit(
        &self,
        request: EditRequest,
        sink: Arc<dyn LifecycleSink>,
    ) -> Result<JobHandle, DomainError> {
        if request.source_path.as_os_str().is_empty() {
            return Err(DomainError::InvalidArgument(
                "Input file path is required".to_string(),
            ));
        }

        let (window, target) = SettingsValidator::normalize(&request.trim, &request.transcode)?;
        debug!(?window, ?target, "Normalized edit settings");

        self.fs_port.ensure_readable(&request.source_path).await?;
        let media = self.metadata_port.probe(&request.source_path).await?;
        let geometry = media.video_geometry()?;

        // Reject empty ranges before a destination file is created
        TrimWindowResolver::resolve(&window, &geometry)?;

        let destination = self.destination(request.destination_path).await?;
        info!(
            source = %request.source_path.display(),
            destination = %destination.display(),
            "Starting edit"
        );

        let job = TranscodeJob::new(request.source_path, destination, window, target);
        self.controller.submit(job, &geometry, sink)
    }

    async fn destination(&self, requested: Option<PathBuf>) -> Result<PathBuf, DomainError> {
        match requested {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => self.fs_port.create_unique_file(VIDEO_FILE_PREFIX, "mp4").await,
        }
    }
}

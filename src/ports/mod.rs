// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for media probing and frame extraction
#[async_trait]
pub trait MetadataPort: Send + Sync {
    /// Probe a media file and return its track layout
    async fn probe(&self, path: &Path) -> Result<SourceMedia, DomainError>;

    /// Decode the frame at (or nearest after) `at_us`
    async fn frame_at(&self, path: &Path, at_us: u64) -> Result<RawFrame, DomainError>;
}

/// Identifies one engine instance; chosen by the caller of `start`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineHandle {
    pub id: String,
}

impl EngineHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Callback surface an engine reports through
///
/// Calls may arrive from any thread, in any order, and more than once.
/// Consumers must tolerate duplicates and events after a terminal one.
pub trait EngineListener: Send + Sync {
    fn on_started(&self, id: &str);
    fn on_progress(&self, id: &str, fraction: f32);
    fn on_completed(&self, id: &str);
    fn on_cancelled(&self, id: &str);
    fn on_error(&self, id: &str, message: Option<String>);
}

/// Port for the external transcode engine
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Start transcoding; returns once the engine accepted or rejected the job
    async fn start(
        &self,
        handle: &EngineHandle,
        config: EngineConfig,
        listener: Arc<dyn EngineListener>,
    ) -> Result<(), DomainError>;

    /// Request cancellation, best effort
    async fn cancel(&self, handle: &EngineHandle);

    /// Release everything held for `handle`
    fn release(&self, handle: &EngineHandle) -> Result<(), DomainError>;
}

/// Port for thumbnail image processing
pub trait ImageEncoderPort: Send + Sync {
    /// Resize a frame to exactly `width` x `height`
    fn scale(&self, frame: &RawFrame, width: u32, height: u32) -> Result<RawFrame, DomainError>;

    /// Encode a frame as JPEG
    fn encode_jpeg(&self, frame: &RawFrame, quality: u8) -> Result<Vec<u8>, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Fail unless `path` is an existing, readable file
    async fn ensure_readable(&self, path: &Path) -> Result<(), DomainError>;

    /// Atomically create an empty, uniquely named file in the output directory
    async fn create_unique_file(&self, prefix: &str, extension: &str)
        -> Result<PathBuf, DomainError>;

    /// Write `bytes` to `path`, replacing any content
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), DomainError>;

    /// Describe a finished output file
    fn describe(&self, path: &Path) -> Result<OutputDescriptor, DomainError>;
}

/// Receiver of a job's lifecycle events
///
/// `on_started` fires at most once, before any other event. Exactly one of
/// the terminal callbacks fires, exactly once.
pub trait LifecycleSink: Send + Sync {
    fn on_started(&self, job_id: &JobId);
    fn on_progress(&self, job_id: &JobId, fraction: f32);
    fn on_completed(&self, job_id: &JobId, file: &OutputDescriptor);
    fn on_cancelled(&self, job_id: &JobId);
    fn on_failed(&self, job_id: &JobId, message: &str);
}

// Thumbnail interactor - Extracts a single frame as JPEG

use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Prefix of generated thumbnail file names
pub const THUMBNAIL_FILE_PREFIX: &str = "TH";

/// Interactor for thumbnail extraction
pub struct ThumbnailInteractor {
    metadata_port: Arc<dyn MetadataPort>,
    image_port: Arc<dyn ImageEncoderPort>,
    fs_port: Arc<dyn FsPort>,
}

impl ThumbnailInteractor {
    pub fn new(
        metadata_port: Arc<dyn MetadataPort>,
        image_port: Arc<dyn ImageEncoderPort>,
        fs_port: Arc<dyn FsPort>,
    ) -> Self {
        Self {
            metadata_port,
            image_port,
            fs_port,
        }
    }

    /// Decode the frame at `request.at` milliseconds and return JPEG bytes
    pub async fn extract_thumbnail(&self, request: &ThumbnailRequest) -> Result<Vec<u8>, DomainError> {
        if request.source_path.as_os_str().is_empty() {
            return Err(DomainError::InvalidArgument(
                "Input file path is required".to_string(),
            ));
        }
        let at_ms = non_negative("at", request.at)?;
        let max_width = dimension("width", request.width)?;
        let max_height = dimension("height", request.height)?;

        self.fs_port.ensure_readable(&request.source_path).await?;

        let at_us = at_ms.saturating_mul(MICROS_PER_MILLI);
        let frame = self.metadata_port.frame_at(&request.source_path, at_us).await?;

        let frame = match ThumbnailScaler::scaled_size(frame.width, frame.height, max_width, max_height)? {
            Some((width, height)) => self.image_port.scale(&frame, width, height)?,
            None => frame,
        };

        info!(
            at_ms,
            width = frame.width,
            height = frame.height,
            "Encoding thumbnail"
        );
        self.image_port.encode_jpeg(&frame, THUMBNAIL_JPEG_QUALITY)
    }

    /// Extract a thumbnail into a new `TH_*.jpg` file
    pub async fn thumbnail_to_file(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<OutputDescriptor, DomainError> {
        let bytes = self.extract_thumbnail(request).await?;
        let path = self
            .fs_port
            .create_unique_file(THUMBNAIL_FILE_PREFIX, "jpg")
            .await?;
        self.fs_port.write_file(&path, &bytes).await?;
        self.fs_port.describe(&path)
    }
}

fn non_negative(name: &str, value: i64) -> Result<u64, DomainError> {
    u64::try_from(value).map_err(|_| {
        DomainError::InvalidArgument(format!("Parameter {} cannot be negative", name))
    })
}

fn dimension(name: &str, value: i64) -> Result<u32, DomainError> {
    let value = non_negative(name, value)?;
    u32::try_from(value).map_err(|_| {
        DomainError::InvalidArgument(format!("Parameter {} is too large: {}", name, value))
    })
}

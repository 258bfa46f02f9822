// Local filesystem adapter - Output naming, writing and description

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Filesystem adapter writing into a single output directory
pub struct FsLocalAdapter {
    output_dir: PathBuf,
}

impl FsLocalAdapter {
    /// Create adapter, creating `output_dir` if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<prefix>_<yyyyMMdd_HHmmss>_`, the stem before the random suffix
    pub fn timestamped_prefix(prefix: &str, now: DateTime<Local>) -> String {
        format!("{}_{}_", prefix, now.format("%Y%m%d_%H%M%S"))
    }
}

/// MIME type guessed from the file extension
pub fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "3gp" => "video/3gpp",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn ensure_readable(&self, path: &Path) -> Result<(), DomainError> {
        let unreadable = |reason: String| {
            DomainError::InvalidInput(format!(
                "Cannot read input file: {} ({})",
                path.display(),
                reason
            ))
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unreadable("not a regular file".to_string()));
        }
        tokio::fs::File::open(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        Ok(())
    }

    async fn create_unique_file(
        &self,
        prefix: &str,
        extension: &str,
    ) -> Result<PathBuf, DomainError> {
        let stem = Self::timestamped_prefix(prefix, Local::now());
        let suffix = format!(".{}", extension.trim_start_matches('.'));

        let (_file, path) = tempfile::Builder::new()
            .prefix(&stem)
            .suffix(&suffix)
            .rand_bytes(6)
            .tempfile_in(&self.output_dir)
            .and_then(|file| file.keep().map_err(|e| e.error))
            .map_err(|e| DomainError::FsFail(format!("Failed to create output file: {}", e)))?;

        debug!(path = %path.display(), "Created output file");
        Ok(path)
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
        tokio::fs::write(path, bytes).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    fn describe(&self, path: &Path) -> Result<OutputDescriptor, DomainError> {
        let metadata = fs::metadata(path).map_err(|e| {
            DomainError::FsFail(format!("Failed to stat {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(DomainError::FsFail(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(OutputDescriptor {
            name,
            path: path.to_path_buf(),
            mime_type: mime_for(path).to_string(),
            size: metadata.len(),
        })
    }
}

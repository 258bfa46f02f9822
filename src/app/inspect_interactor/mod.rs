// Inspect interactor - Probes a source file and summarizes its tracks

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Interactor for media file inspection
pub struct InspectInteractor {
    metadata_port: Arc<dyn MetadataPort>,
    fs_port: Arc<dyn FsPort>,
}

impl InspectInteractor {
    pub fn new(metadata_port: Arc<dyn MetadataPort>, fs_port: Arc<dyn FsPort>) -> Self {
        Self {
            metadata_port,
            fs_port,
        }
    }

    /// Probe `path` and return the track listing
    pub async fn inspect(&self, path: &Path) -> Result<SourceMedia, DomainError> {
        if path.as_os_str().is_empty() {
            return Err(DomainError::InvalidArgument(
                "Input file path is required".to_string(),
            ));
        }
        self.fs_port.ensure_readable(path).await?;

        let media = self.metadata_port.probe(path).await?;
        info!(
            path = %path.display(),
            video_tracks = media.video_tracks.len(),
            audio_tracks = media.audio_tracks.len(),
            "Media file probed"
        );
        Ok(media)
    }
}

/// Serialize a probe result as pretty JSON
pub fn format_as_json(media: &SourceMedia) -> Result<String, DomainError> {
    serde_json::to_string_pretty(media)
        .map_err(|e| DomainError::InvalidInput(format!("JSON serialization failed: {}", e)))
}

/// Human-readable probe summary
pub fn format_as_text(media: &SourceMedia) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Media File Information:");
    let _ = writeln!(output, "  File: {}", media.path.display());
    let _ = writeln!(
        output,
        "  Duration: {:.3}s",
        media.duration_us as f64 / 1_000_000.0
    );
    let _ = writeln!(
        output,
        "  File Size: {:.2} MB",
        media.size as f64 / 1_048_576.0
    );

    if !media.video_tracks.is_empty() {
        let _ = writeln!(output, "\nVideo Tracks ({}):", media.video_tracks.len());
        for track in &media.video_tracks {
            let _ = write!(
                output,
                "  Stream #{}: {}x{}, {}",
                track.index, track.width, track.height, track.codec
            );
            if let Some(fps) = track.frame_rate {
                let _ = write!(output, " @ {:.2}fps", fps);
            }
            output.push('\n');
        }
    }

    if !media.audio_tracks.is_empty() {
        let _ = writeln!(output, "\nAudio Tracks ({}):", media.audio_tracks.len());
        for track in &media.audio_tracks {
            let _ = write!(output, "  Stream #{}: {}", track.index, track.codec);
            if let Some(rate) = track.sample_rate {
                let _ = write!(output, ", {} Hz", rate);
            }
            output.push('\n');
        }
    }

    output
}

// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Microseconds per millisecond, the conversion into the engine's time unit
pub const MICROS_PER_MILLI: u64 = 1_000;

/// Default output frame rate
pub const DEFAULT_FPS: u32 = 30;

/// Key-frame interval of the encoded video, in seconds
pub const DEFAULT_KEY_FRAME_INTERVAL_SECS: u32 = 5;

/// Fixed JPEG quality for thumbnails
pub const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Trim settings as supplied by the caller, before defaults and range checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTrimSettings {
    /// Start of the window in milliseconds
    pub starts_at: Option<i64>,
    /// End of the window in milliseconds, 0 meaning "until source end"
    pub ends_at: Option<i64>,
}

/// Transcode settings as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTranscodeSettings {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub keep_aspect_ratio: Option<bool>,
    pub codec_hint: Option<String>,
    pub fps: Option<i64>,
}

/// Sub-range of the source to keep, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrimWindow {
    starts_at_ms: u64,
    ends_at_ms: u64,
}

impl TrimWindow {
    /// Create a trim window, rejecting negative boundaries
    pub fn new(starts_at_ms: i64, ends_at_ms: i64) -> Result<Self, DomainError> {
        if starts_at_ms < 0 {
            return Err(DomainError::InvalidArgument(
                "Parameter startsAt cannot be negative".to_string(),
            ));
        }
        if ends_at_ms < 0 {
            return Err(DomainError::InvalidArgument(
                "Parameter endsAt cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            starts_at_ms: starts_at_ms as u64,
            ends_at_ms: ends_at_ms as u64,
        })
    }

    /// Window covering the whole source
    pub fn full() -> Self {
        Self::default()
    }

    pub fn starts_at_ms(&self) -> u64 {
        self.starts_at_ms
    }

    pub fn ends_at_ms(&self) -> u64 {
        self.ends_at_ms
    }

    /// True when the window extends to the end of the source
    pub fn runs_to_end(&self) -> bool {
        self.ends_at_ms == 0
    }
}

/// Output video codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Avc,
    Hevc,
}

impl VideoCodec {
    /// Resolve a caller codec hint, `None` when the hint is not recognised
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "h264" | "avc" | "video/avc" => Some(VideoCodec::Avc),
            "h265" | "hevc" | "video/hevc" => Some(VideoCodec::Hevc),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            VideoCodec::Avc => "video/avc",
            VideoCodec::Hevc => "video/hevc",
        }
    }
}

/// Validated transcode target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeTarget {
    width: u32,
    height: u32,
    keep_aspect_ratio: bool,
    codec_hint: Option<String>,
    fps: u32,
}

impl TranscodeTarget {
    /// Create a transcode target with eager validation
    pub fn new(
        width: i64,
        height: i64,
        keep_aspect_ratio: bool,
        codec_hint: Option<String>,
        fps: i64,
    ) -> Result<Self, DomainError> {
        let width = Self::dimension("width", width)?;
        let height = Self::dimension("height", height)?;

        if fps < 1 {
            return Err(DomainError::InvalidArgument(
                "Parameter fps must be at least 1".to_string(),
            ));
        }
        let fps = u32::try_from(fps).map_err(|_| {
            DomainError::InvalidArgument(format!("Parameter fps is too large: {}", fps))
        })?;

        Ok(Self {
            width,
            height,
            keep_aspect_ratio,
            codec_hint,
            fps,
        })
    }

    fn dimension(name: &str, value: i64) -> Result<u32, DomainError> {
        if value < 0 {
            return Err(DomainError::InvalidArgument(format!(
                "Parameter {} cannot be negative",
                name
            )));
        }
        u32::try_from(value).map_err(|_| {
            DomainError::InvalidArgument(format!("Parameter {} is too large: {}", name, value))
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn keep_aspect_ratio(&self) -> bool {
        self.keep_aspect_ratio
    }

    pub fn codec_hint(&self) -> Option<&str> {
        self.codec_hint.as_deref()
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl Default for TranscodeTarget {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            keep_aspect_ratio: true,
            codec_hint: None,
            fps: DEFAULT_FPS,
        }
    }
}

/// Read-only snapshot of the source video track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVideoGeometry {
    width: u32,
    height: u32,
    duration_us: u64,
}

impl SourceVideoGeometry {
    pub fn new(width: u32, height: u32, duration_us: u64) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidInput(format!(
                "Video dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            duration_us,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn duration_us(&self) -> u64 {
        self.duration_us
    }

    /// Longer side of the source
    pub fn major(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }
}

/// Output size handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOutputGeometry {
    pub width: u32,
    pub height: u32,
}

impl ResolvedOutputGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_even(&self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }
}

impl fmt::Display for ResolvedOutputGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Resolved trim range in microseconds, `start_us < end_us`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRange {
    pub start_us: u64,
    pub end_us: u64,
}

impl MediaRange {
    pub fn new(start_us: u64, end_us: u64) -> Self {
        Self { start_us, end_us }
    }

    pub fn duration_us(&self) -> u64 {
        self.end_us.saturating_sub(self.start_us)
    }
}

/// Opaque, unique job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a transcode job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Created,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }

    /// Created -> Running -> {Completed | Cancelled | Failed}; a job that never
    /// reached Running may still terminate directly.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        match (self, next) {
            (JobState::Created, JobState::Running) => true,
            (JobState::Created | JobState::Running, next) => next.is_terminal(),
            _ => false,
        }
    }
}

/// Unit of work owned by the lifecycle controller
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    id: JobId,
    source_path: PathBuf,
    destination_path: PathBuf,
    window: TrimWindow,
    target: TranscodeTarget,
    state: JobState,
}

impl TranscodeJob {
    pub fn new(
        source_path: impl Into<PathBuf>,
        destination_path: impl Into<PathBuf>,
        window: TrimWindow,
        target: TranscodeTarget,
    ) -> Self {
        Self {
            id: JobId::new(),
            source_path: source_path.into(),
            destination_path: destination_path.into(),
            window,
            target,
            state: JobState::Created,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    pub fn window(&self) -> &TrimWindow {
        &self.window
    }

    pub fn target(&self) -> &TranscodeTarget {
        &self.target
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move the job to `next`, rejecting transitions out of a terminal state
    pub fn transition(&mut self, next: JobState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidArgument(format!(
                "Illegal job transition {:?} -> {:?}",
                self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}

/// Target video track format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub codec: VideoCodec,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub key_frame_interval_secs: u32,
    pub bit_rate: u64,
}

/// Target audio track format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub mime: String,
    pub channel_count: u32,
    pub sample_rate: u32,
    pub bit_rate: u64,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            mime: "audio/mp4a-latm".to_string(),
            channel_count: 2,
            sample_rate: 44_100,
            bit_rate: 128_000,
        }
    }
}

/// Engine-ready configuration for one transcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub range: MediaRange,
    pub video: VideoFormat,
    pub audio: AudioFormat,
}

/// Description of a produced media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// File name without directory
    pub name: String,
    /// Full path of the file
    pub path: PathBuf,
    /// MIME type of the file
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
}

/// Terminal outcome of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum JobOutcome {
    Completed { file: OutputDescriptor },
    Cancelled,
    Failed { message: String },
}

impl JobOutcome {
    /// Terminal state corresponding to this outcome
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Completed { .. } => JobState::Completed,
            JobOutcome::Cancelled => JobState::Cancelled,
            JobOutcome::Failed { .. } => JobState::Failed,
        }
    }
}

/// Terminal result published for a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalResult {
    pub job_id: JobId,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Progress notification, published as `transcodeProgress`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub fraction: f32,
}

/// Edit request as received at the boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditRequest {
    pub source_path: PathBuf,
    pub destination_path: Option<PathBuf>,
    pub trim: RawTrimSettings,
    pub transcode: RawTranscodeSettings,
}

/// Thumbnail request as received at the boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThumbnailRequest {
    pub source_path: PathBuf,
    /// Frame position in milliseconds
    pub at: i64,
    pub width: i64,
    pub height: i64,
}

/// Decoded RGB24 frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGB bytes, `width * height * 3` long
    pub pixels: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DomainError> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(DomainError::InvalidInput(format!(
                "Frame buffer of {} bytes does not match {}x{} RGB",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Video track as reported by the metadata extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoTrackFormat {
    pub index: usize,
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<f64>,
    pub bit_rate: Option<u64>,
}

/// Audio track as reported by the metadata extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrackFormat {
    pub index: usize,
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub bit_rate: Option<u64>,
}

/// Probed source media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMedia {
    pub path: PathBuf,
    pub size: u64,
    pub duration_us: u64,
    pub video_tracks: Vec<VideoTrackFormat>,
    pub audio_tracks: Vec<AudioTrackFormat>,
}

impl SourceMedia {
    /// Geometry snapshot of the first video track
    pub fn video_geometry(&self) -> Result<SourceVideoGeometry, DomainError> {
        let track = self
            .video_tracks
            .first()
            .ok_or_else(|| DomainError::InvalidInput("Video track not found".to_string()))?;

        SourceVideoGeometry::new(track.width, track.height, self.duration_us)
    }
}

#[cfg(test)]
mod tests;

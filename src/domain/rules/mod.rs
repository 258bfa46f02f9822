// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Long-side bound used in keep-aspect mode when no target size is given
pub const DEFAULT_KEEP_ASPECT_BOUND: u32 = 1280;

/// Long-side bound used in exact mode when the target size is incomplete
pub const EXACT_MODE_FALLBACK_BOUND: u32 = 720;

/// Smallest dimension ever handed to an encoder
pub const MIN_OUTPUT_DIMENSION: u32 = 2;

/// Normalizes and range-checks caller settings
pub struct SettingsValidator;

impl SettingsValidator {
    /// Apply defaults and validate raw trim/transcode settings
    pub fn normalize(
        raw_trim: &RawTrimSettings,
        raw_transcode: &RawTranscodeSettings,
    ) -> Result<(TrimWindow, TranscodeTarget), DomainError> {
        let window = TrimWindow::new(
            raw_trim.starts_at.unwrap_or(0),
            raw_trim.ends_at.unwrap_or(0),
        )?;

        let codec_hint = raw_transcode
            .codec_hint
            .as_ref()
            .map(|hint| hint.trim().to_string())
            .filter(|hint| !hint.is_empty());

        let target = TranscodeTarget::new(
            raw_transcode.width.unwrap_or(0),
            raw_transcode.height.unwrap_or(0),
            raw_transcode.keep_aspect_ratio.unwrap_or(true),
            codec_hint,
            raw_transcode.fps.unwrap_or(i64::from(DEFAULT_FPS)),
        )?;

        Ok((window, target))
    }
}

/// Derives the encoder output size from the source and the target
pub struct GeometryCalculator;

impl GeometryCalculator {
    /// Compute the output geometry for a source and a transcode target
    ///
    /// Keep-aspect mode bounds the longer side. A source already inside the
    /// bound keeps its size; a scaled output is rounded down to even. Exact
    /// mode uses a complete target verbatim and otherwise falls back to an
    /// at-most-720 bound computed from the source.
    pub fn compute_output_geometry(
        source: &SourceVideoGeometry,
        target: &TranscodeTarget,
    ) -> ResolvedOutputGeometry {
        if target.keep_aspect_ratio() {
            let bound = if target.width() == 0 && target.height() == 0 {
                DEFAULT_KEEP_ASPECT_BOUND
            } else {
                target.width().max(target.height())
            };
            return Self::at_most(source, bound);
        }

        if target.width() > 0 && target.height() > 0 {
            ResolvedOutputGeometry::new(target.width(), target.height())
        } else {
            Self::at_most(source, EXACT_MODE_FALLBACK_BOUND)
        }
    }

    /// Scale so the longer source side does not exceed `bound`
    pub fn at_most(source: &SourceVideoGeometry, bound: u32) -> ResolvedOutputGeometry {
        if source.major() <= bound {
            return ResolvedOutputGeometry::new(source.width(), source.height());
        }

        let (width, height) = if source.is_landscape() {
            (bound, Self::scale_minor(bound, source.height(), source.width()))
        } else {
            (Self::scale_minor(bound, source.width(), source.height()), bound)
        };

        ResolvedOutputGeometry::new(Self::even_floor(width), Self::even_floor(height))
    }

    fn scale_minor(bound: u32, minor: u32, major: u32) -> u32 {
        let scaled = (f64::from(bound) * f64::from(minor) / f64::from(major)).round();
        scaled as u32
    }

    /// Round down to even, never below `MIN_OUTPUT_DIMENSION`
    fn even_floor(value: u32) -> u32 {
        let even = value - value % 2;
        even.max(MIN_OUTPUT_DIMENSION)
    }
}

/// Target video bitrate heuristic
pub struct BitrateEstimator;

impl BitrateEstimator {
    /// Bits per second for AVC at ~0.07 bits/pixel/frame with motion factor 2
    pub fn estimate_video_bitrate(width: u32, height: u32, fps: u32) -> u64 {
        let pixel_rate = u128::from(width) * u128::from(height) * u128::from(fps);
        // 0.07 * 2 == 14 / 100, rounded half up
        let bits = (pixel_rate * 14 + 50) / 100;
        u64::try_from(bits).unwrap_or(u64::MAX)
    }
}

/// Converts a millisecond trim window into a microsecond media range
pub struct TrimWindowResolver;

impl TrimWindowResolver {
    pub fn resolve(
        window: &TrimWindow,
        source: &SourceVideoGeometry,
    ) -> Result<MediaRange, DomainError> {
        let duration_us = source.duration_us();
        if duration_us == 0 {
            return Err(DomainError::InvalidInput(
                "Input video with 0 duration".to_string(),
            ));
        }

        let start_us = window.starts_at_ms().saturating_mul(MICROS_PER_MILLI);
        let end_us = if window.runs_to_end() {
            duration_us
        } else {
            duration_us.min(window.ends_at_ms().saturating_mul(MICROS_PER_MILLI))
        };

        if start_us >= end_us {
            return Err(DomainError::InvalidRange(format!(
                "start ({}us) must be before end ({}us) within a {}us source",
                start_us, end_us, duration_us
            )));
        }

        Ok(MediaRange::new(start_us, end_us))
    }
}

/// Thumbnail rescale rule
///
/// The scale is anchored on the requested height only: the width is derived
/// from the frame aspect ratio and `max_width` is not consulted beyond
/// deciding whether to scale at all.
pub struct ThumbnailScaler;

impl ThumbnailScaler {
    /// Returns the scaled size, or `None` when no scaling was requested
    pub fn scaled_size(
        frame_width: u32,
        frame_height: u32,
        max_width: u32,
        max_height: u32,
    ) -> Result<Option<(u32, u32)>, DomainError> {
        if max_width == 0 && max_height == 0 {
            return Ok(None);
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(DomainError::InvalidInput(format!(
                "Cannot scale a {}x{} frame",
                frame_width, frame_height
            )));
        }

        let aspect_ratio = f64::from(frame_width) / f64::from(frame_height);
        let scale_width = (f64::from(max_height) * aspect_ratio) as u32;
        let scale_height = (f64::from(scale_width) / aspect_ratio) as u32;

        if scale_width == 0 || scale_height == 0 {
            return Err(DomainError::InvalidArgument(format!(
                "Thumbnail size {}x{} scales to an empty image; height drives the scale",
                max_width, max_height
            )));
        }

        Ok(Some((scale_width, scale_height)))
    }
}

//! Engine configuration builder
//!
//! Turns a validated job plus the probed source geometry into the
//! engine-ready [`EngineConfig`]: trim range, output geometry, bitrate and
//! the fixed audio track format.

use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::*;

/// Build the engine configuration for `job`
pub fn plan_engine_config(
    job: &TranscodeJob,
    source: &SourceVideoGeometry,
) -> Result<EngineConfig, DomainError> {
    let range = TrimWindowResolver::resolve(job.window(), source)?;
    let geometry = GeometryCalculator::compute_output_geometry(source, job.target());
    let fps = job.target().fps();
    let bit_rate = BitrateEstimator::estimate_video_bitrate(geometry.width, geometry.height, fps);
    let codec = resolve_codec(job.target().codec_hint());

    debug!(
        job_id = %job.id(),
        start_us = range.start_us,
        end_us = range.end_us,
        output = %geometry,
        bit_rate,
        codec = codec.mime(),
        "Planned engine configuration"
    );

    Ok(EngineConfig {
        source_path: job.source_path().to_path_buf(),
        destination_path: job.destination_path().to_path_buf(),
        range,
        video: VideoFormat {
            codec,
            width: geometry.width,
            height: geometry.height,
            frame_rate: fps,
            key_frame_interval_secs: DEFAULT_KEY_FRAME_INTERVAL_SECS,
            bit_rate,
        },
        audio: AudioFormat::default(),
    })
}

/// Map an optional codec hint, falling back to AVC
pub fn resolve_codec(hint: Option<&str>) -> VideoCodec {
    match hint {
        None => VideoCodec::default(),
        Some(hint) => VideoCodec::from_hint(hint).unwrap_or_else(|| {
            warn!(hint, "Unrecognised codec hint, using video/avc");
            VideoCodec::default()
        }),
    }
}

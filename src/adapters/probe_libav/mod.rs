// Probe LibAV adapter - Media probing and frame extraction using libav

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg::util::frame::video::Video as VideoFrame;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// LibAV-based metadata extractor
pub struct ProbeLibavAdapter;

impl ProbeLibavAdapter {
    /// Create new LibAV adapter, initializing FFmpeg once per process
    pub fn new() -> Result<Self, DomainError> {
        init_ffmpeg()?;
        Ok(Self)
    }

    fn probe_blocking(path: &Path) -> Result<SourceMedia, DomainError> {
        let context = ffmpeg::format::input(&path).map_err(|e| {
            DomainError::ProbeFail(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let duration_us = u64::try_from(context.duration()).unwrap_or(0);
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let mut video_tracks = Vec::new();
        let mut audio_tracks = Vec::new();

        for stream in context.streams() {
            let codec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| {
                    DomainError::ProbeFail(format!("Failed to read stream {}: {}", stream.index(), e))
                })?;
            let codec = codec_ctx.id().name().to_string();

            match codec_ctx.medium() {
                ffmpeg::media::Type::Video => {
                    if let Ok(video) = codec_ctx.decoder().video() {
                        video_tracks.push(VideoTrackFormat {
                            index: stream.index(),
                            codec,
                            width: video.width(),
                            height: video.height(),
                            frame_rate: frame_rate(stream.avg_frame_rate()),
                            bit_rate: positive(video.bit_rate()),
                        });
                    }
                }
                ffmpeg::media::Type::Audio => {
                    if let Ok(audio) = codec_ctx.decoder().audio() {
                        audio_tracks.push(AudioTrackFormat {
                            index: stream.index(),
                            codec,
                            sample_rate: Some(audio.rate()).filter(|rate| *rate > 0),
                            bit_rate: positive(audio.bit_rate()),
                        });
                    }
                }
                _ => {}
            }
        }

        info!(
            path = %path.display(),
            duration_us,
            video_tracks = video_tracks.len(),
            audio_tracks = audio_tracks.len(),
            "Probed media"
        );

        Ok(SourceMedia {
            path: path.to_path_buf(),
            size,
            duration_us,
            video_tracks,
            audio_tracks,
        })
    }

    fn frame_at_blocking(path: &Path, at_us: u64) -> Result<RawFrame, DomainError> {
        let mut ictx = ffmpeg::format::input(&path).map_err(|e| {
            DomainError::ProbeFail(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let (stream_index, time_base, mut decoder) = {
            let stream = ictx
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or_else(|| DomainError::InvalidInput("Video track not found".to_string()))?;
            let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .and_then(|ctx| ctx.decoder().video())
                .map_err(|e| DomainError::EngineFailure(format!("Failed to open decoder: {}", e)))?;
            (stream.index(), stream.time_base(), decoder)
        };

        let seek_ts = i64::try_from(at_us).unwrap_or(i64::MAX);
        ictx.seek(seek_ts, ..seek_ts).map_err(|e| {
            DomainError::FrameNotFound(format!("Cannot seek to {}us: {}", at_us, e))
        })?;

        let target_pts = to_stream_pts(at_us, time_base);
        debug!(at_us, target_pts, "Decoding thumbnail frame");

        let mut decoded = VideoFrame::empty();
        let mut last: Option<VideoFrame> = None;

        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index || decoder.send_packet(&packet).is_err() {
                continue;
            }
            while decoder.receive_frame(&mut decoded).is_ok() {
                if reached(&decoded, target_pts) {
                    return to_rgb(&decoded);
                }
                last = Some(decoded.clone());
            }
        }

        if decoder.send_eof().is_ok() {
            while decoder.receive_frame(&mut decoded).is_ok() {
                if reached(&decoded, target_pts) {
                    return to_rgb(&decoded);
                }
                last = Some(decoded.clone());
            }
        }

        match last {
            Some(frame) => to_rgb(&frame),
            None => Err(DomainError::FrameNotFound(format!(
                "No frame could be decoded at {}us",
                at_us
            ))),
        }
    }
}

#[async_trait]
impl MetadataPort for ProbeLibavAdapter {
    async fn probe(&self, path: &Path) -> Result<SourceMedia, DomainError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_blocking(&path))
            .await
            .map_err(|e| DomainError::ProbeFail(format!("Probe task failed: {}", e)))?
    }

    async fn frame_at(&self, path: &Path, at_us: u64) -> Result<RawFrame, DomainError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::frame_at_blocking(&path, at_us))
            .await
            .map_err(|e| DomainError::EngineFailure(format!("Frame task failed: {}", e)))?
    }
}

fn init_ffmpeg() -> Result<(), DomainError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| ffmpeg::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| DomainError::ProbeFail(format!("FFmpeg initialization failed: {}", e)))
}

fn frame_rate(rate: ffmpeg::Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(f64::from(rate))
    } else {
        None
    }
}

fn positive(bit_rate: usize) -> Option<u64> {
    u64::try_from(bit_rate).ok().filter(|rate| *rate > 0)
}

/// Convert microseconds into `time_base` units
fn to_stream_pts(at_us: u64, time_base: ffmpeg::Rational) -> i64 {
    let num = i128::from(time_base.numerator());
    let den = i128::from(time_base.denominator());
    if num <= 0 || den <= 0 {
        return 0;
    }
    let pts = i128::from(at_us) * den / (num * 1_000_000);
    i64::try_from(pts).unwrap_or(i64::MAX)
}

fn reached(frame: &VideoFrame, target_pts: i64) -> bool {
    match frame.timestamp().or_else(|| frame.pts()) {
        Some(pts) => pts >= target_pts,
        None => true,
    }
}

/// Scale a decoded frame to packed RGB24
fn to_rgb(frame: &VideoFrame) -> Result<RawFrame, DomainError> {
    let (width, height) = (frame.width(), frame.height());
    let mut scaler = ScalingContext::get(
        frame.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )
    .map_err(|e| DomainError::EngineFailure(format!("Failed to create scaler: {}", e)))?;

    let mut rgb = VideoFrame::empty();
    scaler
        .run(frame, &mut rgb)
        .map_err(|e| DomainError::EngineFailure(format!("Failed to convert frame: {}", e)))?;

    let stride = rgb.stride(0);
    let row_len = width as usize * 3;
    let data = rgb.data(0);
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let row = data
            .get(y * stride..y * stride + row_len)
            .ok_or_else(|| DomainError::EngineFailure("Truncated RGB frame".to_string()))?;
        pixels.extend_from_slice(row);
    }

    RawFrame::new(width, height, pixels)
}

//! FFmpeg execution adapter
//!
//! Runs one `ffmpeg` child process per engine handle. Progress is read from
//! `-progress pipe:1`; cancellation kills the child.

use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const STDERR_TAIL_LINES: usize = 20;

type CancelMap = Arc<Mutex<HashMap<String, oneshot::Sender<()>>>>;

/// FFmpeg command-line transcode engine
pub struct FfmpegCliEngine {
    ffmpeg_path: PathBuf,
    threads: usize,
    running: CancelMap,
}

impl FfmpegCliEngine {
    /// Create new engine using the given `ffmpeg` binary
    pub fn new(ffmpeg_path: impl Into<PathBuf>, threads: usize) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            threads: threads.max(1),
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of jobs with a live cancel channel
    pub fn active_jobs(&self) -> usize {
        lock(&self.running).len()
    }
}

/// Build the ffmpeg argument list for one transcode
pub fn build_args(config: &EngineConfig, threads: usize) -> Vec<OsString> {
    let video = &config.video;
    let audio = &config.audio;
    let encoder = match video.codec {
        VideoCodec::Avc => "libx264",
        VideoCodec::Hevc => "libx265",
    };
    let start = format_us(config.range.start_us);
    let duration = format_us(config.range.duration_us());
    let bit_rate = video.bit_rate.to_string();
    let frame_rate = video.frame_rate.to_string();
    let gop = video
        .frame_rate
        .saturating_mul(video.key_frame_interval_secs)
        .to_string();
    let scale = format!("scale={}:{}", video.width, video.height);
    let threads = threads.to_string();
    let channels = audio.channel_count.to_string();
    let sample_rate = audio.sample_rate.to_string();
    let audio_bit_rate = audio.bit_rate.to_string();

    let mut args: Vec<OsString> = Vec::new();
    args.extend(
        ["-hide_banner", "-nostdin", "-y", "-loglevel", "error", "-ss", start.as_str(), "-i"]
            .map(OsString::from),
    );
    args.push(config.source_path.clone().into_os_string());
    args.extend(
        [
            "-t", duration.as_str(),
            "-map", "0:v:0",
            "-map", "0:a:0?",
            "-c:v", encoder,
            "-b:v", bit_rate.as_str(),
            "-r", frame_rate.as_str(),
            "-g", gop.as_str(),
            "-vf", scale.as_str(),
            "-pix_fmt", "yuv420p",
            "-threads", threads.as_str(),
            "-c:a", "aac",
            "-ac", channels.as_str(),
            "-ar", sample_rate.as_str(),
            "-b:a", audio_bit_rate.as_str(),
            "-movflags", "+faststart",
            "-progress", "pipe:1",
            "-nostats",
        ]
        .map(OsString::from),
    );
    args.push(config.destination_path.clone().into_os_string());
    args
}

/// Seconds with microsecond precision, as ffmpeg accepts them
pub fn format_us(us: u64) -> String {
    format!("{}.{:06}", us / 1_000_000, us % 1_000_000)
}

/// Fraction of `duration_us` reached by an `out_time_us` value
pub fn progress_fraction(out_time_us: i64, duration_us: u64) -> Option<f32> {
    if duration_us == 0 || out_time_us < 0 {
        return None;
    }
    let fraction = out_time_us as f64 / duration_us as f64;
    Some(fraction.min(1.0) as f32)
}

enum Exit {
    Finished(std::io::Result<ExitStatus>),
    Cancelled,
}

#[async_trait]
impl TranscodeEngine for FfmpegCliEngine {
    async fn start(
        &self,
        handle: &EngineHandle,
        config: EngineConfig,
        listener: Arc<dyn EngineListener>,
    ) -> Result<(), DomainError> {
        let args = build_args(&config, self.threads);
        debug!(id = %handle.id, ?args, "Spawning ffmpeg");

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::EngineFailure(format!(
                    "Failed to spawn {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        lock(&self.running).insert(handle.id.clone(), cancel_tx);

        let id = handle.id.clone();
        let duration_us = config.range.duration_us();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        tokio::spawn(async move {
            listener.on_started(&id);

            let progress_task = stdout.map(|out| {
                tokio::spawn(read_progress(out, duration_us, Arc::clone(&listener), id.clone()))
            });
            let stderr_task = stderr.map(|err| tokio::spawn(collect_tail(err)));

            let exit = tokio::select! {
                status = child.wait() => Exit::Finished(status),
                Ok(()) = &mut cancel_rx => Exit::Cancelled,
            };

            if let Exit::Cancelled = exit {
                if let Err(e) = child.kill().await {
                    warn!(id = %id, error = %e, "Failed to kill ffmpeg");
                }
            }

            if let Some(task) = progress_task {
                let _ = task.await;
            }
            let tail = match stderr_task {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };

            match exit {
                Exit::Cancelled => listener.on_cancelled(&id),
                Exit::Finished(Ok(status)) if status.success() => {
                    info!(id = %id, "ffmpeg finished");
                    listener.on_completed(&id);
                }
                Exit::Finished(Ok(status)) => {
                    let message = if tail.is_empty() {
                        format!("ffmpeg exited with {}", status)
                    } else {
                        format!("ffmpeg exited with {}: {}", status, tail)
                    };
                    listener.on_error(&id, Some(message));
                }
                Exit::Finished(Err(e)) => {
                    listener.on_error(&id, Some(format!("Failed to wait for ffmpeg: {}", e)));
                }
            }
        });

        Ok(())
    }

    async fn cancel(&self, handle: &EngineHandle) {
        let sender = lock(&self.running).remove(&handle.id);
        match sender {
            Some(tx) => {
                // Receiver gone means the process already exited
                let _ = tx.send(());
            }
            None => debug!(id = %handle.id, "Cancel for unknown or finished job"),
        }
    }

    fn release(&self, handle: &EngineHandle) -> Result<(), DomainError> {
        lock(&self.running).remove(&handle.id);
        Ok(())
    }
}

async fn read_progress<R>(
    reader: R,
    duration_us: u64,
    listener: Arc<dyn EngineListener>,
    id: String,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Some(value) = line.strip_prefix("out_time_us=") else {
            continue;
        };
        if let Some(fraction) = value
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|us| progress_fraction(us, duration_us))
        {
            listener.on_progress(&id, fraction);
        }
    }
}

async fn collect_tail<R>(reader: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n").trim().to_string()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Lifecycle sinks for CLI and programmatic consumers

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::model::{JobId, OutputDescriptor, ProgressEvent};
use crate::ports::LifecycleSink;

/// One lifecycle event as published to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LifecycleEvent {
    TranscodeStarted { job_id: JobId },
    TranscodeProgress { job_id: JobId, fraction: f32 },
    TranscodeCompleted { job_id: JobId, file: OutputDescriptor },
    TranscodeCancelled { job_id: JobId },
    TranscodeFailed { job_id: JobId, message: String },
}

impl LifecycleEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            LifecycleEvent::TranscodeStarted { job_id }
            | LifecycleEvent::TranscodeProgress { job_id, .. }
            | LifecycleEvent::TranscodeCompleted { job_id, .. }
            | LifecycleEvent::TranscodeCancelled { job_id }
            | LifecycleEvent::TranscodeFailed { job_id, .. } => *job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::TranscodeCompleted { .. }
                | LifecycleEvent::TranscodeCancelled { .. }
                | LifecycleEvent::TranscodeFailed { .. }
        )
    }
}

impl From<ProgressEvent> for LifecycleEvent {
    fn from(event: ProgressEvent) -> Self {
        LifecycleEvent::TranscodeProgress {
            job_id: event.job_id,
            fraction: event.fraction,
        }
    }
}

/// Progress bar on stderr for interactive use
#[derive(Default)]
pub struct ConsoleSink {
    last_percent: Mutex<Option<u32>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_bar(fraction: f32) -> String {
        let bar_length = 20;
        let filled = ((fraction * bar_length as f32) as usize).min(bar_length);
        format!(
            "[{}{}] {:>5.1}%",
            "#".repeat(filled),
            "-".repeat(bar_length - filled),
            fraction * 100.0
        )
    }

    /// Whole percent to draw, `None` when the bar would not change
    fn next_percent(&self, fraction: f32) -> Option<u32> {
        let percent = (fraction * 100.0) as u32;
        let mut last = self
            .last_percent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *last == Some(percent) {
            return None;
        }
        *last = Some(percent);
        Some(percent)
    }

    fn finish_line(&self, message: &str) {
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\r{}", message);
    }
}

impl LifecycleSink for ConsoleSink {
    fn on_started(&self, job_id: &JobId) {
        debug!(%job_id, "Transcode started");
    }

    fn on_progress(&self, _job_id: &JobId, fraction: f32) {
        if self.next_percent(fraction).is_none() {
            return;
        }

        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{}", Self::render_bar(fraction));
        let _ = stderr.flush();
    }

    fn on_completed(&self, _job_id: &JobId, file: &OutputDescriptor) {
        self.finish_line(&format!(
            "Completed: {} ({} bytes, {})",
            file.path.display(),
            file.size,
            file.mime_type
        ));
    }

    fn on_cancelled(&self, _job_id: &JobId) {
        self.finish_line("Transcode canceled");
    }

    fn on_failed(&self, _job_id: &JobId, message: &str) {
        self.finish_line(&format!("Transcode failed: {}", message));
    }
}

/// One JSON object per event on stdout
pub struct JsonEventSink {
    output_progress_events: bool,
}

impl JsonEventSink {
    pub fn new(output_progress_events: bool) -> Self {
        Self {
            output_progress_events,
        }
    }

    /// Render an event with an RFC 3339 timestamp
    pub fn render(event: &LifecycleEvent) -> serde_json::Value {
        let mut value = serde_json::to_value(event).unwrap_or_else(|e| {
            serde_json::json!({ "event": "serializationError", "message": e.to_string() })
        });
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    fn emit(&self, event: LifecycleEvent) {
        println!("{}", Self::render(&event));
    }
}

impl LifecycleSink for JsonEventSink {
    fn on_started(&self, job_id: &JobId) {
        self.emit(LifecycleEvent::TranscodeStarted { job_id: *job_id });
    }

    fn on_progress(&self, job_id: &JobId, fraction: f32) {
        if self.output_progress_events {
            self.emit(
                ProgressEvent {
                    job_id: *job_id,
                    fraction,
                }
                .into(),
            );
        }
    }

    fn on_completed(&self, job_id: &JobId, file: &OutputDescriptor) {
        self.emit(LifecycleEvent::TranscodeCompleted {
            job_id: *job_id,
            file: file.clone(),
        });
    }

    fn on_cancelled(&self, job_id: &JobId) {
        self.emit(LifecycleEvent::TranscodeCancelled { job_id: *job_id });
    }

    fn on_failed(&self, job_id: &JobId, message: &str) {
        self.emit(LifecycleEvent::TranscodeFailed {
            job_id: *job_id,
            message: message.to_string(),
        });
    }
}

/// Forwards events into a Tokio channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: LifecycleEvent) {
        // A dropped receiver only means nobody listens any more
        let _ = self.tx.send(event);
    }
}

impl LifecycleSink for ChannelSink {
    fn on_started(&self, job_id: &JobId) {
        self.send(LifecycleEvent::TranscodeStarted { job_id: *job_id });
    }

    fn on_progress(&self, job_id: &JobId, fraction: f32) {
        self.send(LifecycleEvent::TranscodeProgress {
            job_id: *job_id,
            fraction,
        });
    }

    fn on_completed(&self, job_id: &JobId, file: &OutputDescriptor) {
        self.send(LifecycleEvent::TranscodeCompleted {
            job_id: *job_id,
            file: file.clone(),
        });
    }

    fn on_cancelled(&self, job_id: &JobId) {
        self.send(LifecycleEvent::TranscodeCancelled { job_id: *job_id });
    }

    fn on_failed(&self, job_id: &JobId, message: &str) {
        self.send(LifecycleEvent::TranscodeFailed {
            job_id: *job_id,
            message: message.to_string(),
        });
    }
}

/// Discards every event
pub struct NoOpSink;

impl LifecycleSink for NoOpSink {
    fn on_started(&self, _job_id: &JobId) {}
    fn on_progress(&self, _job_id: &JobId, _fraction: f32) {}
    fn on_completed(&self, _job_id: &JobId, _file: &OutputDescriptor) {}
    fn on_cancelled(&self, _job_id: &JobId) {}
    fn on_failed(&self, _job_id: &JobId, _message: &str) {}
}

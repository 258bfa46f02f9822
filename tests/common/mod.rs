//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use vedit::domain::errors::DomainError;
use vedit::domain::model::*;
use vedit::engine::LifecycleEvent;
use vedit::ports::*;

/// One call received by [`FakeEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Start(String),
    Cancel(String),
    Release(String),
}

/// Engine driven by the test through the stored listener
#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    configs: Mutex<Vec<EngineConfig>>,
    listeners: Mutex<HashMap<String, Arc<dyn EngineListener>>>,
    reject_with: Option<String>,
    gate: Option<Arc<Notify>>,
    honour_cancel: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// `start` fails with `message`
    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `start` blocks until `gate` is notified
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// `cancel` reports `on_cancelled` back through the listener
    pub fn honouring_cancel(mut self) -> Self {
        self.honour_cancel = true;
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matcher: fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matcher(c)).count()
    }

    pub fn starts(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::Start(_)))
    }

    pub fn cancels(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::Cancel(_)))
    }

    pub fn releases(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::Release(_)))
    }

    pub fn last_config(&self) -> Option<EngineConfig> {
        self.configs.lock().unwrap().last().cloned()
    }

    pub fn listener(&self, id: &str) -> Arc<dyn EngineListener> {
        Arc::clone(
            self.listeners
                .lock()
                .unwrap()
                .get(id)
                .expect("engine was not started for this id"),
        )
    }

    /// Wait until `start` has been entered for `id`
    pub async fn wait_started(&self, id: &str) -> Arc<dyn EngineListener> {
        for _ in 0..400 {
            if let Some(listener) = self.listeners.lock().unwrap().get(id) {
                return Arc::clone(listener);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("engine start was never called for {}", id);
    }
}

#[async_trait]
impl TranscodeEngine for FakeEngine {
    async fn start(
        &self,
        handle: &EngineHandle,
        config: EngineConfig,
        listener: Arc<dyn EngineListener>,
    ) -> Result<(), DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Start(handle.id.clone()));
        self.configs.lock().unwrap().push(config);
        self.listeners
            .lock()
            .unwrap()
            .insert(handle.id.clone(), listener);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reject_with {
            Some(message) => Err(DomainError::EngineFailure(message.clone())),
            None => Ok(()),
        }
    }

    async fn cancel(&self, handle: &EngineHandle) {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Cancel(handle.id.clone()));
        if self.honour_cancel {
            let listener = self.listeners.lock().unwrap().get(&handle.id).cloned();
            if let Some(listener) = listener {
                listener.on_cancelled(&handle.id);
            }
        }
    }

    fn release(&self, handle: &EngineHandle) -> Result<(), DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Release(handle.id.clone()));
        Ok(())
    }
}

/// Metadata port returning a fixed source and solid-colour frames
pub struct FakeMetadata {
    pub media: SourceMedia,
    pub frame_size: (u32, u32),
    pub frame_requests: Mutex<Vec<u64>>,
}

impl FakeMetadata {
    pub fn new(width: u32, height: u32, duration_us: u64) -> Self {
        Self {
            media: SourceMedia {
                path: PathBuf::from("source.mp4"),
                size: 1024,
                duration_us,
                video_tracks: vec![VideoTrackFormat {
                    index: 0,
                    codec: "h264".to_string(),
                    width,
                    height,
                    frame_rate: Some(30.0),
                    bit_rate: None,
                }],
                audio_tracks: Vec::new(),
            },
            frame_size: (width, height),
            frame_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn without_video(duration_us: u64) -> Self {
        let mut fake = Self::new(0, 0, duration_us);
        fake.media.video_tracks.clear();
        fake
    }

    pub fn frame_requests(&self) -> Vec<u64> {
        self.frame_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataPort for FakeMetadata {
    async fn probe(&self, path: &Path) -> Result<SourceMedia, DomainError> {
        let mut media = self.media.clone();
        media.path = path.to_path_buf();
        Ok(media)
    }

    async fn frame_at(&self, _path: &Path, at_us: u64) -> Result<RawFrame, DomainError> {
        self.frame_requests.lock().unwrap().push(at_us);
        let (width, height) = self.frame_size;
        RawFrame::new(width, height, vec![128; (width * height * 3) as usize])
    }
}

/// Collect every event delivered so far
pub fn drain(rx: &mut mpsc::UnboundedReceiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Event names in delivery order
pub fn names(events: &[LifecycleEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            LifecycleEvent::TranscodeStarted { .. } => "started",
            LifecycleEvent::TranscodeProgress { .. } => "progress",
            LifecycleEvent::TranscodeCompleted { .. } => "completed",
            LifecycleEvent::TranscodeCancelled { .. } => "cancelled",
            LifecycleEvent::TranscodeFailed { .. } => "failed",
        })
        .collect()
}

/// Write a placeholder media file
pub fn touch(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

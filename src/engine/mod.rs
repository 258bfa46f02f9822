//! Transcode orchestration: configuration planning, lifecycle control and sinks

pub mod config;
pub mod lifecycle;
pub mod progress;

pub use config::plan_engine_config;
pub use lifecycle::{JobHandle, LifecycleController};
pub use progress::{ChannelSink, ConsoleSink, JsonEventSink, LifecycleEvent, NoOpSink};

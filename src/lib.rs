//! vedit video editing library
//!
//! Trims and re-encodes video files on a pluggable transcode engine and
//! extracts JPEG thumbnails. Jobs run asynchronously and report exactly one
//! terminal outcome through a [`ports::LifecycleSink`].
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - [`domain`] holds the pure model and rules (validation, geometry, bitrate)
//! - [`ports`] declares the traits the application depends on
//! - [`adapters`] implements them on FFmpeg, the local filesystem and `image`
//! - [`engine`] owns job lifecycle and event delivery
//! - [`app`] wires interactors for the edit, thumbnail and probe use cases

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer};
pub use domain::errors::DomainError;
pub use domain::model::{
    EditRequest, JobId, JobOutcome, OutputDescriptor, SourceMedia, TerminalResult,
    ThumbnailRequest,
};
pub use engine::{JobHandle, LifecycleController, LifecycleEvent};
pub use error::{VeditError, VeditResult};

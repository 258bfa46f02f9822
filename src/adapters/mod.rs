// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_local;
pub mod image_jpeg;
pub mod probe_libav;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegCliEngine;
pub use fs_local::FsLocalAdapter;
pub use image_jpeg::JpegImageAdapter;
pub use probe_libav::ProbeLibavAdapter;
pub use toml_config::EditorConfig;
pub use tracing_log::{init_logging, LogFormat, LogLevel};

//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{EditRequest, RawTranscodeSettings, RawTrimSettings, ThumbnailRequest};

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (default: generated VID_*.mp4 in the output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start of the kept window in milliseconds
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// End of the kept window in milliseconds (0 keeps the rest of the file)
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// Target width, or bound of the longer side when keeping aspect ratio
    #[arg(long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Target height, or bound of the longer side when keeping aspect ratio
    #[arg(long, allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Use the exact target size instead of scaling the source
    #[arg(long)]
    pub exact: bool,

    /// Codec hint, e.g. "hevc" or "video/avc"
    #[arg(long)]
    pub codec: Option<String>,

    /// Output frame rate
    #[arg(long, allow_negative_numbers = true)]
    pub fps: Option<i64>,

    /// Emit lifecycle events as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Include progress events in JSON output
    #[arg(long, requires = "json")]
    pub progress_events: bool,
}

impl EditArgs {
    pub fn to_request(&self) -> EditRequest {
        EditRequest {
            source_path: self.input.clone(),
            destination_path: self.output.clone(),
            trim: RawTrimSettings {
                starts_at: self.start,
                ends_at: self.end,
            },
            transcode: RawTranscodeSettings {
                width: self.width,
                height: self.height,
                keep_aspect_ratio: self.exact.then_some(false),
                codec_hint: self.codec.clone(),
                fps: self.fps,
            },
        }
    }
}

/// Arguments for the thumbnail command
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Frame position in milliseconds
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub at: i64,

    /// Maximum thumbnail width (0 leaves it unbounded)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub width: i64,

    /// Maximum thumbnail height (0 leaves it unbounded)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub height: i64,

    /// Print the file descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

impl ThumbnailArgs {
    pub fn to_request(&self) -> ThumbnailRequest {
        ThumbnailRequest {
            source_path: self.input.clone(),
            at: self.at,
            width: self.width,
            height: self.height,
        }
    }
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_edit_args_to_request() {
        let cli = Cli::try_parse_from([
            "vedit", "edit", "-i", "in.mp4", "--start", "1000", "--end", "-5", "--width", "640",
            "--exact", "--codec", "hevc",
        ])
        .unwrap();

        let Commands::Edit(args) = cli.command else {
            panic!("expected edit command");
        };
        let request = args.to_request();
        assert_eq!(request.source_path, PathBuf::from("in.mp4"));
        assert_eq!(request.destination_path, None);
        assert_eq!(request.trim.starts_at, Some(1000));
        assert_eq!(request.trim.ends_at, Some(-5));
        assert_eq!(request.transcode.width, Some(640));
        assert_eq!(request.transcode.keep_aspect_ratio, Some(false));
        assert_eq!(request.transcode.codec_hint.as_deref(), Some("hevc"));
    }

    #[test]
    fn test_keep_aspect_is_left_to_defaults() {
        let cli = Cli::try_parse_from(["vedit", "edit", "-i", "in.mp4"]).unwrap();
        let Commands::Edit(args) = cli.command else {
            panic!("expected edit command");
        };
        assert_eq!(args.to_request().transcode.keep_aspect_ratio, None);
    }

    #[test]
    fn test_progress_events_require_json() {
        assert!(Cli::try_parse_from(["vedit", "edit", "-i", "in.mp4", "--progress-events"]).is_err());
    }

    #[test]
    fn test_thumbnail_defaults() {
        let cli = Cli::try_parse_from(["vedit", "thumbnail", "-i", "in.mp4"]).unwrap();
        let Commands::Thumbnail(args) = cli.command else {
            panic!("expected thumbnail command");
        };
        let request = args.to_request();
        assert_eq!((request.at, request.width, request.height), (0, 0, 0));
    }
}

// Unit tests for domain models

use super::*;

#[test]
fn test_trim_window_rejects_negative_bounds() {
    let err = TrimWindow::new(-1, 0).unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidArgument("Parameter startsAt cannot be negative".to_string())
    );

    let err = TrimWindow::new(0, -5).unwrap_err();
    assert!(err.to_string().contains("Parameter endsAt cannot be negative"));
}

#[test]
fn test_trim_window_full_runs_to_end() {
    let window = TrimWindow::full();
    assert_eq!(window.starts_at_ms(), 0);
    assert!(window.runs_to_end());

    let window = TrimWindow::new(1_000, 2_000).unwrap();
    assert!(!window.runs_to_end());
    assert_eq!(window.ends_at_ms(), 2_000);
}

#[test]
fn test_transcode_target_validation() {
    let err = TranscodeTarget::new(-2, 0, true, None, 30).unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidArgument("Parameter width cannot be negative".to_string())
    );

    let err = TranscodeTarget::new(0, -1, true, None, 30).unwrap_err();
    assert!(err.to_string().contains("Parameter height cannot be negative"));

    let err = TranscodeTarget::new(0, 0, true, None, 0).unwrap_err();
    assert!(err.to_string().contains("Parameter fps must be at least 1"));

    let err = TranscodeTarget::new(i64::from(u32::MAX) + 1, 0, true, None, 30).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_transcode_target_default() {
    let target = TranscodeTarget::default();
    assert_eq!(target.width(), 0);
    assert_eq!(target.height(), 0);
    assert!(target.keep_aspect_ratio());
    assert_eq!(target.codec_hint(), None);
    assert_eq!(target.fps(), DEFAULT_FPS);
}

#[test]
fn test_video_codec_hints() {
    assert_eq!(VideoCodec::from_hint("h264"), Some(VideoCodec::Avc));
    assert_eq!(VideoCodec::from_hint(" HEVC "), Some(VideoCodec::Hevc));
    assert_eq!(VideoCodec::from_hint("video/avc"), Some(VideoCodec::Avc));
    assert_eq!(VideoCodec::from_hint("vp9"), None);
    assert_eq!(VideoCodec::default().mime(), "video/avc");
}

#[test]
fn test_source_geometry_rejects_zero_dimensions() {
    assert!(SourceVideoGeometry::new(0, 720, 1_000).is_err());
    assert!(SourceVideoGeometry::new(1280, 0, 1_000).is_err());

    let portrait = SourceVideoGeometry::new(1080, 1920, 1_000).unwrap();
    assert_eq!(portrait.major(), 1920);
    assert!(!portrait.is_landscape());

    // Square sources count as landscape
    let square = SourceVideoGeometry::new(500, 500, 1_000).unwrap();
    assert!(square.is_landscape());
}

#[test]
fn test_job_state_transitions() {
    assert!(JobState::Created.can_transition_to(JobState::Running));
    assert!(JobState::Created.can_transition_to(JobState::Failed));
    assert!(JobState::Running.can_transition_to(JobState::Completed));
    assert!(JobState::Running.can_transition_to(JobState::Cancelled));
    assert!(!JobState::Running.can_transition_to(JobState::Created));

    for terminal in [JobState::Completed, JobState::Cancelled, JobState::Failed] {
        assert!(terminal.is_terminal());
        for next in [
            JobState::Created,
            JobState::Running,
            JobState::Completed,
            JobState::Cancelled,
            JobState::Failed,
        ] {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

#[test]
fn test_transcode_job_lifecycle() {
    let mut job = TranscodeJob::new(
        "in.mp4",
        "out.mp4",
        TrimWindow::full(),
        TranscodeTarget::default(),
    );
    assert_eq!(job.state(), JobState::Created);

    job.transition(JobState::Running).unwrap();
    job.transition(JobState::Completed).unwrap();
    assert!(job.transition(JobState::Failed).is_err());
    assert_eq!(job.state(), JobState::Completed);
}

#[test]
fn test_job_ids_are_unique() {
    let a = JobId::new();
    let b = JobId::new();
    assert_ne!(a, b);
    assert_eq!(a.to_string().len(), 36);
}

#[test]
fn test_source_media_without_video_track() {
    let media = SourceMedia {
        path: PathBuf::from("audio.m4a"),
        size: 10,
        duration_us: 1_000_000,
        video_tracks: vec![],
        audio_tracks: vec![AudioTrackFormat {
            index: 0,
            codec: "aac".to_string(),
            sample_rate: Some(44_100),
            bit_rate: None,
        }],
    };

    let err = media.video_geometry().unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidInput("Video track not found".to_string())
    );
}

#[test]
fn test_source_media_uses_first_video_track() {
    let media = SourceMedia {
        path: PathBuf::from("clip.mp4"),
        size: 10,
        duration_us: 5_000_000,
        video_tracks: vec![VideoTrackFormat {
            index: 0,
            codec: "h264".to_string(),
            width: 1920,
            height: 1080,
            frame_rate: Some(29.97),
            bit_rate: Some(4_000_000),
        }],
        audio_tracks: vec![],
    };

    let geometry = media.video_geometry().unwrap();
    assert_eq!(geometry.width(), 1920);
    assert_eq!(geometry.duration_us(), 5_000_000);
}

#[test]
fn test_output_descriptor_serializes_type_field() {
    let descriptor = OutputDescriptor {
        name: "VID_1.mp4".to_string(),
        path: PathBuf::from("/tmp/VID_1.mp4"),
        mime_type: "video/mp4".to_string(),
        size: 42,
    };

    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["type"], "video/mp4");
    assert_eq!(json["size"], 42);
}

#[test]
fn test_terminal_result_json_shape() {
    let result = TerminalResult {
        job_id: JobId::new(),
        outcome: JobOutcome::Failed {
            message: "boom".to_string(),
        },
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["message"], "boom");
    assert!(json["jobId"].is_string());
    assert_eq!(result.outcome.state(), JobState::Failed);
}

#[test]
fn test_raw_frame_length_check() {
    assert!(RawFrame::new(2, 2, vec![0; 12]).is_ok());
    assert!(RawFrame::new(2, 2, vec![0; 11]).is_err());
    assert!(RawFrame::new(0, 2, vec![]).is_err());
}

#[test]
fn test_raw_settings_deserialize_camel_case() {
    let raw: RawTranscodeSettings =
        serde_json::from_str(r#"{"width":640,"keepAspectRatio":false,"codecHint":"h265"}"#)
            .unwrap();
    assert_eq!(raw.width, Some(640));
    assert_eq!(raw.height, None);
    assert_eq!(raw.keep_aspect_ratio, Some(false));
    assert_eq!(raw.codec_hint.as_deref(), Some("h265"));

    let trim: RawTrimSettings = serde_json::from_str(r#"{"startsAt":1500}"#).unwrap();
    assert_eq!(trim.starts_at, Some(1500));
    assert_eq!(trim.ends_at, None);
}

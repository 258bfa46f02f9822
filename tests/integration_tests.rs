//! End-to-end use case tests over fake media ports

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use common::*;
use vedit::adapters::{FsLocalAdapter, JpegImageAdapter};
use vedit::domain::errors::DomainError;
use vedit::domain::model::*;
use vedit::engine::{ChannelSink, NoOpSink};
use vedit::ports::{LifecycleSink, MetadataPort};
use vedit::{AppContainer, DefaultAppContainer};

struct App {
    dir: TempDir,
    source: PathBuf,
    engine: Arc<FakeEngine>,
    metadata: Arc<FakeMetadata>,
    container: DefaultAppContainer,
}

impl App {
    fn new(metadata: FakeMetadata) -> Self {
        let dir = TempDir::new().unwrap();
        let source = touch(dir.path(), "source.mp4", b"not really a video");
        let engine = Arc::new(FakeEngine::new());
        let metadata = Arc::new(metadata);
        let fs = Arc::new(FsLocalAdapter::new(dir.path().join("out")).unwrap());
        let container = DefaultAppContainer::from_ports(
            metadata.clone(),
            engine.clone(),
            Arc::new(JpegImageAdapter::new()),
            fs,
            None,
        );
        Self {
            dir,
            source,
            engine,
            metadata,
            container,
        }
    }

    fn hd() -> Self {
        Self::new(FakeMetadata::new(1920, 1080, 10_000_000))
    }

    fn request(&self) -> EditRequest {
        EditRequest {
            source_path: self.source.clone(),
            ..Default::default()
        }
    }

    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    async fn edit_err(&self, request: EditRequest) -> DomainError {
        let sink: Arc<dyn LifecycleSink> = Arc::new(NoOpSink);
        self.container
            .edit_interactor()
            .edit(request, sink)
            .await
            .err()
            .expect("edit should be rejected")
    }
}

fn generated(dir: &Path, prefix: &str, extension: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            let name = path.file_name().unwrap().to_string_lossy();
            name.starts_with(prefix) && name.ends_with(extension)
        })
        .collect()
}

#[tokio::test]
async fn test_edit_generates_destination_and_completes() {
    let app = App::hd();
    let (sink, mut rx) = ChannelSink::new();

    let mut request = app.request();
    request.trim.starts_at = Some(2_000);
    request.transcode.codec_hint = Some("  hevc ".to_string());

    let mut handle = app
        .container
        .edit_interactor()
        .edit(request, Arc::new(sink))
        .await
        .unwrap();
    let id = handle.id().to_string();
    let listener = app.engine.wait_started(&id).await;

    let config = app.engine.last_config().unwrap();
    assert_eq!(config.source_path, app.source);
    assert_eq!(config.range, MediaRange::new(2_000_000, 10_000_000));
    assert_eq!(config.video.codec, VideoCodec::Hevc);

    let outputs = generated(&app.out_dir(), "VID_", ".mp4");
    assert_eq!(outputs, vec![config.destination_path.clone()]);

    std::fs::write(&config.destination_path, b"encoded clip").unwrap();
    listener.on_progress(&id, 0.4);
    listener.on_completed(&id);

    match handle.wait().await.outcome {
        JobOutcome::Completed { file } => {
            assert_eq!(file.path, config.destination_path);
            assert!(file.name.starts_with("VID_"));
            assert_eq!(file.mime_type, "video/mp4");
            assert_eq!(file.size, 12);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        names(&drain(&mut rx)),
        vec!["started", "progress", "completed"]
    );
}

#[tokio::test]
async fn test_edit_uses_explicit_destination() {
    let app = App::hd();
    let destination = app.dir.path().join("clip.mp4");
    let mut request = app.request();
    request.destination_path = Some(destination.clone());

    let handle = app
        .container
        .edit_interactor()
        .edit(request, Arc::new(NoOpSink))
        .await
        .unwrap();
    app.engine.wait_started(&handle.id().to_string()).await;

    assert_eq!(app.engine.last_config().unwrap().destination_path, destination);
    assert!(generated(&app.out_dir(), "VID_", ".mp4").is_empty());
}

#[tokio::test]
async fn test_edit_exact_mode_geometry() {
    let app = App::hd();
    let mut request = app.request();
    request.transcode.width = Some(720);
    request.transcode.height = Some(720);
    request.transcode.keep_aspect_ratio = Some(false);
    request.transcode.fps = Some(24);

    let handle = app
        .container
        .edit_interactor()
        .edit(request, Arc::new(NoOpSink))
        .await
        .unwrap();
    app.engine.wait_started(&handle.id().to_string()).await;

    let video = app.engine.last_config().unwrap().video;
    assert_eq!((video.width, video.height), (720, 720));
    assert_eq!(video.frame_rate, 24);
}

#[tokio::test]
async fn test_edit_validation_never_starts_engine() {
    let app = App::hd();

    let mut negative_width = app.request();
    negative_width.transcode.width = Some(-2);
    let err = app.edit_err(negative_width).await;
    assert!(matches!(err, DomainError::InvalidArgument(_)));
    assert!(err.to_string().contains("Parameter width cannot be negative"));

    let mut zero_fps = app.request();
    zero_fps.transcode.fps = Some(0);
    assert!(matches!(
        app.edit_err(zero_fps).await,
        DomainError::InvalidArgument(_)
    ));

    let mut inverted = app.request();
    inverted.trim.starts_at = Some(5_000);
    inverted.trim.ends_at = Some(3_000);
    assert!(matches!(
        app.edit_err(inverted).await,
        DomainError::InvalidRange(_)
    ));

    let mut past_end = app.request();
    past_end.trim.starts_at = Some(10_000);
    assert!(matches!(
        app.edit_err(past_end).await,
        DomainError::InvalidRange(_)
    ));

    let mut missing = app.request();
    missing.source_path = app.dir.path().join("missing.mp4");
    assert!(matches!(
        app.edit_err(missing).await,
        DomainError::InvalidInput(_)
    ));

    let err = app.edit_err(EditRequest::default()).await;
    assert_eq!(
        err,
        DomainError::InvalidArgument("Input file path is required".to_string())
    );

    assert_eq!(app.engine.starts(), 0);
    assert!(generated(&app.out_dir(), "VID_", ".mp4").is_empty());
}

#[tokio::test]
async fn test_edit_rejects_degenerate_sources() {
    let no_video = App::new(FakeMetadata::without_video(10_000_000));
    let err = no_video.edit_err(no_video.request()).await;
    assert_eq!(
        err,
        DomainError::InvalidInput("Video track not found".to_string())
    );

    let empty = App::new(FakeMetadata::new(640, 480, 0));
    let err = empty.edit_err(empty.request()).await;
    assert!(matches!(err, DomainError::InvalidInput(_)));

    assert_eq!(no_video.engine.starts() + empty.engine.starts(), 0);
}

#[tokio::test]
async fn test_thumbnail_scales_to_bounds() {
    let app = App::new(FakeMetadata::new(800, 400, 10_000_000));
    let request = ThumbnailRequest {
        source_path: app.source.clone(),
        at: 1_500,
        width: 600,
        height: 300,
    };

    let bytes = app
        .container
        .thumbnail_interactor()
        .extract_thumbnail(&request)
        .await
        .unwrap();

    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (600, 300));
    assert_eq!(app.metadata.frame_requests(), vec![1_500_000]);
}

#[tokio::test]
async fn test_thumbnail_without_bounds_keeps_frame_size() {
    let app = App::new(FakeMetadata::new(64, 48, 10_000_000));
    let request = ThumbnailRequest {
        source_path: app.source.clone(),
        ..Default::default()
    };

    let bytes = app
        .container
        .thumbnail_interactor()
        .extract_thumbnail(&request)
        .await
        .unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
}

#[tokio::test]
async fn test_thumbnail_rejects_negative_parameters() {
    let app = App::hd();
    let interactor = app.container.thumbnail_interactor();

    for (at, width, height, name) in [(-1, 0, 0, "at"), (0, -2, 0, "width"), (0, 0, -3, "height")] {
        let request = ThumbnailRequest {
            source_path: app.source.clone(),
            at,
            width,
            height,
        };
        let err = interactor.extract_thumbnail(&request).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidArgument(format!("Parameter {} cannot be negative", name))
        );
    }
    assert!(app.metadata.frame_requests().is_empty());
}

#[tokio::test]
async fn test_thumbnail_to_file() {
    let app = App::new(FakeMetadata::new(320, 160, 10_000_000));
    let request = ThumbnailRequest {
        source_path: app.source.clone(),
        at: 0,
        width: 0,
        height: 80,
    };

    let file = app
        .container
        .thumbnail_interactor()
        .thumbnail_to_file(&request)
        .await
        .unwrap();

    assert!(file.name.starts_with("TH_"));
    assert!(file.name.ends_with(".jpg"));
    assert_eq!(file.mime_type, "image/jpeg");
    assert!(file.size > 0);
    assert_eq!(file.path.parent(), Some(app.out_dir().as_path()));

    let decoded = image::open(&file.path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (160, 80));
}

#[tokio::test]
async fn test_inspect_passes_probe_through() {
    let app = App::hd();
    let media = app
        .container
        .inspect_interactor()
        .inspect(&app.source)
        .await
        .unwrap();

    assert_eq!(media.path, app.source);
    assert_eq!(media.video_geometry().unwrap().width(), 1920);
    assert_eq!(media, app.metadata.probe(&app.source).await.unwrap());

    let missing = app
        .container
        .inspect_interactor()
        .inspect(&app.dir.path().join("nope.mp4"))
        .await;
    assert!(matches!(missing, Err(DomainError::InvalidInput(_))));
}

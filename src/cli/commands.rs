//! Command implementations

use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::{EditorConfig, LogFormat, LogLevel};
use crate::app::inspect_interactor::{format_as_json, format_as_text};
use crate::app::AppContainer;
use crate::cli::args::{EditArgs, ProbeArgs, ThumbnailArgs};
use crate::cli::Cli;
use crate::domain::model::JobOutcome;
use crate::engine::{ConsoleSink, JsonEventSink};
use crate::error::{VeditError, VeditResult};
use crate::ports::LifecycleSink;

/// Load the configuration and apply global CLI overrides
pub fn resolve_config(cli: &Cli) -> VeditResult<EditorConfig> {
    let mut config = EditorConfig::load(cli.config.as_deref())?;

    if let Some(level) = &cli.log_level {
        config.log_level = LogLevel::parse(level)?;
    }
    if let Some(format) = &cli.log_format {
        config.log_format = LogFormat::parse(format)?;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Execute the edit command
///
/// Waits for the terminal event. Ctrl-C cancels the running job.
pub async fn edit(container: &dyn AppContainer, args: EditArgs) -> VeditResult<()> {
    info!(input = %args.input.display(), "Starting edit operation");

    let sink: Arc<dyn LifecycleSink> = if args.json {
        Arc::new(JsonEventSink::new(args.progress_events))
    } else {
        Arc::new(ConsoleSink::new())
    };

    let mut handle = container
        .edit_interactor()
        .edit(args.to_request(), sink)
        .await?;
    info!(job_id = %handle.id(), "Edit submitted");

    let mut waiter = handle.clone();
    let result = tokio::select! {
        result = waiter.wait() => result,
        _ = tokio::signal::ctrl_c() => {
            warn!(job_id = %handle.id(), "Interrupt received, cancelling transcode");
            handle.cancel().await;
            handle.wait().await
        }
    };

    match result.outcome {
        JobOutcome::Completed { file } => {
            info!(path = %file.path.display(), size = file.size, "Edit completed");
            Ok(())
        }
        JobOutcome::Cancelled => Err(VeditError::Canceled),
        JobOutcome::Failed { message } => Err(VeditError::TranscodeFailed { message }),
    }
}

/// Execute the thumbnail command
pub async fn thumbnail(container: &dyn AppContainer, args: ThumbnailArgs) -> VeditResult<()> {
    info!(input = %args.input.display(), at = args.at, "Starting thumbnail extraction");

    let file = container
        .thumbnail_interactor()
        .thumbnail_to_file(&args.to_request())
        .await?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&file)?)?;
    } else {
        writeln!(stdout, "{}", file.path.display())?;
    }
    Ok(())
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: ProbeArgs) -> VeditResult<()> {
    info!(input = %args.input.display(), "Starting probe operation");

    let media = container.inspect_interactor().inspect(&args.input).await?;
    let summary = if args.json {
        format_as_json(&media)?
    } else {
        format_as_text(&media)
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", summary.trim_end())?;
    Ok(())
}

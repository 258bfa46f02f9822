//! Transcode lifecycle controller
//!
//! Submits a job to a [`TranscodeEngine`] and republishes whatever the engine
//! reports as one uniform stream of lifecycle events:
//!
//! - `started` at most once, before anything else
//! - `progress` any number of times until a terminal event
//! - exactly one of `completed`, `cancelled`, `failed`
//!
//! Each job gets its own [`JobContext`], which is the listener handed to the
//! engine. The engine instance is released exactly once, right after the
//! first terminal event.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::config::plan_engine_config;
use crate::ports::*;

/// Drives transcode jobs through their lifecycle
pub struct LifecycleController {
    engine: Arc<dyn TranscodeEngine>,
    fs: Arc<dyn FsPort>,
    engine_timeout: Option<Duration>,
}

impl LifecycleController {
    pub fn new(engine: Arc<dyn TranscodeEngine>, fs: Arc<dyn FsPort>) -> Self {
        Self {
            engine,
            fs,
            engine_timeout: None,
        }
    }

    /// Cancel jobs that have not terminated after `timeout`
    pub fn with_engine_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.engine_timeout = timeout;
        self
    }

    /// Submit a job and return immediately
    ///
    /// Range and configuration errors are returned here, before the engine is
    /// touched. Everything after that is reported through `sink`. Must be
    /// called from within a Tokio runtime.
    pub fn submit(
        &self,
        job: TranscodeJob,
        source: &SourceVideoGeometry,
        sink: Arc<dyn LifecycleSink>,
    ) -> Result<JobHandle, DomainError> {
        if job.state() != JobState::Created {
            return Err(DomainError::InvalidArgument(format!(
                "Job {} was already submitted",
                job.id()
            )));
        }

        let config = plan_engine_config(&job, source)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            DomainError::EngineFailure(format!("No async runtime available: {}", e))
        })?;

        let job_id = job.id();
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let ctx = Arc::new(JobContext {
            job_id,
            handle: EngineHandle::new(job_id.to_string()),
            destination: config.destination_path.clone(),
            engine: Arc::clone(&self.engine),
            fs: Arc::clone(&self.fs),
            sink,
            delivery: Mutex::new(()),
            state: Mutex::new(ContextState::new(job)),
            released: AtomicBool::new(false),
            outcome_tx,
        });

        info!(
            job_id = %job_id,
            width = config.video.width,
            height = config.video.height,
            start_us = config.range.start_us,
            end_us = config.range.end_us,
            "Submitting transcode job"
        );

        let span = info_span!("transcode", job_id = %job_id);
        let worker = Arc::clone(&ctx);
        let timeout = self.engine_timeout;
        runtime.spawn(
            async move {
                let listener: Arc<dyn EngineListener> = worker.clone();
                match worker.engine.start(&worker.handle, config, listener).await {
                    Ok(()) => {
                        worker.mark_accepted().await;
                        if let Some(timeout) = timeout {
                            tokio::spawn(watchdog(Arc::clone(&worker), timeout).in_current_span());
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "Engine rejected the job");
                        worker.finish(Terminal::Failed(err.to_string()));
                    }
                }
            }
            .instrument(span),
        );

        Ok(JobHandle { ctx, outcome_rx })
    }
}

/// Caller-side handle of a submitted job
#[derive(Clone)]
pub struct JobHandle {
    ctx: Arc<JobContext>,
    outcome_rx: watch::Receiver<Option<TerminalResult>>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.ctx.job_id
    }

    pub fn state(&self) -> JobState {
        lock(&self.ctx.state).job.state()
    }

    /// Request cancellation
    ///
    /// A no-op once the job has terminated. Before the engine accepted the
    /// job the request is held back and forwarded on acceptance. The job only
    /// ends as cancelled if the engine honours the request.
    pub async fn cancel(&self) {
        let forward = {
            let mut state = lock(&self.ctx.state);
            if state.job.state().is_terminal() {
                false
            } else {
                state.cancel_requested = true;
                state.take_cancel()
            }
        };

        if forward {
            self.ctx.forward_cancel().await;
        } else {
            debug!(job_id = %self.ctx.job_id, "Cancellation deferred or not needed");
        }
    }

    /// Terminal result if the job already ended
    pub fn outcome(&self) -> Option<TerminalResult> {
        (*self.outcome_rx.borrow()).clone()
    }

    /// Wait for the terminal result
    pub async fn wait(&mut self) -> TerminalResult {
        let result = self
            .outcome_rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| (*outcome).clone());

        result.unwrap_or_else(|| TerminalResult {
            job_id: self.ctx.job_id,
            outcome: JobOutcome::Failed {
                message: "Lifecycle channel closed".to_string(),
            },
        })
    }
}

enum Terminal {
    Completed,
    Cancelled,
    Failed(String),
}

struct ContextState {
    job: TranscodeJob,
    started_emitted: bool,
    accepted: bool,
    cancel_requested: bool,
    cancel_forwarded: bool,
}

impl ContextState {
    fn new(job: TranscodeJob) -> Self {
        Self {
            job,
            started_emitted: false,
            accepted: false,
            cancel_requested: false,
            cancel_forwarded: false,
        }
    }

    /// Enter Running and claim the started event; true if it must be emitted
    fn claim_started(&mut self) -> bool {
        if self.job.state() == JobState::Created {
            // Created -> Running is always legal
            let _ = self.job.transition(JobState::Running);
        }
        !std::mem::replace(&mut self.started_emitted, true)
    }

    /// True if a pending cancel should be forwarded now
    fn take_cancel(&mut self) -> bool {
        if self.accepted && self.cancel_requested && !self.cancel_forwarded {
            self.cancel_forwarded = true;
            true
        } else {
            false
        }
    }
}

/// Job-scoped state shared by the controller, the handle and the engine
struct JobContext {
    job_id: JobId,
    handle: EngineHandle,
    destination: PathBuf,
    engine: Arc<dyn TranscodeEngine>,
    fs: Arc<dyn FsPort>,
    sink: Arc<dyn LifecycleSink>,
    /// Serializes sink delivery so events reach the sink in order
    delivery: Mutex<()>,
    state: Mutex<ContextState>,
    released: AtomicBool,
    outcome_tx: watch::Sender<Option<TerminalResult>>,
}

impl JobContext {
    async fn mark_accepted(&self) {
        let (emit_started, forward) = {
            let _delivery = lock(&self.delivery);
            let mut state = lock(&self.state);
            if state.job.state().is_terminal() {
                return;
            }
            state.accepted = true;
            let emit = state.claim_started();
            let forward = state.take_cancel();
            drop(state);
            if emit {
                self.sink.on_started(&self.job_id);
            }
            (emit, forward)
        };

        debug!(job_id = %self.job_id, emit_started, "Engine accepted the job");
        if forward {
            self.forward_cancel().await;
        }
    }

    async fn forward_cancel(&self) {
        info!(job_id = %self.job_id, "Forwarding cancellation to engine");
        self.engine.cancel(&self.handle).await;
    }

    fn is_own(&self, id: &str) -> bool {
        if id == self.handle.id {
            true
        } else {
            debug!(job_id = %self.job_id, foreign = id, "Ignoring event for another engine handle");
            false
        }
    }

    fn started(&self) {
        let _delivery = lock(&self.delivery);
        let emit = {
            let mut state = lock(&self.state);
            !state.job.state().is_terminal() && state.claim_started()
        };
        if emit {
            self.sink.on_started(&self.job_id);
        }
    }

    /// In-range fractions pass through unchanged, others are clamped to [0, 1]
    fn progress(&self, fraction: f32) {
        if fraction.is_nan() {
            debug!(job_id = %self.job_id, "Dropping NaN progress");
            return;
        }
        let _delivery = lock(&self.delivery);
        let emit_started = {
            let mut state = lock(&self.state);
            if state.job.state().is_terminal() {
                debug!(job_id = %self.job_id, fraction, "Dropping progress after terminal event");
                return;
            }
            state.claim_started()
        };
        if emit_started {
            self.sink.on_started(&self.job_id);
        }
        self.sink.on_progress(&self.job_id, fraction.clamp(0.0, 1.0));
    }

    /// Deliver the first terminal event; later ones are ignored
    fn finish(&self, terminal: Terminal) {
        let _delivery = lock(&self.delivery);
        if lock(&self.state).job.state().is_terminal() {
            debug!(job_id = %self.job_id, "Ignoring duplicate terminal event");
            return;
        }

        let outcome = match terminal {
            Terminal::Completed => match self.fs.describe(&self.destination) {
                Ok(file) => JobOutcome::Completed { file },
                Err(err) => JobOutcome::Failed {
                    message: format!("Output file unavailable: {}", err),
                },
            },
            Terminal::Cancelled => JobOutcome::Cancelled,
            Terminal::Failed(message) => JobOutcome::Failed { message },
        };

        let emit_started = {
            let mut state = lock(&self.state);
            // Completion and cancellation imply the engine took the job
            let emit = !matches!(outcome, JobOutcome::Failed { .. }) && state.claim_started();
            if let Err(err) = state.job.transition(outcome.state()) {
                error!(job_id = %self.job_id, error = %err, "Unexpected job transition");
            }
            emit
        };

        if emit_started {
            self.sink.on_started(&self.job_id);
        }
        match &outcome {
            JobOutcome::Completed { file } => {
                info!(job_id = %self.job_id, path = %file.path.display(), size = file.size, "Transcode completed");
                self.sink.on_completed(&self.job_id, file);
            }
            JobOutcome::Cancelled => {
                info!(job_id = %self.job_id, "Transcode cancelled");
                self.sink.on_cancelled(&self.job_id);
            }
            JobOutcome::Failed { message } => {
                warn!(job_id = %self.job_id, message = %message, "Transcode failed");
                self.sink.on_failed(&self.job_id, message);
            }
        }

        self.release();
        self.outcome_tx.send_replace(Some(TerminalResult {
            job_id: self.job_id,
            outcome,
        }));
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.engine.release(&self.handle) {
            let err = DomainError::ResourceCleanupFailure(err.to_string());
            error!(job_id = %self.job_id, error = %err, "Engine release failed");
        }
    }
}

impl EngineListener for JobContext {
    fn on_started(&self, id: &str) {
        if self.is_own(id) {
            self.started();
        }
    }

    fn on_progress(&self, id: &str, fraction: f32) {
        if self.is_own(id) {
            self.progress(fraction);
        }
    }

    fn on_completed(&self, id: &str) {
        if self.is_own(id) {
            self.finish(Terminal::Completed);
        }
    }

    fn on_cancelled(&self, id: &str) {
        if self.is_own(id) {
            self.finish(Terminal::Cancelled);
        }
    }

    fn on_error(&self, id: &str, message: Option<String>) {
        if self.is_own(id) {
            let message = message.unwrap_or_else(|| "Unknown engine error".to_string());
            self.finish(Terminal::Failed(message));
        }
    }
}

async fn watchdog(ctx: Arc<JobContext>, timeout: Duration) {
    let mut outcome_rx = ctx.outcome_tx.subscribe();
    tokio::select! {
        _ = async { let _ = outcome_rx.wait_for(Option::is_some).await; } => {}
        _ = tokio::time::sleep(timeout) => {
            let forward = {
                let mut state = lock(&ctx.state);
                if state.job.state().is_terminal() {
                    false
                } else {
                    state.cancel_requested = true;
                    state.take_cancel()
                }
            };
            if forward {
                warn!(job_id = %ctx.job_id, timeout_secs = timeout.as_secs_f64(), "Engine timed out");
                ctx.forward_cancel().await;
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

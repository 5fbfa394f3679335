use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn, job_info, job_warn};
use mediakit_core::{Backend, JobId, JobRequest};
use tokio::sync::{Mutex as AsyncMutex, OnceCell, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use crate::exec::{ChannelProgressSink, Executor, ProcessExecutor};
use crate::pipeline;
use crate::{EngineEvent, EngineInfo, EngineSettings, JobError};

enum EngineCommand {
    Load { backend: Backend },
    Run { job_id: JobId, request: JobRequest },
    Cancel { job_id: JobId },
}

/// Front-end side of the engine thread. Commands are fire-and-forget;
/// results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_executor(settings, Arc::new(ProcessExecutor))
    }

    pub fn with_executor(settings: EngineSettings, executor: Arc<dyn Executor>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("failed to start engine runtime: {err}");
                    return;
                }
            };
            let engine = Arc::new(Engine::new(settings, executor));
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &engine, command, &event_tx);
            }
            engine.cancel_all();
        });

        Self { cmd_tx, event_rx }
    }

    /// Probes `backend`; answered once with [`EngineEvent::EngineLoaded`].
    pub fn load(&self, backend: Backend) {
        let _ = self.cmd_tx.send(EngineCommand::Load { backend });
    }

    pub fn run(&self, job_id: JobId, request: JobRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Run { job_id, request });
    }

    pub fn cancel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { job_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    engine: &Arc<Engine>,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Load { backend } => {
            let engine = engine.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = engine.ensure_loaded(backend).await;
                let _ = event_tx.send(EngineEvent::EngineLoaded { backend, result });
            });
        }
        EngineCommand::Run { job_id, request } => {
            // Registered before spawning so a following Cancel always finds it.
            let cancel = engine.register(job_id);
            let engine = engine.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let sink = ChannelProgressSink::new(event_tx.clone());
                let result = pipeline::run_job(&engine, job_id, request, &sink, &cancel).await;
                engine.unregister(job_id);
                match &result {
                    Ok(artifact) => {
                        job_info!(job_id, "completed with {} file(s)", artifact.files.len())
                    }
                    Err(err) => job_warn!(job_id, "failed: {err}"),
                }
                let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
            });
        }
        EngineCommand::Cancel { job_id } => engine.cancel(job_id),
    }
}

struct EngineSlot {
    loaded: OnceCell<Result<EngineInfo, JobError>>,
    lease: Arc<AsyncMutex<()>>,
}

impl EngineSlot {
    fn new() -> Self {
        Self {
            loaded: OnceCell::new(),
            lease: Arc::new(AsyncMutex::new(())),
        }
    }
}

/// Exclusive use of one backend for the lifetime of the value.
pub(crate) struct EngineLease {
    backend: Backend,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        engine_debug!("released {} engine", self.backend);
    }
}

/// Engine state shared by all jobs on the runtime.
pub(crate) struct Engine {
    pub(crate) settings: EngineSettings,
    pub(crate) executor: Arc<dyn Executor>,
    media: EngineSlot,
    pdf_document: EngineSlot,
    pdf_renderer: EngineSlot,
    jobs: Mutex<HashMap<JobId, CancellationToken>>,
}

impl Engine {
    fn new(settings: EngineSettings, executor: Arc<dyn Executor>) -> Self {
        Self {
            settings,
            executor,
            media: EngineSlot::new(),
            pdf_document: EngineSlot::new(),
            pdf_renderer: EngineSlot::new(),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, backend: Backend) -> &EngineSlot {
        match backend {
            Backend::Media => &self.media,
            Backend::PdfDocument => &self.pdf_document,
            Backend::PdfRenderer => &self.pdf_renderer,
        }
    }

    /// Probes the backend on first use; later calls return the cached
    /// outcome, including a failure.
    pub(crate) async fn ensure_loaded(&self, backend: Backend) -> Result<EngineInfo, JobError> {
        self.slot(backend)
            .loaded
            .get_or_init(|| self.probe(backend))
            .await
            .clone()
    }

    async fn probe(&self, backend: Backend) -> Result<EngineInfo, JobError> {
        let version = match self.settings.program(backend) {
            Some(program) => self.executor.probe(program).await,
            None => Ok("lopdf (in-process)".to_string()),
        };
        match version {
            Ok(version) => {
                engine_info!("{backend} ready: {version}");
                Ok(EngineInfo { backend, version })
            }
            Err(err) => {
                engine_warn!("{backend} unavailable: {err}");
                Err(err)
            }
        }
    }

    pub(crate) async fn acquire(
        &self,
        backend: Backend,
        job_id: JobId,
        cancel: &CancellationToken,
    ) -> Result<EngineLease, JobError> {
        let lease = self.slot(backend).lease.clone();
        let guard = match lease.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                job_info!(job_id, "waiting for the {backend} engine");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(JobError::cancelled()),
                    guard = lease.lock_owned() => guard,
                }
            }
        };
        Ok(EngineLease {
            backend,
            _guard: guard,
        })
    }

    fn register(&self, job_id: JobId) -> CancellationToken {
        let token = CancellationToken::new();
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id, token.clone());
        token
    }

    fn unregister(&self, job_id: JobId) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&job_id);
    }

    fn cancel(&self, job_id: JobId) {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        match jobs.get(&job_id) {
            Some(token) => {
                job_info!(job_id, "cancelling");
                token.cancel();
            }
            None => engine_debug!("cancel for unknown job {job_id}"),
        }
    }

    fn cancel_all(&self) {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        for token in jobs.values() {
            token.cancel();
        }
    }
}

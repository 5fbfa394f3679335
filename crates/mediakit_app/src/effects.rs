use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use mediakit_core::{Effect, JobId, JobOutcome, Msg, ToolKind};
use mediakit_engine::{
    save_artifact, EngineEvent, EngineHandle, ExportOptions, ExportSummary, JobError,
};

/// Executes core effects against the engine and turns engine events back
/// into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    tool: ToolKind,
    output_dir: PathBuf,
    export: ExportOptions,
    /// Detail of the most recent engine or job failure.
    last_error: Option<JobError>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        tool: ToolKind,
        output_dir: PathBuf,
        export: ExportOptions,
    ) -> Self {
        Self {
            engine,
            tool,
            output_dir,
            export,
            last_error: None,
        }
    }

    /// Runs `effects` in order. Saved artifacts are returned to the caller.
    pub fn apply(&mut self, effects: Vec<Effect>) -> Result<Vec<ExportSummary>> {
        let mut saved = Vec::new();
        for effect in effects {
            match effect {
                Effect::LoadEngine { backend } => {
                    engine_info!("LoadEngine backend={backend}");
                    self.engine.load(backend);
                }
                Effect::RunJob { job_id, request } => {
                    engine_info!(
                        "RunJob job_id={} tool={} inputs={}",
                        job_id,
                        request.tool,
                        request.inputs.len()
                    );
                    self.engine.run(job_id, request);
                }
                Effect::CancelJob { job_id } => {
                    engine_info!("CancelJob job_id={job_id}");
                    self.engine.cancel(job_id);
                }
                Effect::SaveArtifact { job_id, artifact } => {
                    let summary =
                        save_artifact(&self.output_dir, self.tool, job_id, &artifact, &self.export)
                            .with_context(|| {
                                format!("failed to save results to {}", self.output_dir.display())
                            })?;
                    engine_info!(
                        "Saved job {} ({} file(s), {} bytes) to {:?}",
                        job_id,
                        summary.files.len(),
                        summary.total_bytes,
                        self.output_dir
                    );
                    saved.push(summary);
                }
            }
        }
        Ok(saved)
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        Some(event_to_msg(event, &mut self.last_error))
    }

    /// Blocks until the engine reports `job_id` finished or `grace` elapses.
    pub fn await_completion(&mut self, job_id: JobId, grace: Duration) {
        let deadline = Instant::now() + grace;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.engine.recv_timeout(remaining) {
                Some(EngineEvent::JobCompleted { job_id: done, .. }) if done == job_id => return,
                Some(_) => {}
                None => break,
            }
        }
        engine_warn!("Job {} did not stop within {:?}", job_id, grace);
    }

    pub fn last_error(&self) -> Option<&JobError> {
        self.last_error.as_ref()
    }
}

/// Maps an engine event onto the core message; failures are kept in
/// `last_error` for the final report.
fn event_to_msg(event: EngineEvent, last_error: &mut Option<JobError>) -> Msg {
    match event {
        EngineEvent::EngineLoaded { backend, result } => match result {
            Ok(info) => {
                engine_info!("{} ready: {}", backend, info.version);
                Msg::EngineLoaded {
                    version: info.version,
                }
            }
            Err(err) => {
                engine_warn!("{} failed to load: {}", backend, err);
                let reason = err.to_string();
                *last_error = Some(err);
                Msg::EngineLoadFailed { reason }
            }
        },
        EngineEvent::Progress { job_id, percent } => Msg::JobProgress { job_id, percent },
        EngineEvent::Log { job_id, line } => Msg::JobLog { job_id, line },
        EngineEvent::JobCompleted { job_id, result } => {
            let outcome = match result {
                Ok(artifact) => JobOutcome::Succeeded(artifact),
                Err(err) => {
                    engine_warn!("Job {} failed: {}", job_id, err);
                    let reason = err.to_string();
                    *last_error = Some(err);
                    JobOutcome::Failed { reason }
                }
            };
            Msg::JobDone { job_id, outcome }
        }
    }
}

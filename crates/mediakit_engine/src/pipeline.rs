//! One job from request to artifact.

use bytes::Bytes;
use engine_logging::{job_debug, job_info};
use mediakit_core::{Artifact, Backend, Blob, JobId, JobRequest};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::exec::ProgressSink;
use crate::pdf::merge_pdfs;
use crate::plan::{build_plan, Invocation, OutputSpec, PlanContext, StagedFile, Work};
use crate::progress::scale_step;
use crate::vfs::{VfsError, VirtualFs};
use crate::{EngineEvent, FailureKind, JobError};

pub(crate) async fn run_job(
    engine: &Engine,
    job_id: JobId,
    request: JobRequest,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<Artifact, JobError> {
    job_info!(
        job_id,
        "starting {} with {} input(s)",
        request.tool,
        request.inputs.len()
    );
    let ctx = PlanContext::from(&engine.settings);
    // Planning may parse PDFs.
    let plan = tokio::task::spawn_blocking(move || build_plan(&request, &ctx))
        .await
        .map_err(join_error)?
        .map_err(|err| JobError::new(FailureKind::InvalidInput, err.to_string()))?;

    engine.ensure_loaded(plan.backend).await?;
    let _lease = engine.acquire(plan.backend, job_id, cancel).await?;
    job_debug!(job_id, "holding {} engine", plan.backend);

    let files = match plan.work {
        Work::Commands {
            staged,
            steps,
            outputs,
        } => {
            run_commands(
                engine,
                job_id,
                plan.backend,
                &staged,
                &steps,
                &outputs,
                sink,
                cancel,
            )
            .await?
        }
        Work::MergePdf { documents, output } => {
            merge_documents(job_id, documents, output, cancel).await?
        }
    };

    sink.emit(EngineEvent::Progress {
        job_id,
        percent: 100,
    });
    Ok(Artifact { files })
}

#[allow(clippy::too_many_arguments)]
async fn run_commands(
    engine: &Engine,
    job_id: JobId,
    backend: Backend,
    staged: &[StagedFile],
    steps: &[Invocation],
    outputs: &[OutputSpec],
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<Vec<Blob>, JobError> {
    let program = engine.settings.program(backend).ok_or_else(|| {
        JobError::new(
            FailureKind::EngineUnavailable,
            format!("{backend} has no executable"),
        )
    })?;

    let vfs = VirtualFs::new().map_err(vfs_error)?;
    for file in staged {
        vfs.write(&file.name, &file.data).await.map_err(vfs_error)?;
    }

    let total = steps.len();
    for (index, step) in steps.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(JobError::cancelled());
        }
        if let Some(label) = &step.label {
            sink.emit(EngineEvent::Log {
                job_id,
                line: label.clone(),
            });
        }
        let step_sink = StepSink {
            inner: sink,
            index,
            total,
        };
        let run = engine
            .executor
            .run(job_id, program, &step.args, vfs.path(), &step_sink, cancel);
        match engine.settings.step_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                JobError::new(
                    FailureKind::Timeout,
                    format!("step {} of {total} exceeded {limit:?}", index + 1),
                )
            })??,
            None => run.await?,
        }
        sink.emit(EngineEvent::Progress {
            job_id,
            percent: scale_step(index + 1, total, 0),
        });
    }

    let mut files = Vec::with_capacity(outputs.len());
    for output in outputs {
        let data = vfs.read(&output.name).await.map_err(|err| match err {
            VfsError::NotFound(name) => JobError::new(
                FailureKind::MissingOutput { name: name.clone() },
                format!("engine did not produce {name}"),
            ),
            other => vfs_error(other),
        })?;
        files.push(Blob::new(
            output.download_name.clone(),
            output.mime.clone(),
            data,
        ));
    }
    Ok(files)
}

async fn merge_documents(
    job_id: JobId,
    documents: Vec<Bytes>,
    output: OutputSpec,
    cancel: &CancellationToken,
) -> Result<Vec<Blob>, JobError> {
    job_info!(job_id, "merging {} documents", documents.len());
    let merge = tokio::task::spawn_blocking(move || merge_pdfs(&documents));
    let merged = tokio::select! {
        _ = cancel.cancelled() => return Err(JobError::cancelled()),
        joined = merge => joined
            .map_err(join_error)?
            .map_err(|err| JobError::new(FailureKind::InvalidInput, err.to_string()))?,
    };
    Ok(vec![Blob::new(output.download_name, output.mime, merged)])
}

/// Rescales per-invocation progress onto the whole job.
struct StepSink<'a> {
    inner: &'a dyn ProgressSink,
    index: usize,
    total: usize,
}

impl ProgressSink for StepSink<'_> {
    fn emit(&self, event: EngineEvent) {
        let event = match event {
            EngineEvent::Progress { job_id, percent } => EngineEvent::Progress {
                job_id,
                percent: scale_step(self.index, self.total, percent),
            },
            other => other,
        };
        self.inner.emit(event);
    }
}

fn vfs_error(err: VfsError) -> JobError {
    JobError::new(FailureKind::Io, err.to_string())
}

fn join_error(err: JoinError) -> JobError {
    JobError::new(FailureKind::Io, format!("worker task failed: {err}"))
}

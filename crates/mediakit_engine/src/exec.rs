use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use engine_logging::{engine_debug, job_debug};
use mediakit_core::JobId;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::progress::ProgressTracker;
use crate::{EngineEvent, FailureKind, JobError, ProgramSettings};

const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs external engine programs.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Checks that the program is usable and returns its version line.
    async fn probe(&self, program: &ProgramSettings) -> Result<String, JobError>;

    /// Runs one invocation inside `cwd`, reporting progress for this
    /// invocation alone (0..=100) to `sink`.
    async fn run(
        &self,
        job_id: JobId,
        program: &ProgramSettings,
        args: &[String],
        cwd: &Path,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<(), JobError>;
}

/// Spawns the configured executables as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait::async_trait]
impl Executor for ProcessExecutor {
    async fn probe(&self, program: &ProgramSettings) -> Result<String, JobError> {
        let output = Command::new(&program.program)
            .args(&program.version_args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(PROBE_TIMEOUT, output)
            .await
            .map_err(|_| {
                JobError::new(
                    FailureKind::EngineUnavailable,
                    format!("{} did not answer the version probe", program.program.display()),
                )
            })?
            .map_err(|err| spawn_error(program, err))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        stdout
            .lines()
            .chain(stderr.lines())
            .map(str::trim)
            .find(|line| line.to_ascii_lowercase().contains("version"))
            .map(str::to_string)
            .ok_or_else(|| {
                JobError::new(
                    FailureKind::EngineUnavailable,
                    format!(
                        "{} printed no version information",
                        program.program.display()
                    ),
                )
            })
    }

    async fn run(
        &self,
        job_id: JobId,
        program: &ProgramSettings,
        args: &[String],
        cwd: &Path,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<(), JobError> {
        job_debug!(job_id, "exec {} {}", program.program.display(), args.join(" "));
        let mut child = Command::new(&program.program)
            .args(&program.base_args)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| spawn_error(program, err))?;

        let stdout = child.stdout.take().ok_or_else(|| pipe_error("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe_error("stderr"))?;
        let mut stdout = lines(stdout);
        let mut stderr = lines(stderr);
        let (mut stdout_open, mut stderr_open) = (true, true);
        let mut tracker = ProgressTracker::default();
        let mut last_log: Option<String> = None;

        while stdout_open || stderr_open {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    return Err(JobError::cancelled());
                }
                segment = stdout.next_segment(), if stdout_open => match segment {
                    Ok(Some(raw)) => {
                        let line = decode_line(&raw);
                        if let Some(percent) = tracker.observe_progress(&line) {
                            sink.emit(EngineEvent::Progress { job_id, percent });
                        }
                    }
                    _ => stdout_open = false,
                },
                segment = stderr.next_segment(), if stderr_open => match segment {
                    Ok(Some(raw)) => {
                        let line = decode_line(&raw);
                        if !line.is_empty() {
                            tracker.observe_log(&line);
                            job_debug!(job_id, "{line}");
                            sink.emit(EngineEvent::Log { job_id, line: line.clone() });
                            last_log = Some(line);
                        }
                    }
                    _ => stderr_open = false,
                },
            }
        }

        let waited = tokio::select! {
            _ = cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let Some(status) = waited else {
            let _ = child.kill().await;
            return Err(JobError::cancelled());
        };
        let status = status.map_err(|err| JobError::new(FailureKind::Io, err.to_string()))?;

        if status.success() {
            engine_debug!("{} finished", program.program.display());
            Ok(())
        } else {
            Err(JobError::new(
                FailureKind::ExecutionFailed {
                    code: status.code(),
                },
                last_log.unwrap_or_else(|| status.to_string()),
            ))
        }
    }
}

fn lines<R: AsyncRead + Unpin>(reader: R) -> tokio::io::Split<BufReader<R>> {
    BufReader::new(reader).split(b'\n')
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim_end_matches('\r').trim().to_string()
}

fn spawn_error(program: &ProgramSettings, err: io::Error) -> JobError {
    let kind = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            FailureKind::EngineUnavailable
        }
        _ => FailureKind::Io,
    };
    JobError::new(
        kind,
        format!("cannot start {}: {err}", program.program.display()),
    )
}

fn pipe_error(stream: &str) -> JobError {
    JobError::new(FailureKind::Io, format!("child {stream} was not captured"))
}

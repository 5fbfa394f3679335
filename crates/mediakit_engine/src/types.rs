use std::fmt;

use mediakit_core::{Artifact, Backend, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub backend: Backend,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    EngineLoaded {
        backend: Backend,
        result: Result<EngineInfo, JobError>,
    },
    /// Overall job progress, 0..=100.
    Progress { job_id: JobId, percent: u8 },
    /// A diagnostic line printed by the engine.
    Log { job_id: JobId, line: String },
    JobCompleted {
        job_id: JobId,
        result: Result<Artifact, JobError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JobError {
    pub kind: FailureKind,
    pub message: String,
}

impl JobError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "job cancelled")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend executable is missing or did not answer the version probe.
    EngineUnavailable,
    InvalidInput,
    ExecutionFailed { code: Option<i32> },
    MissingOutput { name: String },
    Cancelled,
    Timeout,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::EngineUnavailable => write!(f, "engine unavailable"),
            FailureKind::InvalidInput => write!(f, "invalid input"),
            FailureKind::ExecutionFailed { code: Some(code) } => {
                write!(f, "engine exited with code {code}")
            }
            FailureKind::ExecutionFailed { code: None } => {
                write!(f, "engine terminated by signal")
            }
            FailureKind::MissingOutput { name } => write!(f, "missing output {name}"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

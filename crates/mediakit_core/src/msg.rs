use crate::{Blob, JobId, JobOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Tool mounted; start loading its engine.
    EngineLoadRequested,
    /// Engine reported ready.
    EngineLoaded { version: String },
    /// Engine could not be initialised.
    EngineLoadFailed { reason: String },
    /// User picked one or more files.
    FilesSelected(Vec<Blob>),
    /// User removed a file from the selection.
    FileRemoved { index: usize },
    /// User moved a file one slot up or down.
    FileMoved {
        index: usize,
        direction: MoveDirection,
    },
    /// User edited an option field.
    OptionChanged { key: String, value: String },
    /// User clicked the tool's action button.
    RunClicked,
    /// User asked to abort the running job.
    CancelClicked,
    /// Engine progress for a job.
    JobProgress { job_id: JobId, percent: u8 },
    /// Engine log line for a job.
    JobLog { job_id: JobId, line: String },
    /// Engine completion for a job.
    JobDone { job_id: JobId, outcome: JobOutcome },
    /// User asked to save the result.
    DownloadClicked,
    /// User cleared the selection and result.
    ResetClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

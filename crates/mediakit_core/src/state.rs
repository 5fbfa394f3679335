use std::fmt;

use bytes::Bytes;

use crate::view_model::{AppViewModel, FileRowView};
use crate::{ToolKind, ToolOptions};

pub type JobId = u64;

/// A named binary payload: an uploaded input or a produced output.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    pub name: String,
    pub mime: String,
    pub data: Bytes,
}

impl Blob {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Everything the engine needs to run one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub tool: ToolKind,
    pub inputs: Vec<Blob>,
    pub options: ToolOptions,
}

/// Result files of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Artifact {
    pub files: Vec<Blob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded(Artifact),
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    EngineLoading,
    EngineReady,
    /// Engine could not be initialised; terminal.
    EngineFailed,
    FileSelected,
    Processing,
    Succeeded,
    Failed,
}

impl Phase {
    /// Engine is loaded and no job is in flight.
    pub fn is_ready(self) -> bool {
        matches!(
            self,
            Phase::EngineReady | Phase::FileSelected | Phase::Succeeded | Phase::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    tool: ToolKind,
    phase: Phase,
    status: String,
    engine_version: Option<String>,
    inputs: Vec<Blob>,
    options: ToolOptions,
    progress: u8,
    output: Option<Artifact>,
    active_job: Option<JobId>,
    finished_job: Option<JobId>,
    next_job_id: JobId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ToolKind::VideoToMp3)
    }
}

impl AppState {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            phase: Phase::Idle,
            status: format!("Load {} to start", tool.backend()),
            engine_version: None,
            inputs: Vec::new(),
            options: ToolOptions::defaults(tool),
            progress: 0,
            output: None,
            active_job: None,
            finished_job: None,
            next_job_id: 1,
            dirty: false,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn options(&self) -> &ToolOptions {
        &self.options
    }

    pub fn inputs(&self) -> &[Blob] {
        &self.inputs
    }

    pub fn output(&self) -> Option<&Artifact> {
        self.output.as_ref()
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.active_job
    }

    /// Job that produced the current output, if any.
    pub fn finished_job(&self) -> Option<JobId> {
        self.output.as_ref().and(self.finished_job)
    }

    pub fn view(&self) -> AppViewModel {
        let can_run = self.phase.is_ready()
            && self.phase != Phase::EngineReady
            && self.inputs.len() >= self.tool.min_inputs();
        AppViewModel {
            tool: self.tool,
            phase: self.phase,
            status: self.status.clone(),
            engine_version: self.engine_version.clone(),
            progress: self.progress,
            inputs: self.inputs.iter().map(FileRowView::from_blob).collect(),
            options: self.options.values(),
            outputs: self
                .output
                .iter()
                .flat_map(|artifact| artifact.files.iter().map(FileRowView::from_blob))
                .collect(),
            can_run,
            can_cancel: self.phase == Phase::Processing,
            dirty: self.dirty,
        }
    }

    /// Returns whether a re-render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.mark_dirty();
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn engine_loaded(&mut self, version: String) {
        self.engine_version = Some(version);
        let phase = if self.inputs.is_empty() {
            Phase::EngineReady
        } else {
            Phase::FileSelected
        };
        self.set_phase(phase);
        self.set_status(self.tool.ready_message());
    }

    pub(crate) fn options_mut(&mut self) -> &mut ToolOptions {
        self.mark_dirty();
        &mut self.options
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut Vec<Blob> {
        self.mark_dirty();
        &mut self.inputs
    }

    /// Drops any previous result together with its progress.
    pub(crate) fn clear_output(&mut self) {
        self.output = None;
        self.progress = 0;
        self.mark_dirty();
    }

    /// Phase to fall back to when the selection changes outside a job.
    pub(crate) fn settle_phase(&mut self) {
        if !self.phase.is_ready() {
            return;
        }
        let phase = if self.inputs.is_empty() {
            Phase::EngineReady
        } else {
            Phase::FileSelected
        };
        self.set_phase(phase);
    }

    pub(crate) fn start_job(&mut self) -> JobId {
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.active_job = Some(job_id);
        self.output = None;
        self.progress = 0;
        self.set_phase(Phase::Processing);
        self.set_status(self.tool.running_message());
        job_id
    }

    /// Detaches the running job; later events for it are ignored.
    pub(crate) fn abandon_job(&mut self) -> Option<JobId> {
        let job_id = self.active_job.take()?;
        self.progress = 0;
        self.set_phase(Phase::FileSelected);
        self.set_status("Cancelled.");
        Some(job_id)
    }

    pub(crate) fn is_active(&self, job_id: JobId) -> bool {
        self.active_job == Some(job_id)
    }

    pub(crate) fn apply_progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent > self.progress {
            self.progress = percent;
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_done(&mut self, job_id: JobId, outcome: JobOutcome) {
        self.active_job = None;
        match outcome {
            JobOutcome::Succeeded(artifact) => {
                self.output = Some(artifact);
                self.finished_job = Some(job_id);
                self.progress = 100;
                self.set_phase(Phase::Succeeded);
                self.set_status(self.tool.success_message());
            }
            JobOutcome::Failed { .. } => {
                self.progress = 0;
                self.set_phase(Phase::Failed);
                self.set_status(self.tool.failure_message());
            }
        }
    }

    pub(crate) fn job_request(&self) -> JobRequest {
        JobRequest {
            tool: self.tool,
            inputs: self.inputs.clone(),
            options: self.options.clone(),
        }
    }
}

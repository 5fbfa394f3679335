use crate::{Artifact, Backend, JobId, JobRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadEngine { backend: Backend },
    RunJob { job_id: JobId, request: JobRequest },
    CancelJob { job_id: JobId },
    SaveArtifact { job_id: JobId, artifact: Artifact },
}

//! Mediakit engine: job planning, engine execution and artifact export.
mod engine;
mod exec;
mod export;
mod filename;
mod pdf;
mod persist;
mod pipeline;
mod plan;
mod progress;
mod settings;
mod types;
mod vfs;

pub use engine::EngineHandle;
pub use exec::{ChannelProgressSink, Executor, ProcessExecutor, ProgressSink};
pub use export::{save_artifact, ExportError, ExportOptions, ExportSummary};
pub use filename::sanitize_filename;
pub use pdf::{merge_pdfs, page_count, PdfError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use plan::{
    build_plan, Invocation, JobPlan, OutputSpec, PlanContext, PlanError, StagedFile, Work,
};
pub use settings::{EngineSettings, ProgramSettings};
pub use types::{EngineEvent, EngineInfo, FailureKind, JobError};
pub use vfs::{VfsError, VirtualFs};

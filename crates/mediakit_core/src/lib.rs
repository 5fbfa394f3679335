//! Mediakit core: pure tool state machine, option schema and view-model helpers.
mod effect;
mod msg;
mod options;
mod state;
mod tool;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{MoveDirection, Msg};
pub use options::{
    format_number, AudioEditOptions, AudioOperation, CompressOptions, CompressQuality, FieldKind,
    GifOptions, GifSource, ImageConvertOptions, ImageFormat, MemeOptions, OptionError,
    OptionField, ResizeOptions, ToolOptions,
};
pub use state::{AppState, Artifact, Blob, JobId, JobOutcome, JobRequest, Phase};
pub use tool::{Backend, ToolKind, UnknownTool};
pub use update::update;
pub use view_model::{format_file_size, AppViewModel, FileRowView};

//! Argument builder: turns a [`JobRequest`] into the exact engine work.
//!
//! Planning is deterministic and free of IO apart from reading PDF page
//! counts out of the request bytes. The same request always yields the same
//! staged files, invocations and expected outputs.

mod audio;
mod gif;
mod image;
mod pdf;
mod video;

use std::path::PathBuf;

use bytes::Bytes;
use mediakit_core::{Backend, Blob, JobRequest, ToolKind, ToolOptions};

use crate::pdf::PdfError;
use crate::EngineSettings;

/// Settings the builder needs beyond the request itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanContext {
    pub font_file: Option<PathBuf>,
}

impl From<&EngineSettings> for PlanContext {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            font_file: settings.font_file.clone(),
        }
    }
}

/// A file written into the scratch directory before the first invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub data: Bytes,
}

impl StagedFile {
    fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// One run of the backend executable. `args` excludes the program's base
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    /// Shown to the user when the step starts.
    pub label: Option<String>,
}

impl Invocation {
    fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            label: None,
        }
    }

    fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A file read back after the last invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    /// Name inside the scratch directory.
    pub name: String,
    /// Name offered for download.
    pub download_name: String,
    pub mime: String,
}

impl OutputSpec {
    fn new(name: impl Into<String>, download_name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_name: download_name.into(),
            mime: mime.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Work {
    Commands {
        staged: Vec<StagedFile>,
        steps: Vec<Invocation>,
        outputs: Vec<OutputSpec>,
    },
    MergePdf {
        documents: Vec<Bytes>,
        output: OutputSpec,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    pub backend: Backend,
    pub work: Work,
}

impl JobPlan {
    fn commands(
        backend: Backend,
        staged: Vec<StagedFile>,
        steps: Vec<Invocation>,
        outputs: Vec<OutputSpec>,
    ) -> Self {
        Self {
            backend,
            work: Work::Commands {
                staged,
                steps,
                outputs,
            },
        }
    }

    pub fn steps(&self) -> &[Invocation] {
        match &self.work {
            Work::Commands { steps, .. } => steps,
            Work::MergePdf { .. } => &[],
        }
    }

    pub fn staged(&self) -> &[StagedFile] {
        match &self.work {
            Work::Commands { staged, .. } => staged,
            Work::MergePdf { .. } => &[],
        }
    }

    pub fn outputs(&self) -> Vec<&OutputSpec> {
        match &self.work {
            Work::Commands { outputs, .. } => outputs.iter().collect(),
            Work::MergePdf { output, .. } => vec![output],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no input files")]
    NoInputs,
    #[error("{tool} needs at least {needed} files, got {got}")]
    TooFewInputs {
        tool: ToolKind,
        needed: usize,
        got: usize,
    },
    #[error("options for {found} do not apply to {tool}")]
    OptionsMismatch { tool: ToolKind, found: ToolKind },
    #[error("cannot read PDF: {0}")]
    UnreadablePdf(#[from] PdfError),
    #[error("PDF has no pages")]
    EmptyPdf,
}

/// Builds the engine work for one job.
pub fn build_plan(request: &JobRequest, ctx: &PlanContext) -> Result<JobPlan, PlanError> {
    let tool = request.tool;
    if request.options.tool() != tool {
        return Err(PlanError::OptionsMismatch {
            tool,
            found: request.options.tool(),
        });
    }
    let first = request.inputs.first().ok_or(PlanError::NoInputs)?;
    if request.inputs.len() < tool.min_inputs() {
        return Err(PlanError::TooFewInputs {
            tool,
            needed: tool.min_inputs(),
            got: request.inputs.len(),
        });
    }

    let plan = match &request.options {
        ToolOptions::VideoToMp3 => video::to_mp3(first),
        ToolOptions::VideoCompressor(opts) => video::compress(first, opts),
        ToolOptions::MuteVideo => video::mute(first),
        ToolOptions::AudioEditor(opts) => audio::edit(first, &request.inputs, opts),
        ToolOptions::GifMaker(opts) => gif::make(first, &request.inputs, opts),
        ToolOptions::ImageConverter(opts) => image::convert(&request.inputs, opts),
        ToolOptions::ImageResizer(opts) => image::resize(first, opts),
        ToolOptions::MemeGenerator(opts) => image::meme(first, opts, ctx),
        ToolOptions::PdfToJpg => pdf::to_jpg(first)?,
        ToolOptions::MergePdf => pdf::merge(&request.inputs),
    };
    Ok(plan)
}

/// File extension used when staging `blob`: taken from its name, or derived
/// from the MIME subtype.
fn input_extension(blob: &Blob) -> String {
    let from_name = blob
        .name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return ext;
    }
    match blob.mime.rsplit_once('/').map(|(_, sub)| sub) {
        Some("jpeg") => "jpg".to_string(),
        Some("svg+xml") => "svg".to_string(),
        Some(sub) if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()) => {
            sub.to_string()
        }
        _ => "bin".to_string(),
    }
}

/// `name` without its last extension.
fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Maps a 0..=100 quality to ffmpeg's 2..=31 `-q:v` scale (lower is better).
fn jpeg_qscale(quality: f64) -> String {
    ((100.0 - quality) / 3.125).round().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_prefers_file_name() {
        let blob = Blob::new("Holiday.JPEG", "image/jpeg", Vec::new());
        assert_eq!(input_extension(&blob), "jpeg");
        let blob = Blob::new("capture", "image/jpeg", Vec::new());
        assert_eq!(input_extension(&blob), "jpg");
        let blob = Blob::new("weird.", "application/octet-stream", Vec::new());
        assert_eq!(input_extension(&blob), "bin");
    }

    #[test]
    fn stem_drops_last_extension_only() {
        assert_eq!(file_stem("a.tar.gz"), "a.tar");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("plain"), "plain");
    }

    #[test]
    fn jpeg_quality_maps_to_qscale() {
        assert_eq!(jpeg_qscale(85.0), "5");
        assert_eq!(jpeg_qscale(100.0), "0");
        assert_eq!(jpeg_qscale(1.0), "32");
    }
}

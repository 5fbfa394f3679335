use std::path::PathBuf;
use std::time::Duration;

use mediakit_core::Backend;

/// How to invoke one external engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSettings {
    pub program: PathBuf,
    /// Prepended to every job invocation.
    pub base_args: Vec<String>,
    /// Arguments of the readiness probe.
    pub version_args: Vec<String>,
}

impl ProgramSettings {
    pub fn ffmpeg(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: [
                "-hide_banner",
                "-nostdin",
                "-y",
                "-progress",
                "pipe:1",
                "-nostats",
            ]
            .map(String::from)
            .to_vec(),
            version_args: vec!["-version".to_string()],
        }
    }

    pub fn pdftoppm(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            version_args: vec!["-v".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub media: ProgramSettings,
    pub pdf_renderer: ProgramSettings,
    /// Font used for captions; the engine default when unset.
    pub font_file: Option<PathBuf>,
    /// Upper bound for a single engine invocation.
    pub step_timeout: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            media: ProgramSettings::ffmpeg("ffmpeg"),
            pdf_renderer: ProgramSettings::pdftoppm("pdftoppm"),
            font_file: None,
            step_timeout: None,
        }
    }
}

impl EngineSettings {
    /// External program behind `backend`; `None` for in-process backends.
    pub fn program(&self, backend: Backend) -> Option<&ProgramSettings> {
        match backend {
            Backend::Media => Some(&self.media),
            Backend::PdfRenderer => Some(&self.pdf_renderer),
            Backend::PdfDocument => None,
        }
    }
}

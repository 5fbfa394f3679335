use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use engine_logging::LogDestination;
use log::LevelFilter;
use mediakit_engine::{EngineSettings, ExportOptions, ProgramSettings};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "mediakit.ron";

/// On-disk settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ffmpeg: PathBuf,
    pub pdf_renderer: PathBuf,
    pub font_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub log_destination: String,
    pub log_level: String,
    pub step_timeout_secs: Option<u64>,
    pub write_manifest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            pdf_renderer: PathBuf::from("pdftoppm"),
            font_file: None,
            output_dir: PathBuf::from("output"),
            log_destination: LogDestination::Terminal.to_string(),
            log_level: "warn".to_string(),
            step_timeout_secs: None,
            write_manifest: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Loads `explicit`, or `mediakit.ron` in the working directory.
///
/// A missing default file yields the defaults; a missing explicit file is an
/// error so a typo in `--config` does not go unnoticed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    parse_config(&content).map_err(|message| ConfigError::Parse { path, message })
}

pub fn parse_config(content: &str) -> Result<AppConfig, String> {
    ron::from_str(content).map_err(|err| err.to_string())
}

impl AppConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            media: ProgramSettings::ffmpeg(&self.ffmpeg),
            pdf_renderer: ProgramSettings::pdftoppm(&self.pdf_renderer),
            font_file: self.font_file.clone(),
            step_timeout: self
                .step_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            manifest_filename: self
                .write_manifest
                .then(|| ExportOptions::default().manifest_filename)
                .flatten(),
        }
    }

    /// Unknown names fall back to the terminal.
    pub fn log_destination(&self) -> LogDestination {
        LogDestination::from_str(&self.log_destination).unwrap_or_default()
    }

    /// Unknown names fall back to `warn`.
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.log_level.trim()).unwrap_or(LevelFilter::Warn)
    }
}

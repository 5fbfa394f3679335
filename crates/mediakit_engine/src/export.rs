use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mediakit_core::{Artifact, JobId, ToolKind};
use serde_json::json;

use crate::filename::sanitize_filename;
use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Written next to the files when set.
    pub manifest_filename: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            manifest_filename: Some("manifest.json".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub total_bytes: u64,
    pub manifest_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("cannot encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Writes every file of `artifact` into `output_dir`. Names are sanitised
/// and made unique within the artifact.
pub fn save_artifact(
    output_dir: &Path,
    tool: ToolKind,
    job_id: JobId,
    artifact: &Artifact,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let writer = AtomicFileWriter::open(output_dir)?;
    let mut used = HashSet::new();
    let mut files = Vec::with_capacity(artifact.files.len());
    let mut entries = Vec::with_capacity(artifact.files.len());
    let mut total_bytes = 0u64;

    for blob in &artifact.files {
        let name = unique_name(sanitize_filename(&blob.name), &mut used);
        files.push(writer.write(&name, &blob.data)?);
        total_bytes += blob.len() as u64;
        entries.push(json!({
            "name": name,
            "mime": blob.mime,
            "bytes": blob.len(),
        }));
    }

    let manifest_path = match &options.manifest_filename {
        Some(manifest_name) => {
            let manifest = json!({
                "tool": tool.slug(),
                "job_id": job_id,
                "files": entries,
            });
            let body = serde_json::to_vec_pretty(&manifest)?;
            Some(writer.write(manifest_name, &body)?)
        }
        None => None,
    };

    Ok(ExportSummary {
        files,
        total_bytes,
        manifest_path,
    })
}

/// Appends `-2`, `-3`, ... before the extension until the name is unused.
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_ascii_lowercase()) {
        return name;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.clone(), String::new()),
    };
    (2..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| used.insert(candidate.to_ascii_lowercase()))
        .unwrap_or(name)
}

use crate::{Blob, Phase, ToolKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub tool: ToolKind,
    pub phase: Phase,
    pub status: String,
    pub engine_version: Option<String>,
    pub progress: u8,
    pub inputs: Vec<FileRowView>,
    pub options: Vec<(&'static str, String)>,
    pub outputs: Vec<FileRowView>,
    pub can_run: bool,
    pub can_cancel: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub mime: String,
    pub size: String,
}

impl FileRowView {
    pub(crate) fn from_blob(blob: &Blob) -> Self {
        Self {
            name: blob.name.clone(),
            mime: blob.mime.clone(),
            size: format_file_size(blob.len() as u64),
        }
    }
}

/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`; at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::format_file_size;

    #[test]
    fn sizes_use_binary_units_and_two_decimals() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
        assert_eq!(format_file_size(2_359_296), "2.25 MB");
    }
}

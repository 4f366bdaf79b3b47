use serde::{Deserialize, Serialize};

pub const DEFAULT_FILE_STEM: &str = "part-00000";

/// Exporter configuration. Immutable for the exporter's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Replace an existing destination instead of failing.
    #[serde(default)]
    pub overwrite: bool,
    /// File name (without extension) used inside partition directories.
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

fn default_file_stem() -> String {
    DEFAULT_FILE_STEM.to_string()
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            file_stem: default_file_stem(),
        }
    }
}

impl ExportOptions {
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }
}

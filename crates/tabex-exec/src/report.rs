//! What an export wrote. Nothing here is tracked after the call returns.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    /// `col=value/...` label, `None` for unpartitioned output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    pub rows: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    /// The output file, or the root directory for partitioned output.
    pub destination: PathBuf,
    pub format: String,
    pub compression: String,
    pub partitioned: bool,
    pub rows: usize,
    pub files: Vec<WrittenFile>,
}

impl ExportReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    /// Number of partition groups; 0 when unpartitioned.
    pub fn partitions(&self) -> usize {
        if self.partitioned {
            self.files.len()
        } else {
            0
        }
    }
}

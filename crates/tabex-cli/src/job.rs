//! YAML job files: one export per file.
//!
//! ```yaml
//! source: data/cities.csv
//! destination: out/cities
//! overwrite: true
//! format:
//!   kind: columnar
//!   layout: parquet
//!   partition_by: [State]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tabex_core::format::parse_delimiter;
use tabex_core::{FormatDescriptor, Table};
use tabex_exec::ExportOptions;
use tabex_io::readers::csv::CsvReader;
use tabex_io::DelimitedOptions;

use crate::CliError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
    /// Whether a delimited source starts with a header record.
    #[serde(default = "default_true")]
    pub has_headers: bool,
    /// Delimiter of a delimited source; inferred from the extension when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_delimiter: Option<char>,
    /// Parse delimited source cells into integers/floats where possible.
    #[serde(default)]
    pub infer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_stem: Option<String>,
    pub format: FormatDescriptor,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, CliError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let yaml = fs::read_to_string(path)
            .map_err(|e| CliError::Usage(format!("cannot read job file {}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    pub fn options(&self) -> ExportOptions {
        let opts = ExportOptions::default().with_overwrite(self.overwrite);
        match &self.file_stem {
            Some(stem) => opts.with_file_stem(stem.clone()),
            None => opts,
        }
    }

    /// Load the source table.
    ///
    /// Delimited sources (`.csv`, `.txt`, `.tsv`, or any file with an explicit
    /// `source_delimiter`) go through the CSV reader; everything else is read
    /// by extension.
    pub fn load_source(&self) -> Result<Table, CliError> {
        let ext = self
            .source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let delimiter = match (self.source_delimiter, ext.as_str()) {
            (Some(c), _) => Some(parse_delimiter(c)?),
            (None, "csv") => Some(b','),
            (None, "txt" | "tsv") => Some(b'\t'),
            _ => None,
        };

        let Some(delimiter) = delimiter else {
            return Ok(tabex_io::read_any(&self.source)?);
        };
        let opts = DelimitedOptions {
            has_headers: self.has_headers,
            ..DelimitedOptions::default().with_delimiter(delimiter)
        };
        let mut reader = CsvReader::from_path(&self.source, opts)?;
        let table = if self.infer {
            reader.read_table_inferred()?
        } else {
            reader.read_table()?
        };
        Ok(table)
    }
}

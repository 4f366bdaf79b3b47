//! Format descriptors: which encoding to write and with which options.
//!
//! Example (YAML, as accepted by the CLI job file):
//! ```yaml
//! kind: columnar
//! layout: parquet
//! compression: snappy
//! partition_by: [State]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partition::PartitionPlan;
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnarLayout {
    /// Arrow IPC file (Feather v2).
    Feather,
    #[default]
    Parquet,
}

/// Compression codec names shared by the binary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Uncompressed,
    Snappy,
    Gzip,
    Zstd,
    Lz4,
    Deflate,
}

impl Compression {
    pub fn name(&self) -> &'static str {
        match self {
            Compression::Uncompressed => "uncompressed",
            Compression::Snappy => "snappy",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
            Compression::Lz4 => "lz4",
            Compression::Deflate => "deflate",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uncompressed" | "none" | "null" => Ok(Compression::Uncompressed),
            "snappy" => Ok(Compression::Snappy),
            "gzip" => Ok(Compression::Gzip),
            "zstd" | "zstandard" => Ok(Compression::Zstd),
            "lz4" => Ok(Compression::Lz4),
            "deflate" => Ok(Compression::Deflate),
            other => Err(Error::Validation(format!("unknown compression codec '{}'", other))),
        }
    }
}

/// Record terminator for delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    Lf,
    CrLf,
    Byte(u8),
}

impl Newline {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "\n" => Ok(Newline::Lf),
            "\r\n" => Ok(Newline::CrLf),
            _ => match s.as_bytes() {
                [b] if b.is_ascii() && *b != b'"' => Ok(Newline::Byte(*b)),
                _ => Err(Error::Validation(format!(
                    "newline must be \\n, \\r\\n or a single ASCII character, got {:?}",
                    s
                ))),
            },
        }
    }

    fn contains(&self, byte: u8) -> bool {
        match self {
            Newline::Lf => byte == b'\n',
            Newline::CrLf => byte == b'\r' || byte == b'\n',
            Newline::Byte(b) => byte == *b,
        }
    }
}

/// Validate a delimiter character and narrow it to the byte the csv writer takes.
pub fn parse_delimiter(c: char) -> Result<u8> {
    if !c.is_ascii() || matches!(c, '"' | '\r' | '\n') {
        return Err(Error::Validation(format!(
            "delimiter must be a single ASCII character other than a quote or line break, got {:?}",
            c
        )));
    }
    Ok(c as u8)
}

fn default_delimiter() -> char {
    ','
}

fn default_newline() -> String {
    "\n".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatDescriptor {
    DelimitedText {
        #[serde(default = "default_delimiter")]
        delimiter: char,
        #[serde(default = "default_newline")]
        newline: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition_by: Option<PartitionPlan>,
    },
    Columnar {
        #[serde(default)]
        layout: ColumnarLayout,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        compression: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition_by: Option<PartitionPlan>,
    },
    RowSerialized {
        /// Declared schema; derived from runtime types when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<Schema>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        compression: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition_by: Option<PartitionPlan>,
    },
    /// Opaque, implementation-defined dump. Not portable across implementations.
    NativeObjectDump {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partition_by: Option<PartitionPlan>,
    },
}

impl FormatDescriptor {
    /// Comma-separated text.
    pub fn csv() -> Self {
        FormatDescriptor::DelimitedText {
            delimiter: ',',
            newline: default_newline(),
            partition_by: None,
        }
    }

    /// Tab-separated text (`.txt`).
    pub fn txt() -> Self {
        FormatDescriptor::DelimitedText {
            delimiter: '\t',
            newline: default_newline(),
            partition_by: None,
        }
    }

    pub fn feather() -> Self {
        FormatDescriptor::Columnar {
            layout: ColumnarLayout::Feather,
            compression: None,
            partition_by: None,
        }
    }

    pub fn parquet() -> Self {
        FormatDescriptor::Columnar {
            layout: ColumnarLayout::Parquet,
            compression: None,
            partition_by: None,
        }
    }

    pub fn avro() -> Self {
        FormatDescriptor::RowSerialized {
            schema: None,
            compression: None,
            partition_by: None,
        }
    }

    pub fn dump() -> Self {
        FormatDescriptor::NativeObjectDump { partition_by: None }
    }

    pub fn with_partition_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        let plan = Some(PartitionPlan::new(columns));
        match &mut self {
            FormatDescriptor::DelimitedText { partition_by, .. }
            | FormatDescriptor::Columnar { partition_by, .. }
            | FormatDescriptor::RowSerialized { partition_by, .. }
            | FormatDescriptor::NativeObjectDump { partition_by } => *partition_by = plan,
        }
        self
    }

    /// Set the codec name. Ignored by formats without compression.
    pub fn with_compression(mut self, codec: impl Into<String>) -> Self {
        match &mut self {
            FormatDescriptor::Columnar { compression, .. }
            | FormatDescriptor::RowSerialized { compression, .. } => *compression = Some(codec.into()),
            _ => {}
        }
        self
    }

    /// Set the declared row schema. Ignored by formats other than row-serialized.
    pub fn with_schema(mut self, declared: Schema) -> Self {
        if let FormatDescriptor::RowSerialized { schema, .. } = &mut self {
            *schema = Some(declared);
        }
        self
    }

    /// Short format name: csv, txt, feather, parquet, avro or dump.
    pub fn name(&self) -> &'static str {
        match self {
            FormatDescriptor::DelimitedText { delimiter: ',', .. } => "csv",
            FormatDescriptor::DelimitedText { .. } => "txt",
            FormatDescriptor::Columnar { layout: ColumnarLayout::Feather, .. } => "feather",
            FormatDescriptor::Columnar { layout: ColumnarLayout::Parquet, .. } => "parquet",
            FormatDescriptor::RowSerialized { .. } => "avro",
            FormatDescriptor::NativeObjectDump { .. } => "dump",
        }
    }

    /// File extension for output units; same as [`FormatDescriptor::name`].
    pub fn extension(&self) -> &'static str {
        self.name()
    }

    /// Partition plan, if any. An empty column list counts as none.
    pub fn partition_plan(&self) -> Option<&PartitionPlan> {
        let plan = match self {
            FormatDescriptor::DelimitedText { partition_by, .. }
            | FormatDescriptor::Columnar { partition_by, .. }
            | FormatDescriptor::RowSerialized { partition_by, .. }
            | FormatDescriptor::NativeObjectDump { partition_by } => partition_by.as_ref(),
        };
        plan.filter(|p| !p.is_empty())
    }

    /// Resolved compression codec, applying the per-format default.
    ///
    /// Feather defaults to lz4, Parquet to snappy, Avro to uncompressed.
    /// Text and dump formats are always uncompressed.
    pub fn compression(&self) -> Result<Compression> {
        let (name, default) = match self {
            FormatDescriptor::Columnar { layout: ColumnarLayout::Feather, compression, .. } => {
                (compression, Compression::Lz4)
            }
            FormatDescriptor::Columnar { layout: ColumnarLayout::Parquet, compression, .. } => {
                (compression, Compression::Snappy)
            }
            FormatDescriptor::RowSerialized { compression, .. } => (compression, Compression::Uncompressed),
            _ => return Ok(Compression::Uncompressed),
        };
        match name {
            Some(n) => n.parse(),
            None => Ok(default),
        }
    }

    /// Check options that do not depend on the table: delimiter, newline and
    /// whether the codec is one this format can carry.
    pub fn validate(&self) -> Result<()> {
        if let FormatDescriptor::DelimitedText { delimiter, newline, .. } = self {
            let delim = parse_delimiter(*delimiter)?;
            let nl = Newline::parse(newline)?;
            if nl.contains(delim) {
                return Err(Error::Validation("delimiter and newline must differ".into()));
            }
        }

        let codec = self.compression()?;
        let supported: &[Compression] = match self {
            FormatDescriptor::Columnar { layout: ColumnarLayout::Feather, .. } => {
                &[Compression::Uncompressed, Compression::Lz4, Compression::Zstd]
            }
            FormatDescriptor::Columnar { layout: ColumnarLayout::Parquet, .. } => &[
                Compression::Uncompressed,
                Compression::Snappy,
                Compression::Gzip,
                Compression::Zstd,
                Compression::Lz4,
            ],
            FormatDescriptor::RowSerialized { .. } => {
                &[Compression::Uncompressed, Compression::Deflate, Compression::Snappy]
            }
            _ => &[Compression::Uncompressed],
        };
        if !supported.contains(&codec) {
            return Err(Error::UnsupportedFormat(format!(
                "{} output does not support {} compression",
                self.name(),
                codec
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_extensions() {
        assert_eq!(FormatDescriptor::csv().extension(), "csv");
        assert_eq!(FormatDescriptor::txt().extension(), "txt");
        assert_eq!(FormatDescriptor::feather().extension(), "feather");
        assert_eq!(FormatDescriptor::parquet().extension(), "parquet");
        assert_eq!(FormatDescriptor::avro().extension(), "avro");
        assert_eq!(FormatDescriptor::dump().extension(), "dump");
    }

    #[test]
    fn test_default_codecs() {
        assert_eq!(FormatDescriptor::feather().compression().unwrap(), Compression::Lz4);
        assert_eq!(FormatDescriptor::parquet().compression().unwrap(), Compression::Snappy);
        assert_eq!(FormatDescriptor::avro().compression().unwrap(), Compression::Uncompressed);
    }

    #[test]
    fn test_validate_codec_support() {
        assert!(FormatDescriptor::parquet().with_compression("gzip").validate().is_ok());
        let err = FormatDescriptor::feather().with_compression("snappy").validate().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        let err = FormatDescriptor::avro().with_compression("brotli").validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_delimiter() {
        let bad = FormatDescriptor::DelimitedText {
            delimiter: '"',
            newline: "\n".into(),
            partition_by: None,
        };
        assert!(bad.validate().is_err());
        let clash = FormatDescriptor::DelimitedText {
            delimiter: ';',
            newline: ";".into(),
            partition_by: None,
        };
        assert!(clash.validate().is_err());
        assert!(FormatDescriptor::txt().validate().is_ok());
    }

    #[test]
    fn test_empty_partition_plan_counts_as_none() {
        let fmt = FormatDescriptor::csv().with_partition_by(Vec::<String>::new());
        assert!(fmt.partition_plan().is_none());
        let fmt = FormatDescriptor::csv().with_partition_by(["State"]);
        assert_eq!(fmt.partition_plan().unwrap().columns, vec!["State"]);
    }

    #[test]
    fn test_descriptor_from_yaml() {
        let yaml = "kind: columnar\nlayout: feather\ncompression: zstd\npartition_by: [State]\n";
        let fmt: FormatDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fmt.name(), "feather");
        assert_eq!(fmt.compression().unwrap(), Compression::Zstd);
        assert!(fmt.partition_plan().is_some());

        let yaml = "kind: delimited_text\ndelimiter: \"\\t\"\n";
        let fmt: FormatDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fmt.name(), "txt");
    }
}

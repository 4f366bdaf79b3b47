#![forbid(unsafe_code)]
//! tabex-io: per-format encoders and decoders for `tabex_core::Table`.
//!
//! - `writers`: delimited text, Feather, Parquet, Avro, native dump.
//! - `readers`: the matching decoders, used for round trips and `tabex inspect`.
//!
//! Feather and Parquet are gated behind the `columnar` feature, Avro behind
//! `avro`. Both are on by default.

pub mod error;
pub mod options;
pub mod readers;
pub mod writers;

#[cfg(feature = "columnar")]
pub mod arrow_convert;

use std::path::Path;

use tabex_core::Table;

pub use error::{Error, Result};
pub use options::DelimitedOptions;

/// Whether this build can encode Feather/Parquet.
pub const COLUMNAR_ENABLED: bool = cfg!(feature = "columnar");

/// Whether this build can encode Avro.
pub const AVRO_ENABLED: bool = cfg!(feature = "avro");

/// Read any file this crate writes, picking the decoder by extension.
///
/// `.csv` is read comma-delimited and `.txt` tab-delimited; all text cells
/// come back as strings.
pub fn read_any(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    tracing::debug!(path = %path.display(), ext = %ext, "reading table");
    match ext.as_str() {
        "csv" => readers::csv::CsvReader::from_path(path, DelimitedOptions::default())?.read_table(),
        "txt" | "tsv" => {
            readers::csv::CsvReader::from_path(path, DelimitedOptions::tab())?.read_table()
        }
        "dump" => readers::dump::read_table(path),
        #[cfg(feature = "columnar")]
        "feather" | "arrow" => readers::feather::read_table(path),
        #[cfg(feature = "columnar")]
        "parquet" => readers::parquet::read_table(path),
        #[cfg(feature = "avro")]
        "avro" => readers::avro::read_table(path),
        other => Err(Error::Unsupported(format!("no reader for extension '{}'", other))),
    }
}

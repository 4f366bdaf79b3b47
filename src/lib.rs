#![forbid(unsafe_code)]
//! tabex: export in-memory tables to delimited text, Feather, Parquet, Avro
//! or a native dump, optionally Hive-partitioned.
//!
//! Re-exports the public surface of `tabex-core`, `tabex-io` and `tabex-exec`.

pub use tabex_core::{
    ColumnarLayout, Compression, DataType, Field, FormatDescriptor, PartitionPlan, Scalar, Schema, Table,
};
pub use tabex_exec::{export, ExportError, ExportOptions, ExportPlan, ExportReport, TableExporter, WrittenFile};
pub use tabex_io::{read_any, readers, writers, DelimitedOptions};

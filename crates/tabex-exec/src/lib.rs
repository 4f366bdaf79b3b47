#![forbid(unsafe_code)]
//! tabex-exec: the `TableExporter` entry point.
//!
//! An export validates everything up front (table shape, descriptor, partition
//! keys, declared types, destination), then writes one file per partition
//! group through the encoders in `tabex-io`.

pub mod config;
pub mod error;
pub mod exporter;
pub mod report;

pub use config::ExportOptions;
pub use error::{ExportError, Result};
pub use exporter::{export, ExportPlan, TableExporter};
pub use report::{ExportReport, WrittenFile};

pub use tabex_core::{FormatDescriptor, Scalar, Schema, Table};

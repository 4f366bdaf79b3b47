#![forbid(unsafe_code)]
//! tabex-core: shared kernel for the tabex exporter.
//!
//! This crate contains only *pure* types and helpers. There is **no I/O**
//! here; encoders live in `tabex-io` and orchestration in `tabex-exec`.
//!
//! - `types`: `Scalar` and the row-oriented `Table`.
//! - `schema`: `DataType`/`Field`/`Schema`, columnar inference and row-schema checks.
//! - `format`: the `FormatDescriptor` handed to the exporter.
//! - `partition`: `PartitionPlan` and the `col=value` grouping.

pub mod error;
pub mod format;
pub mod partition;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use format::{ColumnarLayout, Compression, FormatDescriptor};
pub use partition::{PartitionGroup, PartitionPlan};
pub use schema::{DataType, Field, Schema};
pub use types::{Scalar, Table};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! TableExporter: validate, group, then write one unit per partition.
//!
//! Every check runs in [`TableExporter::plan`] before the destination is
//! touched:
//! - table shape and descriptor options
//! - partition keys (no null/empty values)
//! - row-serialized type checks over the whole table
//! - destination existence
//!
//! [`TableExporter::export`] then writes the planned units in first-seen
//! partition order. A failure mid-write leaves whatever was written in place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use tabex_core::partition::PartitionGroup;
#[cfg(feature = "avro")]
use tabex_core::schema::derive_row_schema;
#[cfg(feature = "columnar")]
use tabex_core::schema::infer_columnar;
use tabex_core::{Compression, FormatDescriptor, Schema, Table};
#[cfg(feature = "columnar")]
use tabex_core::ColumnarLayout;

use tabex_io::writers;
use tabex_io::DelimitedOptions;

use crate::config::ExportOptions;
use crate::error::{ExportError, Result};
use crate::report::{ExportReport, WrittenFile};

/// Resolved encoder settings, shared by every partition unit.
#[derive(Debug, Clone)]
enum Encoding {
    Delimited(DelimitedOptions),
    #[cfg(feature = "columnar")]
    Columnar {
        layout: ColumnarLayout,
        schema: Schema,
        compression: Compression,
    },
    #[cfg(feature = "avro")]
    Row {
        schema: Schema,
        compression: Compression,
    },
    Dump,
}

/// A validated export: nothing has been written yet.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    target: PathBuf,
    partitioned: bool,
    replace_existing: bool,
    format_name: &'static str,
    extension: &'static str,
    compression: Compression,
    encoding: Encoding,
    groups: Vec<PartitionGroup>,
}

impl ExportPlan {
    /// Output file, or the root directory for partitioned output.
    ///
    /// An unpartitioned destination without an extension gets the format
    /// extension, and only that path is checked for existence: exporting to
    /// `out/cities` as csv writes `out/cities.csv` even if a file named
    /// `out/cities` exists, and leaves that file alone.
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn is_partitioned(&self) -> bool {
        self.partitioned
    }

    pub fn groups(&self) -> &[PartitionGroup] {
        &self.groups
    }

    /// Schema the encoder will use, for columnar and row-serialized output.
    pub fn schema(&self) -> Option<&Schema> {
        match &self.encoding {
            #[cfg(feature = "columnar")]
            Encoding::Columnar { schema, .. } => Some(schema),
            #[cfg(feature = "avro")]
            Encoding::Row { schema, .. } => Some(schema),
            _ => None,
        }
    }

    fn unit_path(&self, group: &PartitionGroup, file_stem: &str) -> PathBuf {
        if self.partitioned {
            self.target
                .join(group.relative_dir())
                .join(format!("{}.{}", file_stem, self.extension))
        } else {
            self.target.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableExporter {
    opts: ExportOptions,
}

impl TableExporter {
    pub fn new(opts: ExportOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.opts
    }

    /// Run every precondition check and group the rows. Writes nothing.
    pub fn plan(&self, table: &Table, destination: &Path, format: &FormatDescriptor) -> Result<ExportPlan> {
        table.validate()?;
        format.validate()?;
        ensure_supported(format)?;
        self.validate_file_stem()?;

        let plan = format.partition_plan();
        let (groups, payload_columns) = match plan {
            Some(plan) => {
                let key_idx = plan.resolve(table)?;
                let payload: Vec<usize> = (0..table.num_columns())
                    .filter(|i| !key_idx.contains(i))
                    .collect();
                (plan.split(table)?, payload)
            }
            None => (
                vec![PartitionGroup::whole(table)],
                (0..table.num_columns()).collect(),
            ),
        };

        let encoding = resolve_encoding(table, &payload_columns, format)?;

        let partitioned = plan.is_some();
        let target = resolve_target(destination, format, partitioned);
        let exists = fs::symlink_metadata(&target).is_ok();
        if exists && !self.opts.overwrite {
            return Err(ExportError::DestinationExists(target));
        }

        Ok(ExportPlan {
            target,
            partitioned,
            replace_existing: exists,
            format_name: format.name(),
            extension: format.extension(),
            compression: format.compression()?,
            encoding,
            groups,
        })
    }

    /// Export `table` to `destination` in `format`.
    pub fn export(&self, table: &Table, destination: &Path, format: &FormatDescriptor) -> Result<ExportReport> {
        let plan = self.plan(table, destination, format)?;
        self.write(plan)
    }

    /// Write a plan produced by [`TableExporter::plan`].
    pub fn write(&self, plan: ExportPlan) -> Result<ExportReport> {
        if plan.replace_existing {
            debug!(path = %plan.target.display(), "replacing existing destination");
            remove_existing(&plan.target)?;
        }
        if plan.partitioned {
            fs::create_dir_all(&plan.target)?;
        }

        let mut files = Vec::with_capacity(plan.groups.len());
        for group in &plan.groups {
            let path = plan.unit_path(group, &self.opts.file_stem);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            write_unit(&path, &group.table, &plan.encoding)
                .map_err(|e| e.with_context(path.display().to_string()))?;
            let bytes = fs::metadata(&path)?.len();
            debug!(
                path = %path.display(),
                rows = group.row_ids.len(),
                bytes,
                "wrote unit"
            );
            files.push(WrittenFile {
                path,
                partition: group.label(),
                rows: group.table.num_rows(),
                bytes,
            });
        }

        let report = ExportReport {
            destination: plan.target,
            format: plan.format_name.to_string(),
            compression: plan.compression.to_string(),
            partitioned: plan.partitioned,
            rows: files.iter().map(|f| f.rows).sum(),
            files,
        };
        info!(
            destination = %report.destination.display(),
            format = %report.format,
            rows = report.rows,
            files = report.files.len(),
            "export finished"
        );
        Ok(report)
    }

    fn validate_file_stem(&self) -> Result<()> {
        let stem = &self.opts.file_stem;
        if stem.is_empty() || stem.contains(['/', '\\']) || stem == "." || stem == ".." {
            return Err(ExportError::Validation(format!(
                "file stem {:?} must be a plain file name",
                stem
            )));
        }
        Ok(())
    }
}

/// Export with default options (no overwrite).
pub fn export(table: &Table, destination: impl AsRef<Path>, format: &FormatDescriptor) -> Result<ExportReport> {
    TableExporter::default().export(table, destination.as_ref(), format)
}

fn ensure_supported(format: &FormatDescriptor) -> Result<()> {
    match format {
        FormatDescriptor::Columnar { .. } if !tabex_io::COLUMNAR_ENABLED => Err(ExportError::UnsupportedFormat(
            format!("{} output requires the `columnar` feature", format.name()),
        )),
        FormatDescriptor::RowSerialized { .. } if !tabex_io::AVRO_ENABLED => Err(ExportError::UnsupportedFormat(
            format!("{} output requires the `avro` feature", format.name()),
        )),
        _ => Ok(()),
    }
}

/// Unpartitioned output gets the format extension when the caller gave none.
/// See [`ExportPlan::target`].
fn resolve_target(destination: &Path, format: &FormatDescriptor, partitioned: bool) -> PathBuf {
    if partitioned || destination.extension().is_some() {
        destination.to_path_buf()
    } else {
        destination.with_extension(format.extension())
    }
}

fn remove_existing(target: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(target)?;
    if meta.is_dir() {
        fs::remove_dir_all(target)?;
    } else {
        fs::remove_file(target)?;
    }
    Ok(())
}

fn resolve_encoding(table: &Table, payload: &[usize], format: &FormatDescriptor) -> Result<Encoding> {
    match format {
        FormatDescriptor::DelimitedText { .. } => Ok(Encoding::Delimited(DelimitedOptions::from_descriptor(format)?)),
        #[cfg(feature = "columnar")]
        FormatDescriptor::Columnar { layout, .. } => Ok(Encoding::Columnar {
            layout: *layout,
            schema: infer_columnar(&table.project(payload)),
            compression: format.compression()?,
        }),
        #[cfg(feature = "avro")]
        FormatDescriptor::RowSerialized { schema, .. } => {
            let payload_columns: Vec<String> = payload.iter().map(|&i| table.columns[i].clone()).collect();
            let schema = match schema {
                Some(declared) => {
                    declared.ensure_known(&table.columns)?;
                    // Check every declared column, partition keys included,
                    // so row numbers refer to the caller's table.
                    let declared_columns: Vec<String> = table
                        .columns
                        .iter()
                        .filter(|c| declared.index_of(c).is_some())
                        .cloned()
                        .collect();
                    let idx: Vec<usize> = declared_columns
                        .iter()
                        .filter_map(|c| table.index_of(c))
                        .collect();
                    declared
                        .project_to(&declared_columns)?
                        .check_table(&table.project(&idx), None)?;
                    declared.project_to(&payload_columns)?
                }
                None => {
                    let payload_table = table.project(payload);
                    let derived = derive_row_schema(&payload_table);
                    derived.check_table(&payload_table, None)?;
                    derived
                }
            };
            // Parse the Avro schema now so a bad schema fails before any write.
            writers::avro::to_avro_schema(&schema)?;
            Ok(Encoding::Row {
                schema,
                compression: format.compression()?,
            })
        }
        FormatDescriptor::NativeObjectDump { .. } => Ok(Encoding::Dump),
        #[allow(unreachable_patterns)]
        other => Err(ExportError::UnsupportedFormat(other.name().to_string())),
    }
}

fn write_unit(path: &Path, table: &Table, encoding: &Encoding) -> Result<()> {
    match encoding {
        Encoding::Delimited(opts) => {
            let mut w = writers::csv::CsvWriter::to_path(path, *opts)?;
            w.write_table(table)?;
            w.into_inner()?.flush()?;
        }
        #[cfg(feature = "columnar")]
        Encoding::Columnar { layout: ColumnarLayout::Feather, schema, compression } => {
            let mut w = writers::feather::FeatherWriter::to_path(path, schema, *compression)?;
            w.write_table(table)?;
            w.close()?;
        }
        #[cfg(feature = "columnar")]
        Encoding::Columnar { layout: ColumnarLayout::Parquet, schema, compression } => {
            let mut w = writers::parquet::ParquetWriter::to_path_with_options(
                path,
                schema,
                (*compression).try_into()?,
                None,
            )?;
            w.write_table(table)?;
            w.close()?;
        }
        #[cfg(feature = "avro")]
        Encoding::Row { schema, compression } => {
            writers::avro::write_table(path, table, schema, *compression)?;
        }
        Encoding::Dump => {
            writers::dump::write_table(path, table)?;
        }
    }
    Ok(())
}

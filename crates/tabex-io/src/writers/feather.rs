//! Feather (Arrow IPC file) writer.
//!
//! The IPC file carries the schema in its footer and compresses each buffer
//! with lz4 frame or zstd when asked to.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_ipc::writer::{FileWriter, IpcWriteOptions};
use arrow_ipc::CompressionType;
use arrow_schema::SchemaRef;
use tabex_core::{Compression, Schema, Table};

use crate::arrow_convert::{table_to_record_batch, to_arrow_schema};
use crate::error::{Error, Result};

fn ipc_compression(codec: Compression) -> Result<Option<CompressionType>> {
    match codec {
        Compression::Uncompressed => Ok(None),
        Compression::Lz4 => Ok(Some(CompressionType::LZ4_FRAME)),
        Compression::Zstd => Ok(Some(CompressionType::ZSTD)),
        other => Err(Error::Unsupported(format!("{} compression for feather", other))),
    }
}

pub struct FeatherWriter {
    writer: FileWriter<BufWriter<File>>,
    schema: SchemaRef,
}

impl FeatherWriter {
    pub fn to_path(path: &Path, schema: &Schema, compression: Compression) -> Result<Self> {
        let schema: SchemaRef = Arc::new(to_arrow_schema(schema));
        let options = IpcWriteOptions::default().try_with_compression(ipc_compression(compression)?)?;
        let file = File::create(path)?;
        let writer = FileWriter::try_new_with_options(BufWriter::new(file), &schema, options)?;
        Ok(Self { writer, schema })
    }

    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        Ok(())
    }

    /// Converts the table under the writer's schema and writes it as one batch.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        let batch = table_to_record_batch(table, Arc::clone(&self.schema))?;
        self.write_batch(&batch)
    }

    /// Write the footer and flush.
    pub fn close(mut self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

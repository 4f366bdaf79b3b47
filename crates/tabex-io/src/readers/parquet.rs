//! Parquet reader with batched reads of configurable size.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use tabex_core::{Schema, Table};

use crate::arrow_convert::{append_record_batch, from_arrow_schema};
use crate::error::Result;

pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Batched Parquet reader.
pub struct ParquetReader {
    reader: ParquetRecordBatchReader,
    schema: SchemaRef,
}

impl ParquetReader {
    /// Open `path` for batched reading of every column.
    pub fn from_path(path: &Path, batch_size: usize) -> Result<Self> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = Arc::clone(builder.schema());
        let reader = builder.with_batch_size(batch_size).build()?;
        Ok(Self { reader, schema })
    }

    /// Read the next batch of rows as a RecordBatch.
    ///
    /// Returns `None` when all rows have been read.
    pub fn next_record_batch(&mut self) -> Result<Option<RecordBatch>> {
        Ok(self.reader.next().transpose()?)
    }

    /// Arrow schema stored in the file.
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Drain the remaining batches into one `Table`.
    pub fn read_table(mut self) -> Result<Table> {
        let mut table = Table::new(self.schema.fields().iter().map(|f| f.name().clone()));
        while let Some(batch) = self.next_record_batch()? {
            append_record_batch(&mut table, &batch)?;
        }
        Ok(table)
    }
}

/// Read a whole Parquet file into a `Table`.
pub fn read_table(path: &Path) -> Result<Table> {
    ParquetReader::from_path(path, DEFAULT_BATCH_SIZE)?.read_table()
}

/// Read the schema stored in a Parquet file.
pub fn read_schema(path: &Path) -> Result<Schema> {
    let reader = ParquetReader::from_path(path, DEFAULT_BATCH_SIZE)?;
    from_arrow_schema(&reader.schema())
}

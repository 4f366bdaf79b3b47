//! Parquet writer with compression support.
//!
//! Supports:
//! - Writing a `Table` as Arrow RecordBatches to a Parquet file
//! - Compression codecs (SNAPPY, GZIP, ZSTD, LZ4, UNCOMPRESSED)
//! - Configurable row group size

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use tabex_core::{Compression as Codec, Schema, Table};

use crate::arrow_convert::{table_to_record_batch, to_arrow_schema};
use crate::error::{Error, Result};

/// Compression codec for Parquet files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParquetCompression {
    /// No compression
    Uncompressed,
    /// Snappy compression (fast, good compression)
    #[default]
    Snappy,
    /// GZIP compression (good compression ratio)
    Gzip,
    /// ZSTD compression (excellent compression ratio)
    Zstd,
    /// LZ4 compression (very fast)
    Lz4,
}

impl ParquetCompression {
    /// Convert to Parquet's Compression enum.
    fn to_parquet_compression(self) -> Compression {
        match self {
            ParquetCompression::Uncompressed => Compression::UNCOMPRESSED,
            ParquetCompression::Snappy => Compression::SNAPPY,
            ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
            ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
            ParquetCompression::Lz4 => Compression::LZ4_RAW,
        }
    }
}

impl TryFrom<Codec> for ParquetCompression {
    type Error = Error;

    fn try_from(codec: Codec) -> Result<Self> {
        match codec {
            Codec::Uncompressed => Ok(ParquetCompression::Uncompressed),
            Codec::Snappy => Ok(ParquetCompression::Snappy),
            Codec::Gzip => Ok(ParquetCompression::Gzip),
            Codec::Zstd => Ok(ParquetCompression::Zstd),
            Codec::Lz4 => Ok(ParquetCompression::Lz4),
            other => Err(Error::Unsupported(format!("{} compression for parquet", other))),
        }
    }
}

/// Default maximum rows per row group.
pub const DEFAULT_ROW_GROUP_ROWS: usize = 1024 * 1024;

/// Parquet writer with compression support.
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    schema: SchemaRef,
}

impl ParquetWriter {
    /// Create a new ParquetWriter with custom compression and row group size.
    ///
    /// # Arguments
    /// * `path` - Path to the Parquet file
    /// * `schema` - tabex schema; converted to Arrow
    /// * `compression` - Compression codec to use
    /// * `max_row_group_rows` - Optional row group size in rows
    pub fn to_path_with_options(
        path: &Path,
        schema: &Schema,
        compression: ParquetCompression,
        max_row_group_rows: Option<usize>,
    ) -> Result<Self> {
        let schema: SchemaRef = Arc::new(to_arrow_schema(schema));
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(compression.to_parquet_compression())
            .set_max_row_group_size(max_row_group_rows.unwrap_or(DEFAULT_ROW_GROUP_ROWS))
            .build();

        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(props))?;

        Ok(Self { writer, schema })
    }

    /// Write a RecordBatch to the Parquet file.
    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        Ok(())
    }

    /// Write a Table to the Parquet file.
    ///
    /// Converts the Table to a RecordBatch using the writer's schema.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        let record_batch = table_to_record_batch(table, Arc::clone(&self.schema))?;
        self.write_batch(&record_batch)
    }

    /// Close the writer and finalize the Parquet file.
    ///
    /// This consumes the writer and writes the file footer.
    pub fn close(self) -> Result<()> {
        self.writer.close()?;
        Ok(())
    }
}

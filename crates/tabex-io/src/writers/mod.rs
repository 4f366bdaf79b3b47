pub mod csv;
pub mod dump;

#[cfg(feature = "columnar")]
pub mod feather;
#[cfg(feature = "columnar")]
pub mod parquet;

#[cfg(feature = "avro")]
pub mod avro;

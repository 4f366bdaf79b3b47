use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "columnar")]
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "columnar")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[cfg(feature = "avro")]
    #[error("avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("corrupt input: {0}")]
    Corrupt(String),
}

impl Error {
    /// Prefix string-carrying variants with `context`.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let ctx = context.into();
        match self {
            Error::Schema(msg) => Error::Schema(format!("{}: {}", ctx, msg)),
            Error::Unsupported(msg) => Error::Unsupported(format!("{}: {}", ctx, msg)),
            Error::Corrupt(msg) => Error::Corrupt(format!("{}: {}", ctx, msg)),
            other => other,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Io(_) => vec![
                "Check output path and permissions".into(),
                "Verify disk space is available".into(),
            ],
            Error::Corrupt(_) => vec![
                "The file may be truncated or written by a different tool".into(),
            ],
            Error::Unsupported(what) => vec![format!("'{}' is not available in this build", what)],
            _ => vec![],
        }
    }
}

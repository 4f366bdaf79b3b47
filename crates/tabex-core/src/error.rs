use thiserror::Error;

use crate::schema::DataType;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed table or descriptor options.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("schema mismatch at row {row}, column '{column}': expected {expected}, found {found}")]
    SchemaMismatch {
        row: usize,
        column: String,
        expected: DataType,
        found: String,
    },

    #[error("empty partition value at row {row}, column '{column}'")]
    EmptyPartitionValue { row: usize, column: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Prefix the message with `context`. Structured variants keep their fields.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let ctx = context.into();
        match self {
            Error::Validation(msg) => Error::Validation(format!("{}: {}", ctx, msg)),
            Error::UnsupportedFormat(msg) => Error::UnsupportedFormat(format!("{}: {}", ctx, msg)),
            other => other,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Validation(msg) if msg.contains("column") => vec![
                "Check that the column name is spelled correctly".into(),
                "Verify every row has one value per column".into(),
            ],
            Error::SchemaMismatch { column, expected, .. } => vec![
                format!("Declare column '{}' with a type matching its values", column),
                format!("Or clean the offending values so they are {}", expected),
            ],
            Error::EmptyPartitionValue { column, .. } => vec![
                format!("Fill in missing '{}' values before partitioning", column),
                "Or partition by a column without nulls".into(),
            ],
            Error::UnsupportedFormat(_) => vec![
                "Check the compression codec name for the chosen format".into(),
                "Verify the build enables the `columnar` and `avro` features".into(),
            ],
            _ => vec![],
        }
    }
}

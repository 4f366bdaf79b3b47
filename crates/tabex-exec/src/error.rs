use std::path::PathBuf;

use thiserror::Error;

use tabex_core::DataType;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Malformed table or descriptor options.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("schema mismatch at row {row}, column '{column}': expected {expected}, found {found}")]
    SchemaMismatch {
        row: usize,
        column: String,
        expected: DataType,
        found: String,
    },

    #[error("empty partition value at row {row}, column '{column}'")]
    EmptyPartitionValue { row: usize, column: String },

    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure inside a format library that is not plain I/O.
    #[error("encode error: {0}")]
    Encode(String),
}

impl From<tabex_core::Error> for ExportError {
    fn from(e: tabex_core::Error) -> Self {
        use tabex_core::Error as E;
        match e {
            E::Validation(msg) => ExportError::Validation(msg),
            E::UnsupportedFormat(msg) => ExportError::UnsupportedFormat(msg),
            E::SchemaMismatch { row, column, expected, found } => ExportError::SchemaMismatch {
                row,
                column,
                expected,
                found,
            },
            E::EmptyPartitionValue { row, column } => ExportError::EmptyPartitionValue { row, column },
        }
    }
}

impl From<tabex_io::Error> for ExportError {
    fn from(e: tabex_io::Error) -> Self {
        match e {
            tabex_io::Error::Io(io) => ExportError::Io(io),
            tabex_io::Error::Unsupported(msg) => ExportError::UnsupportedFormat(msg),
            other => ExportError::Encode(other.to_string()),
        }
    }
}

impl ExportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let ctx = context.into();
        match self {
            ExportError::Validation(msg) => ExportError::Validation(format!("{}: {}", ctx, msg)),
            ExportError::UnsupportedFormat(msg) => {
                ExportError::UnsupportedFormat(format!("{}: {}", ctx, msg))
            }
            ExportError::Encode(msg) => ExportError::Encode(format!("{}: {}", ctx, msg)),
            ExportError::Io(io) => {
                ExportError::Io(std::io::Error::new(io.kind(), format!("{}: {}", ctx, io)))
            }
            other => other,
        }
    }

    /// True for failures detected before any byte was written.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, ExportError::Io(_) | ExportError::Encode(_))
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ExportError::SchemaMismatch { column, expected, .. } => vec![
                format!("Declare column '{}' with a type matching its values", column),
                format!("Or clean the offending values so they are {}", expected),
            ],
            ExportError::EmptyPartitionValue { column, .. } => vec![
                format!("Fill in missing '{}' values before partitioning", column),
                "Or partition by a column without nulls".into(),
            ],
            ExportError::DestinationExists(path) => vec![
                format!("Remove {} or choose another destination", path.display()),
                "Or set the overwrite option".into(),
            ],
            ExportError::UnsupportedFormat(_) => vec![
                "Check the compression codec name for the chosen format".into(),
                "Verify the build enables the `columnar` and `avro` features".into(),
            ],
            ExportError::Io(_) => vec![
                "Check output path and permissions".into(),
                "Verify disk space is available".into(),
            ],
            _ => vec![],
        }
    }
}

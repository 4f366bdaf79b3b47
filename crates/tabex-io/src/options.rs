//! Options shared by the delimited reader and writer.

use tabex_core::format::{parse_delimiter, Newline};
use tabex_core::FormatDescriptor;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedOptions {
    pub delimiter: u8,
    pub newline: Newline,
    pub has_headers: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            newline: Newline::Lf,
            has_headers: true,
        }
    }
}

impl DelimitedOptions {
    pub fn tab() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Options for a `DelimitedText` descriptor.
    pub fn from_descriptor(format: &FormatDescriptor) -> Result<Self> {
        match format {
            FormatDescriptor::DelimitedText { delimiter, newline, .. } => Ok(Self {
                delimiter: parse_delimiter(*delimiter).map_err(|e| Error::Schema(e.to_string()))?,
                newline: Newline::parse(newline).map_err(|e| Error::Schema(e.to_string()))?,
                has_headers: true,
            }),
            other => Err(Error::Unsupported(format!(
                "{} is not a delimited text format",
                other.name()
            ))),
        }
    }

    pub(crate) fn terminator(&self) -> csv::Terminator {
        match self.newline {
            Newline::Lf => csv::Terminator::Any(b'\n'),
            Newline::CrLf => csv::Terminator::CRLF,
            Newline::Byte(b) => csv::Terminator::Any(b),
        }
    }
}

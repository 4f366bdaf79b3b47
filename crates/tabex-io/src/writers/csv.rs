//! Delimited text writer from `Table`.
//!
//! Quoting follows the usual rule: a field containing the delimiter, a
//! line break, the terminator or a quote is wrapped in quotes and inner
//! quotes are doubled. Nulls are written as empty fields.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv as csv_crate;
use tabex_core::Table;

use crate::error::{Error, Result};
use crate::options::DelimitedOptions;

pub struct CsvWriter<W: Write> {
    wtr: csv_crate::Writer<W>,
    has_headers: bool,
    wrote_header: bool,
}

impl CsvWriter<BufWriter<File>> {
    pub fn to_path(path: &Path, opts: DelimitedOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::to_writer(BufWriter::new(file), opts))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn to_writer(writer: W, opts: DelimitedOptions) -> Self {
        let wtr = csv_crate::WriterBuilder::new()
            .delimiter(opts.delimiter)
            .terminator(opts.terminator())
            .quote(b'"')
            .double_quote(true)
            .quote_style(csv_crate::QuoteStyle::Necessary)
            .from_writer(writer);
        Self {
            wtr,
            has_headers: opts.has_headers,
            wrote_header: false,
        }
    }

    /// Write the header (once) and then every row of `table`.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        if self.has_headers && !self.wrote_header {
            self.wtr.write_record(&table.columns)?;
            self.wrote_header = true;
        }
        for row in &table.rows {
            self.wtr.write_record(row.iter().map(|v| v.to_text()))?;
        }
        self.wtr.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| Error::Io(std::io::Error::new(e.error().kind(), e.to_string())))
    }
}

//! Delimited text reader → `Table`.
//!
//! Caveats:
//! - Without a schema every non-empty cell is a `Str` and empty cells are `Null`.
//! - Empty strings and nulls are indistinguishable once written.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv as csv_crate;
use tabex_core::schema::{DataType, Schema};
use tabex_core::{Scalar, Table};

use crate::error::{Error, Result};
use crate::options::DelimitedOptions;

pub struct CsvReader<R: Read> {
    rdr: csv_crate::Reader<R>,
    columns: Vec<String>,
}

impl CsvReader<BufReader<File>> {
    pub fn from_path(path: &Path, opts: DelimitedOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), opts)
    }
}

impl<R: Read> CsvReader<R> {
    /// Open a reader. Headerless input gets `column_1..N` names, with N
    /// taken from the width of the first record.
    pub fn from_reader(reader: R, opts: DelimitedOptions) -> Result<Self> {
        let mut rdr = Self::builder(opts).from_reader(reader);
        // Without headers this peeks the first record; it is still read as data.
        let first = rdr.headers()?;
        let columns = if opts.has_headers {
            first.iter().map(str::to_string).collect()
        } else {
            generated_columns(first.len())
        };
        Ok(Self { rdr, columns })
    }

    fn builder(opts: DelimitedOptions) -> csv_crate::ReaderBuilder {
        let mut builder = csv_crate::ReaderBuilder::new();
        builder
            .delimiter(opts.delimiter)
            .terminator(opts.terminator())
            .has_headers(opts.has_headers)
            .flexible(false);
        builder
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Read every remaining record. Cells are strings; empty cells are nulls.
    pub fn read_table(&mut self) -> Result<Table> {
        self.read_with(|_, cell| Ok(text_cell(cell)))
    }

    /// Read every remaining record, typing cells per `schema`.
    ///
    /// `schema` must name the same columns in the same order as the header.
    pub fn read_table_with_schema(&mut self, schema: &Schema) -> Result<Table> {
        let declared: Vec<&str> = schema.names().collect();
        if declared != self.columns.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(Error::Schema(format!(
                "schema columns {:?} do not match header {:?}",
                declared, self.columns
            )));
        }
        let types: Vec<DataType> = schema.fields.iter().map(|f| f.data_type).collect();
        self.read_with(|idx, cell| typed_cell(cell, types[idx]))
    }

    /// Read every remaining record, parsing each cell into the narrowest scalar.
    pub fn read_table_inferred(&mut self) -> Result<Table> {
        self.read_with(|_, cell| Ok(Scalar::parse_text(cell)))
    }

    fn read_with(&mut self, mut cell: impl FnMut(usize, &str) -> Result<Scalar>) -> Result<Table> {
        let mut table = Table::new(self.columns.clone());
        for rec in self.rdr.records() {
            let rec = rec?;
            let row = rec
                .iter()
                .enumerate()
                .map(|(i, s)| cell(i, s))
                .collect::<Result<Vec<_>>>()?;
            table
                .push_row(row)
                .map_err(|e| Error::Schema(e.to_string()))?;
        }
        Ok(table)
    }
}

/// `column_1`, `column_2`, ... for headerless input.
pub fn generated_columns(width: usize) -> Vec<String> {
    (1..=width).map(|i| format!("column_{}", i)).collect()
}

fn text_cell(cell: &str) -> Scalar {
    if cell.is_empty() {
        Scalar::Null
    } else {
        Scalar::Str(cell.to_string())
    }
}

fn typed_cell(cell: &str, data_type: DataType) -> Result<Scalar> {
    if cell.is_empty() {
        return Ok(Scalar::Null);
    }
    let bad = || Error::Schema(format!("cannot read {:?} as {}", cell, data_type));
    match data_type {
        DataType::Utf8 => Ok(Scalar::Str(cell.to_string())),
        DataType::Int64 => cell.parse().map(Scalar::I64).map_err(|_| bad()),
        DataType::Float64 => cell.parse().map(Scalar::F64).map_err(|_| bad()),
        DataType::Boolean => cell.parse().map(Scalar::Bool).map_err(|_| bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabex_core::Field;

    #[test]
    fn test_reads_quoted_fields() {
        let data = "City,State\n\"Los Angeles, CA\",California\nWichita,\n";
        let mut rdr = CsvReader::from_reader(data.as_bytes(), DelimitedOptions::default()).unwrap();
        let table = rdr.read_table().unwrap();
        assert_eq!(table.columns, vec!["City", "State"]);
        assert_eq!(table.rows[0][0], Scalar::Str("Los Angeles, CA".into()));
        assert_eq!(table.rows[1][1], Scalar::Null);
    }

    #[test]
    fn test_typed_read() {
        let data = "id\tscore\tok\n1\t2.5\ttrue\n";
        let mut rdr = CsvReader::from_reader(data.as_bytes(), DelimitedOptions::tab()).unwrap();
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("score", DataType::Float64, true),
            Field::new("ok", DataType::Boolean, true),
        ]);
        let table = rdr.read_table_with_schema(&schema).unwrap();
        assert_eq!(
            table.rows[0],
            vec![Scalar::I64(1), Scalar::F64(2.5), Scalar::Bool(true)]
        );
    }

    #[test]
    fn test_typed_read_rejects_bad_cell() {
        let data = "id\nabc\n";
        let mut rdr = CsvReader::from_reader(data.as_bytes(), DelimitedOptions::default()).unwrap();
        let schema = Schema::new(vec![Field::new("id", DataType::Int64, true)]);
        assert!(rdr.read_table_with_schema(&schema).is_err());
    }

    #[test]
    fn test_ragged_input_is_an_error() {
        let data = "a,b\n1\n";
        let mut rdr = CsvReader::from_reader(data.as_bytes(), DelimitedOptions::default()).unwrap();
        assert!(rdr.read_table().is_err());
    }

    #[test]
    fn test_headerless_input_gets_generated_names() {
        let data = "Wichita,Kansas\nTopeka,Kansas\n";
        let opts = DelimitedOptions {
            has_headers: false,
            ..DelimitedOptions::default()
        };
        let mut rdr = CsvReader::from_reader(data.as_bytes(), opts).unwrap();
        assert_eq!(rdr.columns(), &["column_1", "column_2"]);
        let table = rdr.read_table().unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows[0][0], Scalar::Str("Wichita".into()));
    }

    #[test]
    fn test_inferred_read() {
        let data = "a,b,c\n1,2.5,x\n";
        let mut rdr = CsvReader::from_reader(data.as_bytes(), DelimitedOptions::default()).unwrap();
        let table = rdr.read_table_inferred().unwrap();
        assert_eq!(table.rows[0], vec![Scalar::I64(1), Scalar::F64(2.5), "x".into()]);
    }
}

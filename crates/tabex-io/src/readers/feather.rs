//! Feather (Arrow IPC file) reader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow_ipc::reader::FileReader;
use tabex_core::{Schema, Table};

use crate::arrow_convert::{append_record_batch, from_arrow_schema};
use crate::error::Result;

/// Read a whole Feather file into a `Table`.
pub fn read_table(path: &Path) -> Result<Table> {
    Ok(read_with_schema(path)?.1)
}

/// Read a whole Feather file, returning its schema alongside the rows.
pub fn read_with_schema(path: &Path) -> Result<(Schema, Table)> {
    let file = BufReader::new(File::open(path)?);
    let reader = FileReader::try_new(file, None)?;
    let arrow_schema = reader.schema();
    let schema = from_arrow_schema(&arrow_schema)?;
    let mut table = Table::new(schema.names());
    for batch in reader {
        append_record_batch(&mut table, &batch?)?;
    }
    Ok((schema, table))
}

//! Native object dump.
//!
//! Layout is implementation-defined and not meant for other tools:
//!
//! ```text
//! magic "TABEXDMP" | version u8 | blake3(body) 32 bytes | body
//! ```
//!
//! The body is a serde encoding of the table. Floats are stored by bit
//! pattern so NaN and infinities survive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tabex_core::{Scalar, Table};

use crate::error::Result;

pub const MAGIC: &[u8; 8] = b"TABEXDMP";
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = MAGIC.len() + 1 + 32;

#[derive(Serialize, Deserialize)]
pub(crate) enum Cell {
    N,
    B(bool),
    I(i64),
    F(u64),
    S(String),
}

impl From<&Scalar> for Cell {
    fn from(v: &Scalar) -> Self {
        match v {
            Scalar::Null => Cell::N,
            Scalar::Bool(b) => Cell::B(*b),
            Scalar::I64(i) => Cell::I(*i),
            Scalar::F64(f) => Cell::F(f.to_bits()),
            Scalar::Str(s) => Cell::S(s.clone()),
        }
    }
}

impl From<Cell> for Scalar {
    fn from(c: Cell) -> Self {
        match c {
            Cell::N => Scalar::Null,
            Cell::B(b) => Scalar::Bool(b),
            Cell::I(i) => Scalar::I64(i),
            Cell::F(bits) => Scalar::F64(f64::from_bits(bits)),
            Cell::S(s) => Scalar::Str(s),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct Body {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Encode `table` into the dump byte layout.
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    let body = Body {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect(),
    };
    let body = serde_json::to_vec(&body)?;
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(blake3::hash(&body).as_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Write `table` to `path` and return the number of bytes written.
pub fn write_table(path: &Path, table: &Table) -> Result<u64> {
    let bytes = encode(table)?;
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(&bytes)?;
    w.flush()?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote dump");
    Ok(bytes.len() as u64)
}

//! Native dump reader. Only reads dumps written by this crate's version.

use std::fs;
use std::path::Path;

use tabex_core::{Scalar, Table};

use crate::error::{Error, Result};
use crate::writers::dump::{Body, HEADER_LEN, MAGIC, VERSION};

/// Decode dump bytes, verifying magic, version and checksum.
pub fn decode(bytes: &[u8]) -> Result<Table> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Corrupt("not a tabex dump".into()));
    }
    let version = bytes[MAGIC.len()];
    if version != VERSION {
        return Err(Error::Unsupported(format!("dump version {}", version)));
    }
    let checksum = &bytes[MAGIC.len() + 1..HEADER_LEN];
    let body = &bytes[HEADER_LEN..];
    if blake3::hash(body).as_bytes() != checksum {
        return Err(Error::Corrupt("dump checksum mismatch".into()));
    }
    let body: Body = serde_json::from_slice(body)?;
    let rows = body
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(Scalar::from).collect())
        .collect();
    Table::try_new(body.columns, rows).map_err(|e| Error::Corrupt(e.to_string()))
}

pub fn read_table(path: &Path) -> Result<Table> {
    decode(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::dump::encode;

    #[test]
    fn test_dump_preserves_special_floats() {
        let table = Table::try_new(
            ["x", "y"],
            vec![
                vec![Scalar::F64(f64::INFINITY), Scalar::Null],
                vec![Scalar::F64(-0.5), Scalar::Bool(true)],
            ],
        )
        .unwrap();
        let back = decode(&encode(&table).unwrap()).unwrap();
        assert_eq!(back, table);

        let nan = Table::try_new(["x"], vec![vec![Scalar::F64(f64::NAN)]]).unwrap();
        match &decode(&encode(&nan).unwrap()).unwrap().rows[0][0] {
            Scalar::F64(f) => assert!(f.is_nan()),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_corrupted_dump_is_rejected() {
        let table = Table::try_new(["x"], vec![vec![Scalar::I64(1)]]).unwrap();
        let mut bytes = encode(&table).unwrap();
        let last = bytes.len() - 2;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode(&bytes), Err(Error::Corrupt(_))));
        assert!(matches!(decode(b"nope"), Err(Error::Corrupt(_))));
    }
}

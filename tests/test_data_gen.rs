//! Test data generation utilities for the tabex test suite

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tabex::{Scalar, Table};
use tempfile::TempDir;

/// Three cities across two states; one city name needs CSV quoting.
pub fn cities() -> Table {
    Table::try_new(
        ["City", "State", "Population"],
        vec![
            vec!["Wichita".into(), "Kansas".into(), Scalar::I64(397_532)],
            vec!["Los Angeles, CA".into(), "California".into(), Scalar::I64(3_898_747)],
            vec!["Topeka".into(), "Kansas".into(), Scalar::I64(126_587)],
        ],
    )
    .expect("valid cities table")
}

/// One column per scalar kind, with a null in every column.
pub fn mixed_types(rows: usize) -> Table {
    let mut table = Table::new(["id", "name", "score", "active"]);
    for i in 0..rows {
        let row = if i % 4 == 3 {
            vec![Scalar::I64(i as i64), Scalar::Null, Scalar::Null, Scalar::Null]
        } else {
            vec![
                Scalar::I64(i as i64),
                Scalar::Str(format!("name_{}", i)),
                Scalar::F64(i as f64 * 0.5),
                Scalar::Bool(i % 2 == 0),
            ]
        };
        table.push_row(row).expect("row width matches");
    }
    table
}

/// A table with `rows` rows spread over `groups` values of column `group`.
pub fn generate_grouped_table(rows: usize, groups: usize) -> Table {
    let mut table = Table::new(["group", "id", "value"]);
    for i in 0..rows {
        table
            .push_row(vec![
                Scalar::Str(format!("g{}", i % groups)),
                Scalar::I64(i as i64),
                Scalar::Str(format!("value_{}", i)),
            ])
            .expect("row width matches");
    }
    table
}

pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Every regular file under `root`, sorted, relative to `root`.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                out.push(path.strip_prefix(root).expect("under root").to_path_buf());
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

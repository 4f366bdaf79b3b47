//! Hive-style partitioning: `col=value/col=value/...`.
//!
//! Grouping keeps the first-seen order of keys and happens completely
//! before anything is written.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Scalar, Table};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionPlan {
    pub columns: Vec<String>,
}

/// One output unit: the rows sharing a partition key, minus the key columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionGroup {
    /// `(column, value text)` per partition level, outermost first.
    pub key: Vec<(String, String)>,
    /// Row index in the source table for every payload row.
    pub row_ids: Vec<usize>,
    pub table: Table,
}

impl PartitionGroup {
    /// The whole table as a single group with an empty key.
    pub fn whole(table: &Table) -> Self {
        Self {
            key: Vec::new(),
            row_ids: (0..table.num_rows()).collect(),
            table: table.clone(),
        }
    }

    /// Relative directory for this group (empty for an unpartitioned group).
    pub fn relative_dir(&self) -> PathBuf {
        self.key
            .iter()
            .map(|(col, val)| encode_segment(col, val))
            .collect()
    }

    /// `State=Kansas/City=Wichita`, or `None` when unpartitioned.
    pub fn label(&self) -> Option<String> {
        if self.key.is_empty() {
            return None;
        }
        Some(
            self.key
                .iter()
                .map(|(col, val)| encode_segment(col, val))
                .collect::<Vec<_>>()
                .join("/"),
        )
    }
}

impl PartitionPlan {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve plan columns to table indices.
    ///
    /// Fails on unknown or repeated columns, and when the plan would leave
    /// no payload columns.
    pub fn resolve(&self, table: &Table) -> Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let idx = table.index_of(col).ok_or_else(|| {
                Error::Validation(format!("partition column '{}' is not a table column", col))
            })?;
            if indices.contains(&idx) {
                return Err(Error::Validation(format!("partition column '{}' is listed twice", col)));
            }
            indices.push(idx);
        }
        if indices.len() == table.num_columns() {
            return Err(Error::Validation(
                "partitioning by every column leaves no payload columns".into(),
            ));
        }
        Ok(indices)
    }

    /// Group `table` rows by partition key.
    ///
    /// Null or empty key values fail with `EmptyPartitionValue`; the check
    /// covers every row before any group is returned.
    pub fn split(&self, table: &Table) -> Result<Vec<PartitionGroup>> {
        let key_idx = self.resolve(table)?;
        let payload_idx: Vec<usize> = (0..table.num_columns())
            .filter(|i| !key_idx.contains(i))
            .collect();
        let payload_columns: Vec<String> = payload_idx.iter().map(|&i| table.columns[i].clone()).collect();

        let mut groups: Vec<PartitionGroup> = Vec::new();
        let mut by_key: HashMap<Vec<String>, usize> = HashMap::new();

        for (row_idx, row) in table.rows.iter().enumerate() {
            let mut values = Vec::with_capacity(key_idx.len());
            for &k in &key_idx {
                let text = match &row[k] {
                    Scalar::Null => None,
                    v => Some(v.to_text()).filter(|t| !t.is_empty()),
                };
                let text = text.ok_or_else(|| Error::EmptyPartitionValue {
                    row: row_idx,
                    column: table.columns[k].clone(),
                })?;
                values.push(text);
            }

            let slot = match by_key.get(&values) {
                Some(&slot) => slot,
                None => {
                    let key = key_idx
                        .iter()
                        .zip(&values)
                        .map(|(&k, v)| (table.columns[k].clone(), v.clone()))
                        .collect();
                    groups.push(PartitionGroup {
                        key,
                        row_ids: Vec::new(),
                        table: Table::new(payload_columns.clone()),
                    });
                    by_key.insert(values, groups.len() - 1);
                    groups.len() - 1
                }
            };
            let group = &mut groups[slot];
            group.row_ids.push(row_idx);
            group
                .table
                .rows
                .push(payload_idx.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(groups)
    }
}

/// Characters escaped in partition path segments (Hive's set).
fn needs_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
        )
}

fn escape_path_text(s: &str) -> String {
    if s == "." || s == ".." {
        return s.replace('.', "%2E");
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if needs_escape(c) {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", b));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `column=value` with both sides escaped for use as a directory name.
pub fn encode_segment(column: &str, value: &str) -> String {
    format!("{}={}", escape_path_text(column), escape_path_text(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Table {
        Table::try_new(
            ["City", "State", "Population"],
            vec![
                vec!["Wichita".into(), "Kansas".into(), Scalar::I64(397_532)],
                vec!["Los Angeles, CA".into(), "California".into(), Scalar::I64(3_898_747)],
                vec!["Topeka".into(), "Kansas".into(), Scalar::I64(126_587)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_split_groups_in_first_seen_order() {
        let groups = PartitionPlan::new(["State"]).split(&cities()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, vec![("State".to_string(), "Kansas".to_string())]);
        assert_eq!(groups[0].row_ids, vec![0, 2]);
        assert_eq!(groups[1].key[0].1, "California");
        for g in &groups {
            assert_eq!(g.table.columns, vec!["City", "Population"]);
        }
    }

    #[test]
    fn test_split_nests_in_plan_order() {
        let groups = PartitionPlan::new(["State", "City"]).split(&cities()).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(
            groups[0].relative_dir(),
            PathBuf::from("State=Kansas").join("City=Wichita")
        );
        assert_eq!(groups[0].table.columns, vec!["Population"]);
    }

    #[test]
    fn test_null_or_empty_key_fails() {
        let mut t = cities();
        t.rows[2][1] = Scalar::Null;
        match PartitionPlan::new(["State"]).split(&t).unwrap_err() {
            Error::EmptyPartitionValue { row, column } => {
                assert_eq!(row, 2);
                assert_eq!(column, "State");
            }
            other => panic!("unexpected error: {other}"),
        }
        t.rows[2][1] = Scalar::Str(String::new());
        assert!(PartitionPlan::new(["State"]).split(&t).is_err());
    }

    #[test]
    fn test_resolve_rejects_bad_plans() {
        let t = cities();
        assert!(PartitionPlan::new(["Country"]).resolve(&t).is_err());
        assert!(PartitionPlan::new(["State", "State"]).resolve(&t).is_err());
        assert!(PartitionPlan::new(["City", "State", "Population"]).resolve(&t).is_err());
    }

    #[test]
    fn test_encode_segment_escapes_path_characters() {
        assert_eq!(encode_segment("State", "Kansas"), "State=Kansas");
        assert_eq!(encode_segment("path", "a/b"), "path=a%2Fb");
        assert_eq!(encode_segment("k", "x=y"), "k=x%3Dy");
        assert_eq!(encode_segment("k", ".."), "k=%2E%2E");
        assert_eq!(encode_segment("City", "Los Angeles, CA"), "City=Los Angeles, CA");
    }
}

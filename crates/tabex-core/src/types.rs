//! Row-oriented table and its scalar values.
//!
//! Unlike a columnar batch, `Table` keeps rows as callers usually build them
//! (one `Vec<Scalar>` per record). Encoders that want columns transpose on
//! the way out.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Name of the runtime type, as used in mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::I64(_) => "integer",
            Scalar::F64(_) => "float",
            Scalar::Str(_) => "string",
        }
    }

    /// Textual rendering used by delimited text and partition paths.
    ///
    /// Nulls render as the empty string. Integral floats keep a trailing
    /// `.0` so they read back as floats.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::I64(i) => i.to_string(),
            Scalar::F64(f) => {
                let s = f.to_string();
                if f.is_finite() && !s.contains('.') {
                    format!("{}.0", s)
                } else {
                    s
                }
            }
            Scalar::Str(s) => s.clone(),
        }
    }

    /// Parse a text cell into the narrowest scalar: empty → `Null`, then
    /// integer, then finite float, else string.
    pub fn parse_text(s: &str) -> Scalar {
        if s.is_empty() {
            return Scalar::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Scalar::I64(i);
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Scalar::F64(f),
            _ => Scalar::Str(s.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Str(s) => write!(f, "{:?}", s),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::I64(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::F64(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// In-memory table: unique column names plus positionally aligned rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Empty table with the given header.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build and validate in one step.
    pub fn try_new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Scalar>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns);
        table.rows = rows;
        table.validate()?;
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Validation(format!(
                "row {} has {} values but table has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Scalar> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Check the shape invariants: at least one column, non-empty unique
    /// names, and every row as wide as the header.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::Validation("table has no columns".into()));
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for (idx, name) in self.columns.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::Validation(format!("column {} has an empty name", idx)));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Validation(format!("duplicate column name '{}'", name)));
            }
        }
        for (row_idx, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(Error::Validation(format!(
                    "row {} has {} values but table has {} columns",
                    row_idx,
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    /// Keep only the columns at `keep`, in that order.
    pub fn project(&self, keep: &[usize]) -> Table {
        Table {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let table = Table {
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec![Scalar::I64(1), Scalar::I64(2)], vec![Scalar::I64(3)]],
        };
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 values"));
    }

    #[test]
    fn test_validate_rejects_duplicate_and_missing_columns() {
        assert!(Table::new(Vec::<String>::new()).validate().is_err());
        let dup = Table::new(["a", "a"]).validate().unwrap_err();
        assert!(dup.to_string().contains("duplicate column name 'a'"));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(Scalar::parse_text(""), Scalar::Null);
        assert_eq!(Scalar::parse_text("42"), Scalar::I64(42));
        assert_eq!(Scalar::parse_text("2.5"), Scalar::F64(2.5));
        assert_eq!(Scalar::parse_text("NaN"), Scalar::Str("NaN".into()));
        assert_eq!(Scalar::parse_text("Kansas"), Scalar::Str("Kansas".into()));
    }

    #[test]
    fn test_to_text_keeps_float_marker() {
        assert_eq!(Scalar::F64(3.0).to_text(), "3.0");
        assert_eq!(Scalar::F64(2.5).to_text(), "2.5");
        assert_eq!(Scalar::Null.to_text(), "");
        assert_eq!(Scalar::parse_text(&Scalar::F64(3.0).to_text()), Scalar::F64(3.0));
    }

    #[test]
    fn test_project() {
        let table = Table::try_new(
            ["City", "State", "Pop"],
            vec![vec!["Wichita".into(), "Kansas".into(), Scalar::I64(397_532)]],
        )
        .unwrap();
        let projected = table.project(&[0, 2]);
        assert_eq!(projected.columns, vec!["City", "Pop"]);
        assert_eq!(projected.rows[0], vec![Scalar::from("Wichita"), Scalar::I64(397_532)]);
    }
}

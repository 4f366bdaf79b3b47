//! Logical schema types. Pure data; no Arrow or Avro dependency here.
//!
//! Two ways to get a `Schema` for a table:
//! - [`infer_columnar`]: text-aware inference for columnar layouts (a `"42"`
//!   string counts as an integer).
//! - [`derive_row_schema`]: runtime-type derivation for row-serialized
//!   output, which then checks every value with [`Schema::check_table`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Scalar, Table};

/// Largest integer magnitude a `Float64` column accepts without rounding.
pub const MAX_EXACT_F64_INT: i64 = 1 << 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "boolean", alias = "bool", alias = "Boolean")]
    Boolean,
    #[serde(rename = "integer", alias = "int64", alias = "long", alias = "Int64")]
    Int64,
    #[serde(rename = "float", alias = "float64", alias = "double", alias = "Float64")]
    Float64,
    #[serde(rename = "string", alias = "utf8", alias = "Utf8")]
    Utf8,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Int64 => "integer",
            DataType::Float64 => "float",
            DataType::Utf8 => "string",
        }
    }

    /// Whether `value` may be stored under this type without coercion.
    pub fn accepts(&self, value: &Scalar) -> bool {
        match (self, value) {
            (_, Scalar::Null) => true,
            (DataType::Boolean, Scalar::Bool(_)) => true,
            (DataType::Int64, Scalar::I64(_)) => true,
            (DataType::Float64, Scalar::F64(_)) => true,
            (DataType::Float64, Scalar::I64(i)) => i.unsigned_abs() <= MAX_EXACT_F64_INT as u64,
            (DataType::Utf8, Scalar::Str(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(DataType::Boolean),
            "integer" | "int" | "int64" | "long" => Ok(DataType::Int64),
            "float" | "float64" | "double" => Ok(DataType::Float64),
            "string" | "utf8" | "str" => Ok(DataType::Utf8),
            other => Err(Error::Validation(format!("unknown data type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Reorder and narrow this schema to exactly `columns`.
    ///
    /// Every column needs a field. Fields naming columns outside `columns`
    /// are dropped here; callers that care about strays check with
    /// [`Schema::ensure_known`] first.
    pub fn project_to(&self, columns: &[String]) -> Result<Schema> {
        let fields = columns
            .iter()
            .map(|col| {
                self.fields
                    .iter()
                    .find(|f| &f.name == col)
                    .cloned()
                    .ok_or_else(|| {
                        Error::Validation(format!("column '{}' is missing from the declared schema", col))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema { fields })
    }

    /// Fail if the schema declares a field that is not one of `columns`.
    pub fn ensure_known(&self, columns: &[String]) -> Result<()> {
        for f in &self.fields {
            if !columns.contains(&f.name) {
                return Err(Error::Validation(format!(
                    "declared schema has column '{}' which is not in the table",
                    f.name
                )));
            }
        }
        Ok(())
    }

    /// Check every value of `table` against the field in the same position.
    ///
    /// `row_ids` maps local row positions back to the caller's numbering
    /// (partition groups keep the original table's row index); `None` means
    /// identity.
    pub fn check_table(&self, table: &Table, row_ids: Option<&[usize]>) -> Result<()> {
        if self.fields.len() != table.num_columns() {
            return Err(Error::Validation(format!(
                "schema has {} fields but table has {} columns",
                self.fields.len(),
                table.num_columns()
            )));
        }
        for (local, row) in table.rows.iter().enumerate() {
            let row_idx = row_ids.map_or(local, |ids| ids[local]);
            for (field, value) in self.fields.iter().zip(row) {
                let ok = if value.is_null() {
                    field.nullable
                } else {
                    field.data_type.accepts(value)
                };
                if !ok {
                    return Err(Error::SchemaMismatch {
                        row: row_idx,
                        column: field.name.clone(),
                        expected: field.data_type,
                        found: describe(value),
                    });
                }
            }
        }
        Ok(())
    }
}

fn describe(value: &Scalar) -> String {
    match value {
        Scalar::Null => "null".into(),
        other => format!("{} {}", other.type_name(), other),
    }
}

/// Infer a columnar schema for `table`.
///
/// Per column, over non-null values:
/// - every value an integer (or integer text) → `Int64`
/// - every value numeric, at least one fractional or a float scalar → `Float64`
/// - every value a boolean scalar → `Boolean`
/// - anything else, including all-null and mixed columns → `Utf8`
pub fn infer_columnar(table: &Table) -> Schema {
    let fields = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let (data_type, nullable) = infer_column(table.column_values(idx));
            Field::new(name.clone(), data_type, nullable)
        })
        .collect();
    Schema { fields }
}

#[derive(Clone, Copy, PartialEq)]
enum Kind {
    Int,
    Float,
    Bool,
    Text,
}

fn classify(value: &Scalar) -> Option<Kind> {
    match value {
        Scalar::Null => None,
        Scalar::Bool(_) => Some(Kind::Bool),
        Scalar::I64(_) => Some(Kind::Int),
        Scalar::F64(_) => Some(Kind::Float),
        Scalar::Str(s) => {
            if s.parse::<i64>().is_ok() {
                Some(Kind::Int)
            } else if s.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                Some(Kind::Float)
            } else {
                Some(Kind::Text)
            }
        }
    }
}

fn infer_column<'a>(values: impl Iterator<Item = &'a Scalar>) -> (DataType, bool) {
    let mut nullable = false;
    let mut seen_any = false;
    let (mut all_int, mut all_num, mut all_bool) = (true, true, true);
    for v in values {
        let Some(kind) = classify(v) else {
            nullable = true;
            continue;
        };
        seen_any = true;
        all_int &= kind == Kind::Int;
        all_num &= matches!(kind, Kind::Int | Kind::Float);
        all_bool &= kind == Kind::Bool;
    }
    let data_type = if !seen_any {
        DataType::Utf8
    } else if all_bool {
        DataType::Boolean
    } else if all_int {
        DataType::Int64
    } else if all_num {
        DataType::Float64
    } else {
        DataType::Utf8
    };
    (data_type, nullable)
}

/// Derive a row schema from runtime scalar types.
///
/// Integer and float scalars mixed in one column derive `Float64`; any other
/// mix derives `Utf8`, which [`Schema::check_table`] then rejects at the
/// first non-string value.
pub fn derive_row_schema(table: &Table) -> Schema {
    let fields = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut nullable = false;
            let mut current: Option<DataType> = None;
            for v in table.column_values(idx) {
                let dt = match v {
                    Scalar::Null => {
                        nullable = true;
                        continue;
                    }
                    Scalar::Bool(_) => DataType::Boolean,
                    Scalar::I64(_) => DataType::Int64,
                    Scalar::F64(_) => DataType::Float64,
                    Scalar::Str(_) => DataType::Utf8,
                };
                current = Some(match current {
                    None => dt,
                    Some(prev) if prev == dt => prev,
                    Some(DataType::Int64) if dt == DataType::Float64 => DataType::Float64,
                    Some(DataType::Float64) if dt == DataType::Int64 => DataType::Float64,
                    Some(_) => DataType::Utf8,
                });
            }
            Field::new(name.clone(), current.unwrap_or(DataType::Utf8), nullable)
        })
        .collect();
    Schema { fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_column(values: Vec<Scalar>) -> Table {
        Table::try_new(["v"], values.into_iter().map(|v| vec![v]).collect()).unwrap()
    }

    #[test]
    fn test_infer_integer_from_text_and_ints() {
        let t = one_column(vec!["1".into(), Scalar::I64(2), Scalar::Null]);
        let schema = infer_columnar(&t);
        assert_eq!(schema.fields[0].data_type, DataType::Int64);
        assert!(schema.fields[0].nullable);
    }

    #[test]
    fn test_infer_float_when_any_fractional() {
        let t = one_column(vec!["1".into(), "2.5".into()]);
        assert_eq!(infer_columnar(&t).fields[0].data_type, DataType::Float64);
        let t = one_column(vec![Scalar::F64(1.0), Scalar::I64(3)]);
        assert_eq!(infer_columnar(&t).fields[0].data_type, DataType::Float64);
    }

    #[test]
    fn test_infer_mixed_and_all_null_fall_back_to_string() {
        let t = one_column(vec![Scalar::I64(1), "Kansas".into()]);
        assert_eq!(infer_columnar(&t).fields[0].data_type, DataType::Utf8);
        let t = one_column(vec![Scalar::Bool(true), Scalar::I64(1)]);
        assert_eq!(infer_columnar(&t).fields[0].data_type, DataType::Utf8);
        let t = one_column(vec![Scalar::Null, Scalar::Null]);
        assert_eq!(infer_columnar(&t).fields[0].data_type, DataType::Utf8);
    }

    #[test]
    fn test_infer_boolean_scalars() {
        let t = one_column(vec![Scalar::Bool(true), Scalar::Null, Scalar::Bool(false)]);
        assert_eq!(infer_columnar(&t).fields[0].data_type, DataType::Boolean);
    }

    #[test]
    fn test_check_table_reports_row_and_column() {
        let t = Table::try_new(
            ["id", "name"],
            vec![
                vec![Scalar::I64(1), "a".into()],
                vec!["abc".into(), "b".into()],
            ],
        )
        .unwrap();
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, false),
        ]);
        match schema.check_table(&t, None).unwrap_err() {
            Error::SchemaMismatch { row, column, expected, found } => {
                assert_eq!(row, 1);
                assert_eq!(column, "id");
                assert_eq!(expected, DataType::Int64);
                assert!(found.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_table_uses_original_row_ids() {
        let t = one_column(vec![Scalar::Null]);
        let schema = Schema::new(vec![Field::new("v", DataType::Int64, false)]);
        match schema.check_table(&t, Some(&[7])).unwrap_err() {
            Error::SchemaMismatch { row, .. } => assert_eq!(row, 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_float_accepts_exact_integers_only() {
        assert!(DataType::Float64.accepts(&Scalar::I64(42)));
        assert!(!DataType::Float64.accepts(&Scalar::I64(i64::MAX)));
        assert!(!DataType::Int64.accepts(&Scalar::F64(1.0)));
    }

    #[test]
    fn test_derive_row_schema() {
        let t = Table::try_new(
            ["a", "b", "c"],
            vec![
                vec![Scalar::I64(1), Scalar::Bool(true), Scalar::I64(1)],
                vec![Scalar::F64(0.5), Scalar::Null, "x".into()],
            ],
        )
        .unwrap();
        let schema = derive_row_schema(&t);
        assert_eq!(schema.fields[0].data_type, DataType::Float64);
        assert_eq!(schema.fields[1].data_type, DataType::Boolean);
        assert!(schema.fields[1].nullable);
        assert_eq!(schema.fields[2].data_type, DataType::Utf8);
        assert!(schema.check_table(&t, None).is_err());
    }

    #[test]
    fn test_project_to_and_ensure_known() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Utf8, true),
        ]);
        let projected = schema.project_to(&["b".to_string()]).unwrap();
        assert_eq!(projected.fields.len(), 1);
        assert!(schema.project_to(&["z".to_string()]).is_err());
        assert!(schema.ensure_known(&["a".to_string()]).is_err());
    }

    #[test]
    fn test_schema_from_yaml() {
        let yaml = "- {name: id, type: integer, nullable: false}\n- {name: city, type: string}\n";
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.fields[0].data_type, DataType::Int64);
        assert!(!schema.fields[0].nullable);
        assert!(schema.fields[1].nullable);
    }
}

//! Arrow conversion utilities for the columnar containers.
//!
//! Converts between row-oriented `Table` and Arrow `RecordBatch`. Values are
//! coerced the same way inference classified them: integer text becomes
//! `Int64`, numeric text becomes `Float64`, anything becomes `Utf8`.

use std::sync::Arc;

use arrow_array::builder::{BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow_array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, RecordBatch, StringArray,
};
use arrow_schema::{DataType as ArrowDataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef};

use tabex_core::schema::{DataType, Field, Schema};
use tabex_core::{Scalar, Table};

use crate::error::{Error, Result};

/// Convert a tabex `DataType` to an Arrow `DataType`.
pub fn to_arrow_data_type(dtype: &DataType) -> ArrowDataType {
    match dtype {
        DataType::Boolean => ArrowDataType::Boolean,
        DataType::Int64 => ArrowDataType::Int64,
        DataType::Float64 => ArrowDataType::Float64,
        DataType::Utf8 => ArrowDataType::Utf8,
    }
}

/// Convert a tabex `Schema` to an Arrow `Schema`.
pub fn to_arrow_schema(schema: &Schema) -> ArrowSchema {
    let fields: Vec<ArrowField> = schema
        .fields
        .iter()
        .map(|field| {
            ArrowField::new(
                field.name.clone(),
                to_arrow_data_type(&field.data_type),
                field.nullable,
            )
        })
        .collect();
    ArrowSchema::new(fields)
}

/// Convert an Arrow `Schema` back to a tabex `Schema`.
pub fn from_arrow_schema(schema: &ArrowSchema) -> Result<Schema> {
    let fields = schema
        .fields()
        .iter()
        .map(|f| {
            let dt = match f.data_type() {
                ArrowDataType::Boolean => DataType::Boolean,
                ArrowDataType::Int32 | ArrowDataType::Int64 => DataType::Int64,
                ArrowDataType::Float32 | ArrowDataType::Float64 => DataType::Float64,
                ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => DataType::Utf8,
                other => {
                    return Err(Error::Unsupported(format!(
                        "arrow type {:?} in column '{}'",
                        other,
                        f.name()
                    )))
                }
            };
            Ok(Field::new(f.name().clone(), dt, f.is_nullable()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Schema::new(fields))
}

/// Convert a `Table` to a single Arrow `RecordBatch` under `schema`.
///
/// The schema must list the table's columns in order.
pub fn table_to_record_batch(table: &Table, schema: SchemaRef) -> Result<RecordBatch> {
    if schema.fields().len() != table.num_columns() {
        return Err(Error::Schema(format!(
            "Schema has {} fields but table has {} columns",
            schema.fields().len(),
            table.num_columns()
        )));
    }

    let mut arrays = Vec::with_capacity(table.num_columns());
    for (col_idx, field) in schema.fields().iter().enumerate() {
        if field.name() != &table.columns[col_idx] {
            return Err(Error::Schema(format!(
                "Column name mismatch at index {}: schema expects '{}' but table has '{}'",
                col_idx,
                field.name(),
                table.columns[col_idx]
            )));
        }
        let array = column_to_arrow_array(table, col_idx, field)?;
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn null_check(field: &ArrowField) -> Result<()> {
    if field.is_nullable() {
        Ok(())
    } else {
        Err(Error::Schema(format!("Null value in non-nullable column '{}'", field.name())))
    }
}

fn mismatch(field: &ArrowField, expected: &str, val: &Scalar) -> Error {
    Error::Schema(format!(
        "Type mismatch in column '{}': expected {}, got {:?}",
        field.name(),
        expected,
        val
    ))
}

fn column_to_arrow_array(table: &Table, col_idx: usize, field: &ArrowField) -> Result<ArrayRef> {
    let n = table.num_rows();
    let values = table.column_values(col_idx);
    match field.data_type() {
        ArrowDataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(n);
            for val in values {
                match val {
                    Scalar::Null => {
                        null_check(field)?;
                        builder.append_null();
                    }
                    Scalar::Bool(b) => builder.append_value(*b),
                    _ => return Err(mismatch(field, "Boolean", val)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(n);
            for val in values {
                match val {
                    Scalar::Null => {
                        null_check(field)?;
                        builder.append_null();
                    }
                    Scalar::I64(i) => builder.append_value(*i),
                    Scalar::Str(s) => {
                        let i = s.parse::<i64>().map_err(|_| mismatch(field, "Int64", val))?;
                        builder.append_value(i);
                    }
                    _ => return Err(mismatch(field, "Int64", val)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(n);
            for val in values {
                match val {
                    Scalar::Null => {
                        null_check(field)?;
                        builder.append_null();
                    }
                    Scalar::F64(f) => builder.append_value(*f),
                    Scalar::I64(i) => builder.append_value(*i as f64),
                    Scalar::Str(s) => {
                        let f = s.parse::<f64>().map_err(|_| mismatch(field, "Float64", val))?;
                        builder.append_value(f);
                    }
                    _ => return Err(mismatch(field, "Float64", val)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Utf8 => {
            let mut builder = StringBuilder::with_capacity(n, 0);
            for val in values {
                match val {
                    Scalar::Null => {
                        null_check(field)?;
                        builder.append_null();
                    }
                    Scalar::Str(s) => builder.append_value(s),
                    other => builder.append_value(other.to_text()),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        other => Err(Error::Unsupported(format!(
            "Unsupported Arrow data type for conversion: {:?}",
            other
        ))),
    }
}

/// Append the rows of `batch` to `table`. Column names must already match.
pub fn append_record_batch(table: &mut Table, batch: &RecordBatch) -> Result<()> {
    let num_rows = batch.num_rows();
    let columns: Vec<&ArrayRef> = batch.columns().iter().collect();
    if columns.len() != table.num_columns() {
        return Err(Error::Schema(format!(
            "batch has {} columns but table has {}",
            columns.len(),
            table.num_columns()
        )));
    }
    for row_idx in 0..num_rows {
        let row = columns
            .iter()
            .map(|array| {
                if array.is_null(row_idx) {
                    Ok(Scalar::Null)
                } else {
                    arrow_value_to_scalar(array, row_idx)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        table.rows.push(row);
    }
    Ok(())
}

/// Convert a sequence of batches sharing `schema` into one `Table`.
pub fn record_batches_to_table(
    schema: &ArrowSchema,
    batches: impl IntoIterator<Item = RecordBatch>,
) -> Result<Table> {
    let mut table = Table::new(schema.fields().iter().map(|f| f.name().clone()));
    for batch in batches {
        append_record_batch(&mut table, &batch)?;
    }
    Ok(table)
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, what: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Schema(format!("Failed to cast to {}", what)))
}

/// Convert a single Arrow array value to a Scalar.
fn arrow_value_to_scalar(array: &ArrayRef, row_idx: usize) -> Result<Scalar> {
    match array.data_type() {
        ArrowDataType::Boolean => Ok(Scalar::Bool(
            downcast::<BooleanArray>(array, "BooleanArray")?.value(row_idx),
        )),
        ArrowDataType::Int32 => Ok(Scalar::I64(
            downcast::<Int32Array>(array, "Int32Array")?.value(row_idx) as i64,
        )),
        ArrowDataType::Int64 => Ok(Scalar::I64(
            downcast::<Int64Array>(array, "Int64Array")?.value(row_idx),
        )),
        ArrowDataType::Float32 => Ok(Scalar::F64(
            downcast::<Float32Array>(array, "Float32Array")?.value(row_idx) as f64,
        )),
        ArrowDataType::Float64 => Ok(Scalar::F64(
            downcast::<Float64Array>(array, "Float64Array")?.value(row_idx),
        )),
        ArrowDataType::Utf8 => Ok(Scalar::Str(
            downcast::<StringArray>(array, "StringArray")?.value(row_idx).to_string(),
        )),
        ArrowDataType::LargeUtf8 => Ok(Scalar::Str(
            downcast::<LargeStringArray>(array, "LargeStringArray")?
                .value(row_idx)
                .to_string(),
        )),
        other => Err(Error::Unsupported(format!("Unsupported Arrow data type: {:?}", other))),
    }
}

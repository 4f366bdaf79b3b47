//! Avro object container reader.
//!
//! Uses only what the file carries: the writer schema from the header and
//! the `tabex.columns` metadata entry when present. Files from other
//! writers read fine; their field names become the column names.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use apache_avro::schema::RecordSchema;
use apache_avro::types::Value;
use apache_avro::{Reader, Schema as AvroSchema};
use tabex_core::schema::{DataType, Field, Schema};
use tabex_core::{Scalar, Table};

use crate::error::{Error, Result};
use crate::writers::avro::COLUMNS_METADATA_KEY;

fn from_avro_value(value: Value) -> Result<Scalar> {
    match value {
        Value::Union(_, inner) => from_avro_value(*inner),
        Value::Null => Ok(Scalar::Null),
        Value::Boolean(b) => Ok(Scalar::Bool(b)),
        Value::Int(i) => Ok(Scalar::I64(i as i64)),
        Value::Long(i) => Ok(Scalar::I64(i)),
        Value::Float(f) => Ok(Scalar::F64(f as f64)),
        Value::Double(f) => Ok(Scalar::F64(f)),
        Value::String(s) | Value::Enum(_, s) => Ok(Scalar::Str(s)),
        other => Err(Error::Unsupported(format!("avro value {:?}", other))),
    }
}

fn field_type(schema: &AvroSchema) -> Result<(DataType, bool)> {
    match schema {
        AvroSchema::Boolean => Ok((DataType::Boolean, false)),
        AvroSchema::Int | AvroSchema::Long => Ok((DataType::Int64, false)),
        AvroSchema::Float | AvroSchema::Double => Ok((DataType::Float64, false)),
        AvroSchema::String | AvroSchema::Enum(_) => Ok((DataType::Utf8, false)),
        AvroSchema::Union(union) => {
            let variants = union.variants();
            let non_null: Vec<&AvroSchema> = variants
                .iter()
                .filter(|v| !matches!(v, AvroSchema::Null))
                .collect();
            match non_null.as_slice() {
                [single] => Ok((field_type(single)?.0, variants.len() > 1)),
                _ => Err(Error::Unsupported(format!("avro union {:?}", schema))),
            }
        }
        other => Err(Error::Unsupported(format!("avro type {:?}", other))),
    }
}

fn record_schema(reader: &Reader<'_, BufReader<File>>) -> Result<RecordSchema> {
    match reader.writer_schema() {
        AvroSchema::Record(rec) => Ok(rec.clone()),
        other => Err(Error::Schema(format!("expected a record schema, found {:?}", other))),
    }
}

/// Read a whole Avro container into a `Table`, with the declared schema.
pub fn read_with_schema(path: &Path) -> Result<(Schema, Table)> {
    let file = BufReader::new(File::open(path)?);
    let reader = Reader::new(file)?;
    let record = record_schema(&reader)?;

    let columns: Vec<String> = match reader.user_metadata().get(COLUMNS_METADATA_KEY) {
        Some(raw) => serde_json::from_slice(raw)?,
        None => record.fields.iter().map(|f| f.name.clone()).collect(),
    };
    if columns.len() != record.fields.len() {
        return Err(Error::Corrupt(format!(
            "{} column names for {} avro fields",
            columns.len(),
            record.fields.len()
        )));
    }

    let fields = record
        .fields
        .iter()
        .zip(&columns)
        .map(|(f, name)| {
            let (dt, nullable) = field_type(&f.schema)?;
            Ok(Field::new(name.clone(), dt, nullable))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = Table::new(columns);
    for value in reader {
        let row = match value? {
            Value::Record(fields) => fields
                .into_iter()
                .map(|(_, v)| from_avro_value(v))
                .collect::<Result<Vec<_>>>()?,
            other => return Err(Error::Corrupt(format!("expected a record, found {:?}", other))),
        };
        table.push_row(row).map_err(|e| Error::Corrupt(e.to_string()))?;
    }
    Ok((Schema::new(fields), table))
}

/// Read a whole Avro container into a `Table`.
pub fn read_table(path: &Path) -> Result<Table> {
    Ok(read_with_schema(path)?.1)
}

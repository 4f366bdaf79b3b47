//! Avro object container writer.
//!
//! The container header embeds the schema JSON, so files are readable
//! without any side schema. Avro field names must be identifiers; the
//! original column names travel in the `tabex.columns` user metadata entry.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use apache_avro::types::Value;
use apache_avro::{Codec, Schema as AvroSchema, Writer};
use serde_json::json;
use tabex_core::{Compression, DataType, Scalar, Schema, Table};

use crate::error::{Error, Result};

/// User metadata key holding the original column names as a JSON array.
pub const COLUMNS_METADATA_KEY: &str = "tabex.columns";

const RECORD_NAME: &str = "row";
const RECORD_NAMESPACE: &str = "tabex";

fn avro_codec(codec: Compression) -> Result<Codec> {
    let name = match codec {
        Compression::Uncompressed => "null",
        Compression::Deflate => "deflate",
        Compression::Snappy => "snappy",
        other => return Err(Error::Unsupported(format!("{} compression for avro", other))),
    };
    name.parse::<Codec>()
        .map_err(|_| Error::Unsupported(format!("{} compression for avro", codec)))
}

fn avro_type(dt: DataType) -> &'static str {
    match dt {
        DataType::Boolean => "boolean",
        DataType::Int64 => "long",
        DataType::Float64 => "double",
        DataType::Utf8 => "string",
    }
}

/// Turn a column name into a valid, unique Avro field name.
pub fn avro_field_names(columns: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for (idx, col) in columns.iter().enumerate() {
        let mut name: String = col
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            name.insert(0, '_');
        }
        if out.contains(&name) {
            let base = name;
            let mut suffix = idx;
            loop {
                name = format!("{}_{}", base, suffix);
                if !out.contains(&name) && !columns.contains(&name) {
                    break;
                }
                suffix += 1;
            }
        }
        out.push(name);
    }
    out
}

/// Build the Avro record schema for `schema`. Nullable fields become
/// `["null", T]` unions defaulting to null.
pub fn to_avro_schema(schema: &Schema) -> Result<AvroSchema> {
    let columns: Vec<String> = schema.names().map(str::to_string).collect();
    let names = avro_field_names(&columns);
    let fields: Vec<serde_json::Value> = schema
        .fields
        .iter()
        .zip(&names)
        .map(|(f, name)| {
            let ty = avro_type(f.data_type);
            if f.nullable {
                json!({ "name": name, "type": ["null", ty], "default": null })
            } else {
                json!({ "name": name, "type": ty })
            }
        })
        .collect();
    let raw = json!({
        "type": "record",
        "name": RECORD_NAME,
        "namespace": RECORD_NAMESPACE,
        "fields": fields,
    });
    Ok(AvroSchema::parse(&raw)?)
}

fn to_avro_value(value: &Scalar, data_type: DataType, nullable: bool, column: &str) -> Result<Value> {
    let base = match (data_type, value) {
        (_, Scalar::Null) => Value::Null,
        (DataType::Boolean, Scalar::Bool(b)) => Value::Boolean(*b),
        (DataType::Int64, Scalar::I64(i)) => Value::Long(*i),
        (DataType::Float64, Scalar::F64(f)) => Value::Double(*f),
        (DataType::Float64, Scalar::I64(i)) => Value::Double(*i as f64),
        (DataType::Utf8, Scalar::Str(s)) => Value::String(s.clone()),
        (dt, v) => {
            return Err(Error::Schema(format!(
                "column '{}' is {} but value is {}",
                column,
                dt,
                v.type_name()
            )))
        }
    };
    let is_null = matches!(base, Value::Null);
    if !nullable {
        if is_null {
            return Err(Error::Schema(format!("null in non-nullable column '{}'", column)));
        }
        return Ok(base);
    }
    let branch = if is_null { 0 } else { 1 };
    Ok(Value::Union(branch, Box::new(base)))
}

/// Write `table` as one Avro container file and return the record count.
///
/// Values must already satisfy `schema`; this only converts them.
pub fn write_table(path: &Path, table: &Table, schema: &Schema, compression: Compression) -> Result<usize> {
    if schema.fields.len() != table.num_columns() {
        return Err(Error::Schema(format!(
            "schema has {} fields but table has {} columns",
            schema.fields.len(),
            table.num_columns()
        )));
    }
    let avro_schema = to_avro_schema(schema)?;
    let names = avro_field_names(&table.columns);
    let file = BufWriter::new(File::create(path)?);
    let mut writer = Writer::with_codec(&avro_schema, file, avro_codec(compression)?);
    writer.add_user_metadata(
        COLUMNS_METADATA_KEY.to_string(),
        serde_json::to_vec(&table.columns)?,
    )?;

    for row in &table.rows {
        let fields = row
            .iter()
            .zip(&schema.fields)
            .zip(&names)
            .map(|((value, field), name)| {
                to_avro_value(value, field.data_type, field.nullable, &field.name)
                    .map(|v| (name.clone(), v))
            })
            .collect::<Result<Vec<_>>>()?;
        writer.append(Value::Record(fields))?;
    }

    let mut inner = writer.into_inner()?;
    inner.flush()?;
    tracing::debug!(path = %path.display(), rows = table.num_rows(), codec = %compression, "wrote avro container");
    Ok(table.num_rows())
}

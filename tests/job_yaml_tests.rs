//! Format descriptors and export options loaded from YAML

use tabex::{ExportOptions, FormatDescriptor, TableExporter};

mod test_data_gen;
use test_data_gen::{cities, create_temp_dir, list_files};

#[test]
fn test_delimited_descriptor_defaults() {
    let fmt: FormatDescriptor = serde_yaml::from_str("kind: delimited_text\n").unwrap();
    assert_eq!(fmt, FormatDescriptor::csv());
}

#[test]
fn test_export_from_yaml_descriptor() {
    let yaml = r#"
kind: native_object_dump
partition_by: [State]
"#;
    let fmt: FormatDescriptor = serde_yaml::from_str(yaml).unwrap();
    let opts: ExportOptions = serde_yaml::from_str("overwrite: true\nfile_stem: cities\n").unwrap();

    let dir = create_temp_dir();
    let dest = dir.path().join("out");
    TableExporter::new(opts).export(&cities(), &dest, &fmt).unwrap();
    assert_eq!(
        list_files(&dest),
        vec![
            std::path::PathBuf::from("State=California/cities.dump"),
            std::path::PathBuf::from("State=Kansas/cities.dump"),
        ]
    );
}

#[test]
fn test_row_serialized_schema_from_yaml() {
    let yaml = r#"
kind: row_serialized
compression: deflate
schema:
  - name: City
    type: string
    nullable: false
  - name: Population
    type: integer
"#;
    let fmt: FormatDescriptor = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(fmt.name(), "avro");
    assert_eq!(fmt.compression().unwrap().name(), "deflate");
    match fmt {
        FormatDescriptor::RowSerialized { schema: Some(schema), .. } => {
            assert_eq!(schema.fields.len(), 2);
            assert!(schema.fields[1].nullable);
        }
        other => panic!("unexpected descriptor: {other:?}"),
    }
}

#[test]
fn test_empty_options_use_defaults() {
    let opts: ExportOptions = serde_yaml::from_str("{}").unwrap();
    assert_eq!(opts, ExportOptions::default());
}

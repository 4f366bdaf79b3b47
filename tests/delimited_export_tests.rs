//! Delimited text export tests

use std::fs;

use tabex::{export, read_any, FormatDescriptor, Scalar};

mod test_data_gen;
use test_data_gen::{cities, create_temp_dir, mixed_types};

#[test]
fn test_csv_export_quotes_embedded_delimiter() {
    let dir = create_temp_dir();
    let dest = dir.path().join("cities.csv");

    let report = export(&cities(), &dest, &FormatDescriptor::csv()).unwrap();
    assert_eq!(report.rows, 3);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.format, "csv");

    let text = fs::read_to_string(&dest).unwrap();
    assert_eq!(
        text,
        "City,State,Population\nWichita,Kansas,397532\n\"Los Angeles, CA\",California,3898747\nTopeka,Kansas,126587\n"
    );
}

#[test]
fn test_csv_round_trip_as_text() {
    let dir = create_temp_dir();
    let dest = dir.path().join("cities.csv");
    export(&cities(), &dest, &FormatDescriptor::csv()).unwrap();

    let back = read_any(&dest).unwrap();
    assert_eq!(back.columns, vec!["City", "State", "Population"]);
    assert_eq!(back.rows[1][0], Scalar::Str("Los Angeles, CA".into()));
    assert_eq!(back.rows[2][2], Scalar::Str("126587".into()));
}

#[test]
fn test_txt_uses_tab_and_extension() {
    let dir = create_temp_dir();
    let dest = dir.path().join("cities");

    let report = export(&cities(), &dest, &FormatDescriptor::txt()).unwrap();
    assert_eq!(report.destination, dir.path().join("cities.txt"));

    let text = fs::read_to_string(dir.path().join("cities.txt")).unwrap();
    assert!(text.starts_with("City\tState\tPopulation\n"));
    assert!(text.contains("Los Angeles, CA\tCalifornia\t3898747\n"));
}

#[test]
fn test_nulls_write_as_empty_fields() {
    let dir = create_temp_dir();
    let dest = dir.path().join("mixed.csv");
    export(&mixed_types(4), &dest, &FormatDescriptor::csv()).unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "id,name,score,active");
    assert_eq!(lines[1], "0,name_0,0.0,true");
    assert_eq!(lines[4], "3,,,");
}

#[test]
fn test_crlf_newline() {
    let dir = create_temp_dir();
    let dest = dir.path().join("cities.csv");
    let fmt = FormatDescriptor::DelimitedText {
        delimiter: ';',
        newline: "\r\n".into(),
        partition_by: None,
    };
    export(&cities(), &dest, &fmt).unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    assert!(text.starts_with("City;State;Population\r\n"));
    assert!(text.contains("Los Angeles, CA;California;3898747\r\n"));
}

fn mixed_schema() -> tabex::Schema {
    tabex::Schema::new(vec![
        tabex::Field::new("id", tabex::DataType::Int64, false),
        tabex::Field::new("name", tabex::DataType::Utf8, true),
        tabex::Field::new("score", tabex::DataType::Float64, true),
        tabex::Field::new("active", tabex::DataType::Boolean, true),
    ])
}

#[test]
fn test_typed_read_reproduces_rows() {
    use tabex::readers::csv::CsvReader;
    use tabex::DelimitedOptions;

    let mut table = mixed_types(8);
    table
        .push_row(vec![
            Scalar::I64(8),
            "she said \"hi\"\nthen left, twice".into(),
            Scalar::F64(-2.25),
            Scalar::Bool(false),
        ])
        .unwrap();

    let dir = create_temp_dir();
    for (i, (delimiter, newline)) in [(',', "\n"), ('\t', "\r\n"), (',', "~")].into_iter().enumerate() {
        let fmt = FormatDescriptor::DelimitedText {
            delimiter,
            newline: newline.into(),
            partition_by: None,
        };
        let dest = dir.path().join(format!("mixed-{}.data", i));
        export(&table, &dest, &fmt).unwrap();

        let opts = DelimitedOptions::from_descriptor(&fmt).unwrap();
        let back = CsvReader::from_path(&dest, opts)
            .unwrap()
            .read_table_with_schema(&mixed_schema())
            .unwrap();
        assert_eq!(back, table, "delimiter {:?}, newline {:?}", delimiter, newline);
    }
}

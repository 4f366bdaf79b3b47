//! Native object dump export tests

use std::fs;

use tabex::readers::dump;
use tabex::{export, FormatDescriptor, Scalar, Table};

mod test_data_gen;
use test_data_gen::{cities, create_temp_dir, mixed_types};

#[test]
fn test_dump_round_trip_is_exact() {
    let dir = create_temp_dir();
    let dest = dir.path().join("mixed");

    let report = export(&mixed_types(10), &dest, &FormatDescriptor::dump()).unwrap();
    assert_eq!(report.destination, dir.path().join("mixed.dump"));
    assert_eq!(dump::read_table(&report.destination).unwrap(), mixed_types(10));
}

#[test]
fn test_dump_keeps_non_finite_floats() {
    let dir = create_temp_dir();
    let dest = dir.path().join("floats.dump");
    let table = Table::try_new(
        ["v"],
        vec![
            vec![Scalar::F64(f64::INFINITY)],
            vec![Scalar::F64(f64::NEG_INFINITY)],
            vec![Scalar::F64(-0.0)],
        ],
    )
    .unwrap();

    export(&table, &dest, &FormatDescriptor::dump()).unwrap();
    assert_eq!(dump::read_table(&dest).unwrap(), table);
}

#[test]
fn test_truncated_dump_is_rejected() {
    let dir = create_temp_dir();
    let dest = dir.path().join("cities.dump");
    export(&cities(), &dest, &FormatDescriptor::dump()).unwrap();

    let bytes = fs::read(&dest).unwrap();
    assert!(dump::decode(&bytes[..bytes.len() - 1]).is_err());
}

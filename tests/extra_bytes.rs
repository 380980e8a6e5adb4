//! Scenarios 3 and 4: scalar and vector user columns round-tripping through extra-bytes VLR
//! entries.

use std::io::Cursor;

use lastable::schema::ScalarType;
use lastable::table::{PointTable, Row};
use lastable::vlr::Payload;
use lastable::{AddColumn, Dataset};

fn row(x: f64, y: f64, z: f64) -> Row {
    Row {
        position: (x, y, z),
        intensity: 0,
        return_number: 1,
        number_of_returns: 1,
        ..Row::default()
    }
}

fn round_trip(dataset: &Dataset) -> Dataset {
    let mut buffer = Vec::new();
    dataset.write_to(&mut buffer).unwrap();
    Dataset::read_from(Cursor::new(buffer)).unwrap()
}

/// Scenario 3: a scalar user column round-trips through a single extra-bytes VLR entry each.
#[test]
fn user_columns_round_trip_through_extra_bytes() {
    let mut table = PointTable::new();
    for i in 0..10 {
        table.push(row(i as f64, 0.0, 0.0)).unwrap();
    }
    let mut dataset = Dataset::new(table).unwrap();

    let thing: Vec<f64> = (0..10).map(|i| 0.1 * (i as f64 + 1.0)).collect();
    dataset
        .add_column(AddColumn::User {
            name: "thing".to_string(),
            scalar: ScalarType::F64,
            component_count: 1,
            values: thing.iter().map(|v| vec![*v]).collect(),
        })
        .unwrap();
    let other: Vec<f64> = (0..10).map(|i| (i as f64) - 3.0).collect();
    dataset
        .add_column(AddColumn::User {
            name: "other".to_string(),
            scalar: ScalarType::I16,
            component_count: 1,
            values: other.iter().map(|v| vec![*v]).collect(),
        })
        .unwrap();

    let extra_bytes_vlr = lastable::vlr::extract_vlr(dataset.vlrs(), "LASF_Spec", 4).unwrap();
    let Payload::ExtraBytes(extra_bytes) = &extra_bytes_vlr.payload else {
        panic!("expected an extra-bytes payload");
    };
    assert_eq!(2, extra_bytes.0.len());
    assert_eq!("thing", extra_bytes.0[0].name);
    assert_eq!(ScalarType::F64, extra_bytes.0[0].scalar().unwrap());
    assert_eq!("other", extra_bytes.0[1].name);
    assert_eq!(ScalarType::I16, extra_bytes.0[1].scalar().unwrap());

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
    for i in 0..10 {
        let row = back.table().row(i);
        assert_eq!(vec![thing[i]], row.user_values["thing"]);
        assert_eq!(vec![other[i]], row.user_values["other"]);
    }
}

/// Scenario 4: a vector user column splits into consecutive `"name [i]"` extra-bytes entries and
/// re-materializes as a single column on read.
#[test]
fn vector_user_column_round_trips() {
    let mut table = PointTable::new();
    for i in 0..4 {
        table.push(row(i as f64, 0.0, 0.0)).unwrap();
    }
    let mut dataset = Dataset::new(table).unwrap();

    let values: Vec<Vec<f64>> = (0..4)
        .map(|i| vec![i as f64, (i as f64) * 2.0, (i as f64) * 3.0])
        .collect();
    dataset
        .add_column(AddColumn::User {
            name: "rgbish".to_string(),
            scalar: ScalarType::F64,
            component_count: 3,
            values: values.clone(),
        })
        .unwrap();

    let extra_bytes_vlr = lastable::vlr::extract_vlr(dataset.vlrs(), "LASF_Spec", 4).unwrap();
    let Payload::ExtraBytes(extra_bytes) = &extra_bytes_vlr.payload else {
        panic!("expected an extra-bytes payload");
    };
    assert_eq!(3, extra_bytes.0.len());
    assert_eq!("rgbish [0]", extra_bytes.0[0].name);
    assert_eq!("rgbish [1]", extra_bytes.0[1].name);
    assert_eq!("rgbish [2]", extra_bytes.0[2].name);

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
    assert_eq!(1, back.table().user_columns.len());
    let column = &back.table().user_columns["rgbish"];
    assert_eq!(3, column.component_count);
    for i in 0..4 {
        assert_eq!(values[i], column.row_f64(i));
    }
}

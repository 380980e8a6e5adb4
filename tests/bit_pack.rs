//! Scenario 2: bit-pack boundary values round-trip through the legacy flag/classification bytes.

use std::io::Cursor;

use lastable::classification::Classification;
use lastable::table::{PointTable, Row};
use lastable::Dataset;

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

#[test]
fn bit_pack_boundaries() {
    let mut table = PointTable::new();
    let mut r = row(0.0, 0.0, 0.0);
    r.return_number = 5;
    r.number_of_returns = 5;
    r.scan_direction = true;
    r.edge_of_flight_line = true;
    r.classification = Classification::new(31, true, false, true);
    table.push(r).unwrap();
    let dataset = Dataset::new(table).unwrap();

    let mut buffer = Vec::new();
    dataset.write_to(&mut buffer).unwrap();

    let header_size = dataset.header().header_size() as usize;
    // format 0 layout: x,y,z (4 bytes each), intensity (2 bytes), then the flag byte.
    let flag_byte = buffer[header_size + 14];
    let classification_byte = buffer[header_size + 15];
    assert_eq!(0xED, flag_byte);
    assert_eq!(0xBF, classification_byte);

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
}

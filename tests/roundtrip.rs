//! Scenario 1 and P4: a minimal round trip, and the spatial range enclosing every point after it.

use std::io::Cursor;

use lastable::classification::Classification;
use lastable::header::Builder;
use lastable::table::{PointTable, Row};
use lastable::{Dataset, Version};

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

/// Scenario 1: a minimal v1.1 round trip.
#[test]
fn minimal_v1_1_round_trip() {
    let mut table = PointTable::new();
    for i in 0..10 {
        let mut r = row(i as f64, i as f64, i as f64);
        r.classification = Classification::new(i as u8, false, false, false);
        table.push(r).unwrap();
    }
    let mut builder = Builder::default();
    builder.version = Version::new(1, 1);
    let header = builder.into_header().unwrap();
    let dataset = Dataset::assemble(table, Some(header), Vec::new(), Vec::new(), Vec::new()).unwrap();
    assert_eq!(0, dataset.header().point_format().to_u8());
    assert_eq!(10, dataset.header().point_count());

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
    assert_eq!(10, back.header().point_count());
    for i in 0..10 {
        assert_eq!(i as f64, back.table().x[i]);
        assert_eq!(i as u8, back.table().classification[i].class);
    }
}

/// P4: every point's position falls within the header's spatial range after a round trip.
#[test]
fn bounding_box_encloses_every_point() {
    let mut table = PointTable::new();
    for (x, y, z) in [(1.0, -2.0, 3.0), (-5.0, 10.0, 0.0), (0.0, 0.0, 0.0)] {
        table.push(row(x, y, z)).unwrap();
    }
    let dataset = Dataset::new(table).unwrap();
    let back = round_trip(&dataset);
    let spatial = back.header().spatial();
    for i in 0..back.table().len() {
        assert!(spatial.range.x.contains(&back.table().x[i]));
        assert!(spatial.range.y.contains(&back.table().y[i]));
        assert!(spatial.range.z.contains(&back.table().z[i]));
    }
}

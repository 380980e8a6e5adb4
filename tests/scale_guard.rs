//! Scenario 6: a position that doesn't round-trip through its header's scale/offset fails loudly
//! instead of silently clamping.

use lastable::bounds::Transform;
use lastable::header::Builder;
use lastable::table::{PointTable, Row};
use lastable::vector::AxisInfo;
use lastable::{Dataset, Error};

fn row(x: f64, y: f64, z: f64) -> Row {
    Row {
        position: (x, y, z),
        intensity: 0,
        return_number: 1,
        number_of_returns: 1,
        ..Row::default()
    }
}

/// `inverse_checked` rejects a value whose scale/offset would saturate instead of clamping it.
#[test]
fn inverse_checked_rejects_out_of_range_value() {
    let t = Transform::new(1e-4, 0.0);
    assert_eq!(Some(1_000_000), t.inverse_checked(100.0).ok());
    match t.inverse_checked(1e12) {
        Err(Error::ScaleOutOfRange { value, .. }) => assert_eq!(1e12, value),
        other => panic!("expected ScaleOutOfRange, got {other:?}"),
    }
}

/// A header built with an offset that doesn't cover every point's position fails to write, rather
/// than silently clamping the out-of-range point to `i32::MAX`/`MIN`.
#[test]
fn write_fails_when_a_point_falls_outside_the_header_scale_offset() {
    let mut table = PointTable::new();
    table.push(row(0.0, 0.0, 0.0)).unwrap();
    table.push(row(1.0e9, 0.0, 0.0)).unwrap();

    let mut builder = Builder::default();
    builder.spatial.offset = AxisInfo::new(0.0, 0.0, 0.0);
    let header = builder.into_header().unwrap();

    let dataset = Dataset::assemble(table, Some(header), Vec::new(), Vec::new(), Vec::new()).unwrap();

    let mut buffer = Vec::new();
    match dataset.write_to(&mut buffer) {
        Err(Error::ScaleOutOfRange { value, .. }) => assert_eq!(1.0e9, value),
        other => panic!("expected ScaleOutOfRange, got {other:?}"),
    }
}

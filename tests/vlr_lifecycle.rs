//! Scenario 5, the extended-VLR-forces-1.4 invariant (P9), and the WKT global-encoding bit
//! invariant across VLR mutation.

use std::io::Cursor;

use lastable::table::{PointTable, Row};
use lastable::vlr::payloads::{OgcWkt, TextAreaDescription};
use lastable::vlr::{Payload, Vlr};
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

/// Scenario 5: superseding a VLR frees its `(user-id, record-id)` key for a replacement, while
/// both remain present and only the replacement is extractable at that key.
#[test]
fn vlr_supersession() {
    let mut table = PointTable::new();
    table.push(row(0.0, 0.0, 0.0)).unwrap();
    let mut dataset = Dataset::new(table).unwrap();

    dataset
        .add_vlr(
            Vlr::new(
                "LASF_Spec",
                3,
                "",
                Payload::TextAreaDescription(TextAreaDescription("old coverage".to_string())),
            )
            .unwrap(),
        )
        .unwrap();
    dataset.set_superseded("LASF_Spec", 3).unwrap();
    dataset
        .add_vlr(
            Vlr::new(
                "LASF_Spec",
                3,
                "",
                Payload::TextAreaDescription(TextAreaDescription("new coverage".to_string())),
            )
            .unwrap(),
        )
        .unwrap();

    assert_eq!(2, dataset.vlrs().len());
    let a = dataset
        .vlrs()
        .iter()
        .find(|v| matches!(&v.payload, Payload::TextAreaDescription(t) if t.0 == "old coverage"))
        .unwrap();
    assert_eq!(7, a.record_id);
    assert!(a.is_superseded());

    let extracted = lastable::vlr::extract_vlr(dataset.vlrs(), "LASF_Spec", 3).unwrap();
    match &extracted.payload {
        Payload::TextAreaDescription(t) => assert_eq!("new coverage", t.0),
        _ => panic!("expected a text area description"),
    }

    // A superseded VLR keeps its original payload type but loses its original record id; it must
    // still round-trip correctly even though no codec is registered for ("LASF_Spec", 7).
    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
}

/// Adding an extended VLR upgrades the spec version to 1.4 (P9) and the EVLR section follows the
/// point records.
#[test]
fn extended_vlr_forces_1_4_and_lands_after_points() {
    let mut table = PointTable::new();
    table.push(row(0.0, 0.0, 0.0)).unwrap();
    let mut dataset = Dataset::new(table).unwrap();
    assert_eq!(Version::new(1, 2), dataset.header().version());

    dataset
        .add_vlr(
            Vlr::new(
                "LASF_Spec",
                3,
                "",
                Payload::TextAreaDescription(TextAreaDescription("big".to_string())),
            )
            .unwrap()
            .into_extended(),
        )
        .unwrap();
    assert_eq!(Version::new(1, 4), dataset.header().version());
    assert_eq!(1, dataset.evlrs().len());

    let expected_start = u64::from(dataset.header().data_offset())
        + dataset.header().point_count() * u64::from(dataset.header().point_record_length());
    assert_eq!(expected_start, dataset.header().evlr_start());

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
}

/// A non-extended WKT VLR is legal below 1.4; adding one must still force the global-encoding
/// WKT bit on, upgrading the spec version since the bit itself requires 1.4.
#[test]
fn non_extended_wkt_vlr_upgrades_version_and_sets_the_wkt_bit() {
    let mut table = PointTable::new();
    table.push(row(0.0, 0.0, 0.0)).unwrap();
    let mut dataset = Dataset::new(table).unwrap();
    assert_eq!(Version::new(1, 2), dataset.header().version());

    dataset
        .add_vlr(
            Vlr::new(
                "LASF_Projection",
                2112,
                "",
                Payload::Wkt(OgcWkt {
                    wkt: "COMPD_CS[\"unnamed\"]".to_string(),
                    horizontal_unit: None,
                    vertical_unit: None,
                }),
            )
            .unwrap(),
        )
        .unwrap();

    assert_eq!(Version::new(1, 4), dataset.header().version());
    assert!(dataset.header().wkt().unwrap());

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
    assert!(back.header().wkt().unwrap());
}

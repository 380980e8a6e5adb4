//! Point-format auto-upgrade when a table carries columns the header's current format can't
//! represent, including the waveform sub-fields that force an extended (6-10) format.

use std::io::Cursor;

use lastable::header::Builder;
use lastable::point::Format;
use lastable::point::Waveform;
use lastable::table::{PointTable, Row};
use lastable::vlr::payloads::WaveformPacketDescriptor;
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

/// A near-infrared value only formats 8 and 10 can carry; assembling against an explicit format-0
/// header must upgrade both the point format and, since 8 is an extended format, the spec version.
#[test]
fn format_auto_upgrade() {
    let mut table = PointTable::new();
    let mut r = row(0.0, 0.0, 0.0);
    r.nir = Some(500);
    table.push(r).unwrap();

    let mut builder = Builder::default();
    builder.point_format = Format::new(0).unwrap();
    let header = builder.into_header().unwrap();

    let dataset = Dataset::assemble(table, Some(header), Vec::new(), Vec::new(), Vec::new()).unwrap();
    assert!(dataset.header().point_format().has_nir());
    assert_eq!(Version::new(1, 4), dataset.header().version());

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
    assert_eq!(500, back.table().nir[0]);
}

/// A waveform sub-field round-trips through an extended format alongside its packet-descriptor
/// VLR.
#[test]
fn waveform_round_trips_on_extended_format() {
    let mut table = PointTable::new();
    let mut r = row(0.0, 0.0, 0.0);
    r.waveform = Some(Waveform {
        descriptor_index: 0,
        offset: 60,
        size: 128,
        return_location: 1.5,
        x_t: 0.1,
        y_t: 0.2,
        z_t: 0.3,
    });
    table.push(r).unwrap();

    let descriptor_vlr = Vlr::new(
        "LASF_Spec",
        100,
        "",
        Payload::WaveformPacketDescriptor(WaveformPacketDescriptor {
            bits_per_sample: 16,
            compression_type: 0,
            number_of_samples: 64,
            temporal_sample_spacing: 500,
            digitizer_gain: 1.0,
            digitizer_offset: 0.0,
        }),
    )
    .unwrap();

    let dataset = Dataset::assemble(table, None, vec![descriptor_vlr], Vec::new(), Vec::new()).unwrap();
    assert!(dataset.header().point_format().has_waveform());
    assert_eq!(Version::new(1, 4), dataset.header().version());

    let back = round_trip(&dataset);
    assert_eq!(dataset, back);
    let waveform = back.table().waveform[0];
    assert_eq!(60, waveform.offset);
    assert_eq!(128, waveform.size);
}

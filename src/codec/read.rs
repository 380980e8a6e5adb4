//! The streaming read path: header, VLRs, user-defined bytes, points, EVLRs, in that order.

use std::collections::BTreeMap;
use std::io::Read;

use crate::classification::Classification;
use crate::header::raw::RawHeader;
use crate::header::Header;
use crate::point::raw::RawPoint;
use crate::record::record_format;
use crate::schema::{group_into_columns, FieldSpec, ScalarType};
use crate::table::{PointTable, Row, UserColumn};
use crate::vlr::raw::RawVlr;
use crate::vlr::{extract_vlr, Payload, Vlr};
use crate::{Dataset, Error, Result};

/// Decodes a complete dataset from a stream positioned at the start of the header.
pub fn read_from<R: Read>(mut read: R) -> Result<Dataset> {
    let raw_header = RawHeader::read_from(&mut read)?;
    let header = Header::from_raw(raw_header)?;

    let mut vlrs = Vec::with_capacity(header.vlr_count() as usize);
    let mut vlr_bytes = 0u64;
    for _ in 0..header.vlr_count() {
        let raw_vlr = RawVlr::read_from(&mut read, false)?;
        vlr_bytes += raw_vlr.wire_size(false);
        vlrs.push(Vlr::from_raw(raw_vlr, false)?);
    }

    let consumed = u64::from(header.header_size()) + vlr_bytes;
    let data_offset = u64::from(header.data_offset());
    if data_offset < consumed {
        return Err(Error::InconsistentHeader(format!(
            "data offset {data_offset} is smaller than the header plus {} vlrs ({consumed} bytes)",
            vlrs.len()
        )));
    }
    let mut user_defined_bytes = vec![0u8; (data_offset - consumed) as usize];
    read.read_exact(&mut user_defined_bytes)?;

    let extra_bytes_schema = documented_schema(&vlrs)?;
    let kind = record_format(
        header.point_record_length(),
        header.point_format(),
        &extra_bytes_schema,
    )?;
    let columns = group_into_columns(kind.schema());

    let mut table = PointTable::new();
    for (name, scalar, component_count) in &columns {
        table
            .user_columns
            .insert(name.clone(), UserColumn::new(*scalar, *component_count));
    }

    let format = header.point_format();
    let transform = header.spatial().transform();
    for _ in 0..header.point_count() {
        let raw_point = RawPoint::read_from(&mut read, format)?;
        let raw_values = read_documented_fields(&mut read, kind.schema())?;
        let mut undocumented_bytes = vec![0u8; kind.undocumented_len()];
        read.read_exact(&mut undocumented_bytes)?;

        let mut user_values = BTreeMap::new();
        let mut offset = 0;
        for (name, _scalar, component_count) in &columns {
            user_values.insert(
                name.clone(),
                raw_values[offset..offset + component_count].to_vec(),
            );
            offset += component_count;
        }

        let row = Row {
            position: (
                transform.x.direct(raw_point.x),
                transform.y.direct(raw_point.y),
                transform.z.direct(raw_point.z),
            ),
            intensity: raw_point.intensity,
            return_number: raw_point.flags.return_number(),
            number_of_returns: raw_point.flags.number_of_returns(),
            scan_direction: raw_point.flags.scan_direction(),
            edge_of_flight_line: raw_point.flags.edge_of_flight_line(),
            synthetic: raw_point.flags.synthetic(),
            key_point: raw_point.flags.key_point(),
            withheld: raw_point.flags.withheld(),
            overlap: raw_point.flags.overlap(),
            scanner_channel: raw_point.flags.scanner_channel(),
            classification: Classification::new(
                raw_point.flags.classification(),
                raw_point.flags.synthetic(),
                raw_point.flags.key_point(),
                raw_point.flags.withheld(),
            ),
            scan_angle: raw_point.scan_angle.to_degrees(),
            user_data: raw_point.user_data,
            point_source_id: raw_point.point_source_id,
            gps_time: raw_point.gps_time,
            color: raw_point.color,
            nir: raw_point.nir,
            waveform: raw_point.waveform,
            undocumented_bytes,
            user_values,
        };
        table.push(row)?;
    }

    let mut evlrs = Vec::with_capacity(header.evlr_count() as usize);
    for _ in 0..header.evlr_count() {
        let raw_vlr = RawVlr::read_from(&mut read, true)?;
        evlrs.push(Vlr::from_raw(raw_vlr, true)?);
    }

    Ok(Dataset {
        header,
        table,
        vlrs,
        evlrs,
        user_defined_bytes,
        unit_conversion: None,
    })
}

fn documented_schema(vlrs: &[Vlr]) -> Result<Vec<FieldSpec>> {
    match extract_vlr(vlrs, "LASF_Spec", 4) {
        Some(vlr) => match &vlr.payload {
            Payload::ExtraBytes(extra_bytes) => extra_bytes
                .0
                .iter()
                .map(|record| Ok(FieldSpec::new(record.name.clone(), record.scalar()?)))
                .collect(),
            _ => Ok(Vec::new()),
        },
        None => Ok(Vec::new()),
    }
}

fn read_documented_fields<R: Read>(mut read: R, schema: &[FieldSpec]) -> Result<Vec<f64>> {
    use byteorder::{LittleEndian, ReadBytesExt};
    schema
        .iter()
        .map(|field| {
            Ok(match field.scalar {
                ScalarType::U8 => f64::from(read.read_u8()?),
                ScalarType::I8 => f64::from(read.read_i8()?),
                ScalarType::U16 => f64::from(read.read_u16::<LittleEndian>()?),
                ScalarType::I16 => f64::from(read.read_i16::<LittleEndian>()?),
                ScalarType::U32 => f64::from(read.read_u32::<LittleEndian>()?),
                ScalarType::I32 => f64::from(read.read_i32::<LittleEndian>()?),
                ScalarType::U64 => read.read_u64::<LittleEndian>()? as f64,
                ScalarType::I64 => read.read_i64::<LittleEndian>()? as f64,
                ScalarType::F32 => f64::from(read.read_f32::<LittleEndian>()?),
                ScalarType::F64 => read.read_f64::<LittleEndian>()?,
            })
        })
        .collect()
}

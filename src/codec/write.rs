//! The write path: header, VLRs, user-defined bytes, a single columnar-blitted point buffer,
//! then EVLRs.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian};

use crate::point::flags::{ExtendedFlags, LegacyFlags};
use crate::point::scan_angle::ScanAngle;
use crate::record::record_format;
use crate::schema::{field_specs_for_column, FieldSpec, ScalarType};
use crate::table::PointTable;
use crate::{Dataset, Result};

/// Encodes a complete dataset to a stream, starting at the header.
pub fn write_to<W: Write>(mut write: W, dataset: &Dataset) -> Result<()> {
    let raw_header = dataset.header.to_raw()?;
    raw_header.write_to(&mut write)?;

    for vlr in dataset.vlrs.iter() {
        let raw = vlr.to_raw()?;
        raw.write_to(&mut write, false)?;
    }

    write.write_all(&dataset.user_defined_bytes)?;

    let buffer = build_point_buffer(dataset)?;
    write.write_all(&buffer)?;

    for vlr in dataset.evlrs.iter() {
        let raw = vlr.to_raw()?;
        raw.write_to(&mut write, true)?;
    }

    Ok(())
}

fn documented_schema(table: &PointTable) -> Vec<FieldSpec> {
    table
        .user_columns
        .iter()
        .flat_map(|(name, column)| {
            field_specs_for_column(name, column.scalar, column.component_count)
        })
        .collect()
}

/// Assembles the entire point-record section as one buffer, writing each field across all rows
/// (a "column" of the output) in a single pass rather than one small write per record.
fn build_point_buffer(dataset: &Dataset) -> Result<Vec<u8>> {
    let table = &dataset.table;
    let format = dataset.header.point_format();
    let schema = documented_schema(table);
    let undocumented_width = table
        .undocumented_bytes
        .first()
        .map_or(0, |bytes| bytes.len());
    let kind = record_format(
        dataset.header.point_record_length(),
        format,
        &schema,
    )?;
    let n = table.len();
    let stride = kind.wire_size(format);
    let mut buffer = vec![0u8; stride * n];

    let transform = dataset.header.spatial().transform();

    let mut offset = 0usize;
    blit_i32(
        &mut buffer,
        offset,
        stride,
        &(0..n)
            .map(|i| transform.x.inverse_checked(table.x[i]))
            .collect::<Result<Vec<_>>>()?,
    );
    offset += 4;
    blit_i32(
        &mut buffer,
        offset,
        stride,
        &(0..n)
            .map(|i| transform.y.inverse_checked(table.y[i]))
            .collect::<Result<Vec<_>>>()?,
    );
    offset += 4;
    blit_i32(
        &mut buffer,
        offset,
        stride,
        &(0..n)
            .map(|i| transform.z.inverse_checked(table.z[i]))
            .collect::<Result<Vec<_>>>()?,
    );
    offset += 4;
    blit_u16(&mut buffer, offset, stride, &table.intensity);
    offset += 2;

    if format.is_extended() {
        for i in 0..n {
            let flags = ExtendedFlags::new(
                table.return_number[i],
                table.number_of_returns[i],
                table.classification[i].synthetic,
                table.classification[i].key_point,
                table.classification[i].withheld,
                table.overlap[i],
                table.scanner_channel[i],
                table.scan_direction[i],
                table.edge_of_flight_line[i],
            );
            let (byte1, byte2) = flags.to_bytes();
            let start = i * stride + offset;
            buffer[start] = byte1;
            buffer[start + 1] = byte2;
            buffer[start + 2] = table.classification[i].class;
        }
        offset += 3;
        for i in 0..n {
            let raw = ScanAngle::scaled_from_degrees(table.scan_angle[i]).to_raw();
            LittleEndian::write_i16(&mut buffer[i * stride + offset..], raw);
        }
        offset += 2;
    } else {
        for i in 0..n {
            let flags = LegacyFlags::new(
                table.return_number[i],
                table.number_of_returns[i],
                table.scan_direction[i],
                table.edge_of_flight_line[i],
            );
            let classification = table.classification[i];
            let start = i * stride + offset;
            buffer[start] = flags.to_byte();
            buffer[start + 1] = classification.to_byte();
        }
        offset += 2;
        for i in 0..n {
            let raw = ScanAngle::rank_from_degrees(table.scan_angle[i]).to_raw();
            buffer[i * stride + offset] = raw as u8;
        }
        offset += 1;
    }

    blit_u8(&mut buffer, offset, stride, &table.user_data);
    offset += 1;
    blit_u16(&mut buffer, offset, stride, &table.point_source_id);
    offset += 2;

    if format.has_gps_time() {
        let values: Vec<f64> = (0..n).map(|i| table.gps_time.get(i).copied().unwrap_or(0.0)).collect();
        blit_f64(&mut buffer, offset, stride, &values);
        offset += 8;
    }

    if format.has_color() {
        for i in 0..n {
            let color = table.color.get(i).copied().unwrap_or_default();
            let start = i * stride + offset;
            LittleEndian::write_u16(&mut buffer[start..], color.red);
            LittleEndian::write_u16(&mut buffer[start + 2..], color.green);
            LittleEndian::write_u16(&mut buffer[start + 4..], color.blue);
        }
        offset += 6;
    }

    if format.has_nir() {
        let values: Vec<u16> = (0..n).map(|i| table.nir.get(i).copied().unwrap_or(0)).collect();
        blit_u16(&mut buffer, offset, stride, &values);
        offset += 2;
    }

    if format.has_waveform() {
        for i in 0..n {
            let waveform = table.waveform.get(i).copied().unwrap_or_default();
            let start = i * stride + offset;
            buffer[start] = waveform.descriptor_index;
            LittleEndian::write_u64(&mut buffer[start + 1..], waveform.offset);
            LittleEndian::write_u32(&mut buffer[start + 9..], waveform.size);
            LittleEndian::write_f32(&mut buffer[start + 13..], waveform.return_location);
            LittleEndian::write_f32(&mut buffer[start + 17..], waveform.x_t);
            LittleEndian::write_f32(&mut buffer[start + 21..], waveform.y_t);
            LittleEndian::write_f32(&mut buffer[start + 25..], waveform.z_t);
        }
        offset += 29;
    }

    for column in table.user_columns.values() {
        let field_stride = column.scalar.size();
        for component in 0..column.component_count {
            for i in 0..n {
                let value = column.row_f64(i)[component];
                let start = i * stride + offset;
                write_scalar(&mut buffer[start..start + field_stride], column.scalar, value);
            }
            offset += field_stride;
        }
    }

    if undocumented_width > 0 {
        for i in 0..n {
            let bytes = &table.undocumented_bytes[i];
            let start = i * stride + offset;
            buffer[start..start + undocumented_width].copy_from_slice(bytes);
        }
    }

    Ok(buffer)
}

fn write_scalar(slice: &mut [u8], scalar: ScalarType, value: f64) {
    match scalar {
        ScalarType::U8 => slice[0] = value as u8,
        ScalarType::I8 => slice[0] = value as i8 as u8,
        ScalarType::U16 => LittleEndian::write_u16(slice, value as u16),
        ScalarType::I16 => LittleEndian::write_i16(slice, value as i16),
        ScalarType::U32 => LittleEndian::write_u32(slice, value as u32),
        ScalarType::I32 => LittleEndian::write_i32(slice, value as i32),
        ScalarType::U64 => LittleEndian::write_u64(slice, value as u64),
        ScalarType::I64 => LittleEndian::write_i64(slice, value as i64),
        ScalarType::F32 => LittleEndian::write_f32(slice, value as f32),
        ScalarType::F64 => LittleEndian::write_f64(slice, value),
    }
}

fn blit_u8(buffer: &mut [u8], offset: usize, stride: usize, values: &[u8]) {
    for (i, &value) in values.iter().enumerate() {
        buffer[i * stride + offset] = value;
    }
}

fn blit_u16(buffer: &mut [u8], offset: usize, stride: usize, values: &[u16]) {
    for (i, &value) in values.iter().enumerate() {
        let start = i * stride + offset;
        LittleEndian::write_u16(&mut buffer[start..start + 2], value);
    }
}

fn blit_i32(buffer: &mut [u8], offset: usize, stride: usize, values: &[i32]) {
    for (i, &value) in values.iter().enumerate() {
        let start = i * stride + offset;
        LittleEndian::write_i32(&mut buffer[start..start + 4], value);
    }
}

fn blit_f64(buffer: &mut [u8], offset: usize, stride: usize, values: &[f64]) {
    for (i, &value) in values.iter().enumerate() {
        let start = i * stride + offset;
        LittleEndian::write_f64(&mut buffer[start..start + 8], value);
    }
}

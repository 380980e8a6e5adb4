//! The wire layout of the header block: 227, 235, or 375 bytes depending on spec version.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use uuid::Uuid;

use crate::utils::{read_padded_string, skip_signature, write_padded_string, LASF};
use crate::Version;
use crate::Result;

const SYSTEM_IDENTIFIER_LEN: usize = 32;
const SOFTWARE_IDENTIFIER_LEN: usize = 32;

/// The header block in its literal wire representation.
///
/// Fields introduced in later spec versions (`waveform_data_start`, and everything from
/// `evlr_start` on) are present here unconditionally but only read or written when the version
/// being decoded or encoded calls for them; unused fields are zero.
#[derive(Clone, Debug, PartialEq)]
pub struct RawHeader {
    pub file_source_id: u16,
    pub global_encoding: u16,
    pub project_id: Uuid,
    pub version: Version,
    pub system_identifier: String,
    pub software_identifier: String,
    pub creation_day_of_year: u16,
    pub creation_year: u16,
    pub header_size: u16,
    pub data_offset: u32,
    pub number_of_vlrs: u32,
    pub point_format: u8,
    pub point_record_length: u16,
    pub legacy_point_count: u32,
    pub legacy_point_count_by_return: [u32; 5],
    pub scales: [f64; 3],
    pub offsets: [f64; 3],
    /// (x-max, x-min, y-max, y-min, z-max, z-min)
    pub ranges: [f64; 6],
    pub waveform_data_start: u64,
    pub evlr_start: u64,
    pub evlr_count: u32,
    pub point_count: u64,
    pub point_count_by_return: [u64; 15],
}

impl RawHeader {
    /// Reads a header, determining how many bytes to consume from the version field embedded in
    /// the stream.
    pub fn read_from<R: Read>(mut read: R) -> Result<RawHeader> {
        skip_signature(&mut read)?;
        let file_source_id = read.read_u16::<LittleEndian>()?;
        let global_encoding = read.read_u16::<LittleEndian>()?;

        let d1 = read.read_u32::<LittleEndian>()?;
        let d2 = read.read_u16::<LittleEndian>()?;
        let d3 = read.read_u16::<LittleEndian>()?;
        let mut d4 = [0u8; 8];
        read.read_exact(&mut d4)?;
        let project_id = Uuid::from_fields(d1, d2, d3, &d4);

        let major = read.read_u8()?;
        let minor = read.read_u8()?;
        let version = Version::new(major, minor);

        let system_identifier = read_padded_string(&mut read, SYSTEM_IDENTIFIER_LEN)?;
        let software_identifier = read_padded_string(&mut read, SOFTWARE_IDENTIFIER_LEN)?;

        let creation_day_of_year = read.read_u16::<LittleEndian>()?;
        let creation_year = read.read_u16::<LittleEndian>()?;
        let header_size = read.read_u16::<LittleEndian>()?;
        let data_offset = read.read_u32::<LittleEndian>()?;
        let number_of_vlrs = read.read_u32::<LittleEndian>()?;
        let point_format = read.read_u8()?;
        let point_record_length = read.read_u16::<LittleEndian>()?;
        let legacy_point_count = read.read_u32::<LittleEndian>()?;

        let mut legacy_point_count_by_return = [0u32; 5];
        for count in legacy_point_count_by_return.iter_mut() {
            *count = read.read_u32::<LittleEndian>()?;
        }

        let mut scales = [0f64; 3];
        for scale in scales.iter_mut() {
            *scale = read.read_f64::<LittleEndian>()?;
        }
        let mut offsets = [0f64; 3];
        for offset in offsets.iter_mut() {
            *offset = read.read_f64::<LittleEndian>()?;
        }
        let mut ranges = [0f64; 6];
        for range in ranges.iter_mut() {
            *range = read.read_f64::<LittleEndian>()?;
        }

        let mut header = RawHeader {
            file_source_id,
            global_encoding,
            project_id,
            version,
            system_identifier,
            software_identifier,
            creation_day_of_year,
            creation_year,
            header_size,
            data_offset,
            number_of_vlrs,
            point_format,
            point_record_length,
            legacy_point_count,
            legacy_point_count_by_return,
            scales,
            offsets,
            ranges,
            waveform_data_start: 0,
            evlr_start: 0,
            evlr_count: 0,
            point_count: 0,
            point_count_by_return: [0u64; 15],
        };

        if minor >= 3 {
            header.waveform_data_start = read.read_u64::<LittleEndian>()?;
        }
        if minor >= 4 {
            header.evlr_start = read.read_u64::<LittleEndian>()?;
            header.evlr_count = read.read_u32::<LittleEndian>()?;
            header.point_count = read.read_u64::<LittleEndian>()?;
            for count in header.point_count_by_return.iter_mut() {
                *count = read.read_u64::<LittleEndian>()?;
            }
        }

        Ok(header)
    }

    /// Writes this header, including only the fields `self.version` calls for.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&LASF)?;
        write.write_u16::<LittleEndian>(self.file_source_id)?;
        write.write_u16::<LittleEndian>(self.global_encoding)?;

        let (d1, d2, d3, d4) = self.project_id.as_fields();
        write.write_u32::<LittleEndian>(d1)?;
        write.write_u16::<LittleEndian>(d2)?;
        write.write_u16::<LittleEndian>(d3)?;
        write.write_all(d4)?;

        write.write_u8(self.version.major)?;
        write.write_u8(self.version.minor)?;

        write_padded_string(&mut write, &self.system_identifier, SYSTEM_IDENTIFIER_LEN)?;
        write_padded_string(&mut write, &self.software_identifier, SOFTWARE_IDENTIFIER_LEN)?;

        write.write_u16::<LittleEndian>(self.creation_day_of_year)?;
        write.write_u16::<LittleEndian>(self.creation_year)?;
        write.write_u16::<LittleEndian>(self.header_size)?;
        write.write_u32::<LittleEndian>(self.data_offset)?;
        write.write_u32::<LittleEndian>(self.number_of_vlrs)?;
        write.write_u8(self.point_format)?;
        write.write_u16::<LittleEndian>(self.point_record_length)?;
        write.write_u32::<LittleEndian>(self.legacy_point_count)?;
        for count in &self.legacy_point_count_by_return {
            write.write_u32::<LittleEndian>(*count)?;
        }
        for scale in &self.scales {
            write.write_f64::<LittleEndian>(*scale)?;
        }
        for offset in &self.offsets {
            write.write_f64::<LittleEndian>(*offset)?;
        }
        for range in &self.ranges {
            write.write_f64::<LittleEndian>(*range)?;
        }

        if self.version.minor >= 3 {
            write.write_u64::<LittleEndian>(self.waveform_data_start)?;
        }
        if self.version.minor >= 4 {
            write.write_u64::<LittleEndian>(self.evlr_start)?;
            write.write_u32::<LittleEndian>(self.evlr_count)?;
            write.write_u64::<LittleEndian>(self.point_count)?;
            for count in &self.point_count_by_return {
                write.write_u64::<LittleEndian>(*count)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(version: Version) -> RawHeader {
        RawHeader {
            file_source_id: 1,
            global_encoding: 0,
            project_id: Uuid::nil(),
            version,
            system_identifier: "lastable".to_string(),
            software_identifier: "lastable".to_string(),
            creation_day_of_year: 42,
            creation_year: 2026,
            header_size: version.header_size(),
            data_offset: u32::from(version.header_size()),
            number_of_vlrs: 0,
            point_format: 0,
            point_record_length: 20,
            legacy_point_count: 10,
            legacy_point_count_by_return: [10, 0, 0, 0, 0],
            scales: [1e-4, 1e-4, 1e-4],
            offsets: [0.0, 0.0, 0.0],
            ranges: [9.0, 0.0, 9.0, 0.0, 9.0, 0.0],
            waveform_data_start: 0,
            evlr_start: 0,
            evlr_count: 0,
            point_count: 10,
            point_count_by_return: [10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        }
    }

    #[test]
    fn round_trip_1_2() {
        let header = sample(Version::new(1, 2));
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(227, buf.len());
        let back = RawHeader::read_from(Cursor::new(buf)).unwrap();
        assert_eq!(header.file_source_id, back.file_source_id);
        assert_eq!(header.legacy_point_count, back.legacy_point_count);
        assert_eq!(0, back.point_count);
    }

    #[test]
    fn round_trip_1_3() {
        let mut header = sample(Version::new(1, 3));
        header.waveform_data_start = 1234;
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(235, buf.len());
        let back = RawHeader::read_from(Cursor::new(buf)).unwrap();
        assert_eq!(1234, back.waveform_data_start);
    }

    #[test]
    fn round_trip_1_4() {
        let header = sample(Version::new(1, 4));
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(375, buf.len());
        let back = RawHeader::read_from(Cursor::new(buf)).unwrap();
        assert_eq!(header.point_count, back.point_count);
        assert_eq!(header.point_count_by_return, back.point_count_by_return);
    }
}

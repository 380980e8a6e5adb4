//! The wire-shaped point record: the fixed fields every point format reads and writes, before any
//! documented user columns or undocumented trailing bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::classification::Classification;
use crate::color::Color;
use crate::point::flags::{ExtendedFlags, LegacyFlags};
use crate::point::format::Format;
use crate::point::scan_angle::ScanAngle;
use crate::point::waveform::Waveform;
use crate::Result;

/// The return/scan/classification flag fields, in whichever of the two wire shapes the point's
/// format uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointFlags {
    /// The single flag byte plus packed classification byte used by formats 0 through 5.
    TwoByte(LegacyFlags, Classification),
    /// The two flag bytes plus bare classification byte used by formats 6 through 10.
    ThreeByte(ExtendedFlags, u8),
}

impl PointFlags {
    /// Returns the return number, 0 through 7 (legacy) or 0 through 15 (extended).
    pub fn return_number(&self) -> u8 {
        match self {
            PointFlags::TwoByte(f, _) => f.return_number,
            PointFlags::ThreeByte(f, _) => f.return_number,
        }
    }

    /// Returns the number of returns, 0 through 7 (legacy) or 0 through 15 (extended).
    pub fn number_of_returns(&self) -> u8 {
        match self {
            PointFlags::TwoByte(f, _) => f.number_of_returns,
            PointFlags::ThreeByte(f, _) => f.number_of_returns,
        }
    }

    /// Returns the scanner's sweep direction.
    pub fn scan_direction(&self) -> bool {
        match self {
            PointFlags::TwoByte(f, _) => f.scan_direction,
            PointFlags::ThreeByte(f, _) => f.scan_direction,
        }
    }

    /// Returns whether this point is the last one in its scan line.
    pub fn edge_of_flight_line(&self) -> bool {
        match self {
            PointFlags::TwoByte(f, _) => f.edge_of_flight_line,
            PointFlags::ThreeByte(f, _) => f.edge_of_flight_line,
        }
    }

    /// Returns the class number.
    pub fn classification(&self) -> u8 {
        match self {
            PointFlags::TwoByte(_, c) => c.class,
            PointFlags::ThreeByte(_, c) => *c,
        }
    }

    /// Returns whether this point was created by a model rather than observed.
    pub fn synthetic(&self) -> bool {
        match self {
            PointFlags::TwoByte(_, c) => c.synthetic,
            PointFlags::ThreeByte(f, _) => f.synthetic,
        }
    }

    /// Returns whether this point is a model key-point.
    pub fn key_point(&self) -> bool {
        match self {
            PointFlags::TwoByte(_, c) => c.key_point,
            PointFlags::ThreeByte(f, _) => f.key_point,
        }
    }

    /// Returns whether this point is withheld from further use.
    pub fn withheld(&self) -> bool {
        match self {
            PointFlags::TwoByte(_, c) => c.withheld,
            PointFlags::ThreeByte(f, _) => f.withheld,
        }
    }

    /// Returns whether this point overlaps another scan; always `false` for legacy formats.
    pub fn overlap(&self) -> bool {
        match self {
            PointFlags::TwoByte(..) => false,
            PointFlags::ThreeByte(f, _) => f.overlap,
        }
    }

    /// Returns the scanner channel, 0 through 3; always 0 for legacy formats.
    pub fn scanner_channel(&self) -> u8 {
        match self {
            PointFlags::TwoByte(..) => 0,
            PointFlags::ThreeByte(f, _) => f.scanner_channel,
        }
    }
}

/// The fixed, format-defined portion of one point record, in raw wire units: signed-32
/// coordinates, unconverted scan angle, unconverted intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawPoint {
    /// Raw x coordinate; apply scale and offset to obtain a real position.
    pub x: i32,
    /// Raw y coordinate; apply scale and offset to obtain a real position.
    pub y: i32,
    /// Raw z coordinate; apply scale and offset to obtain a real position.
    pub z: i32,
    /// Pulse return strength.
    pub intensity: u16,
    /// Return/scan/classification flags, in whichever wire shape the format uses.
    pub flags: PointFlags,
    /// Scan angle, in whichever wire width the format uses.
    pub scan_angle: ScanAngle,
    /// Operator-defined byte, meaning left to the producer.
    pub user_data: u8,
    /// Identifier of the flight line or source this point came from.
    pub point_source_id: u16,
    /// GPS time, present when the format has a time field.
    pub gps_time: Option<f64>,
    /// Color channels, present when the format has color.
    pub color: Option<Color>,
    /// Near-infrared channel, present when the format has NIR.
    pub nir: Option<u16>,
    /// Waveform sub-fields, present when the format has waveform data.
    pub waveform: Option<Waveform>,
}

impl RawPoint {
    /// Reads one raw point record for `format` from `read`.
    pub fn read_from<R: Read>(mut read: R, format: Format) -> Result<RawPoint> {
        let x = read.read_i32::<LittleEndian>()?;
        let y = read.read_i32::<LittleEndian>()?;
        let z = read.read_i32::<LittleEndian>()?;
        let intensity = read.read_u16::<LittleEndian>()?;

        let flags = if format.is_extended() {
            let byte1 = read.read_u8()?;
            let byte2 = read.read_u8()?;
            let classification = read.read_u8()?;
            PointFlags::ThreeByte(ExtendedFlags::from_bytes(byte1, byte2), classification)
        } else {
            let flag_byte = read.read_u8()?;
            let classification_byte = read.read_u8()?;
            PointFlags::TwoByte(
                LegacyFlags::from_byte(flag_byte),
                Classification::from_byte(classification_byte),
            )
        };

        let scan_angle = if format.is_extended() {
            ScanAngle::Scaled(read.read_i16::<LittleEndian>()?)
        } else {
            ScanAngle::Rank(read.read_i8()?)
        };

        let user_data = read.read_u8()?;
        let point_source_id = read.read_u16::<LittleEndian>()?;

        let gps_time = if format.has_gps_time() {
            Some(read.read_f64::<LittleEndian>()?)
        } else {
            None
        };

        let color = if format.has_color() {
            let red = read.read_u16::<LittleEndian>()?;
            let green = read.read_u16::<LittleEndian>()?;
            let blue = read.read_u16::<LittleEndian>()?;
            Some(Color::new(red, green, blue))
        } else {
            None
        };

        let nir = if format.has_nir() {
            Some(read.read_u16::<LittleEndian>()?)
        } else {
            None
        };

        let waveform = if format.has_waveform() {
            let descriptor_index = read.read_u8()?;
            let offset = read.read_u64::<LittleEndian>()?;
            let size = read.read_u32::<LittleEndian>()?;
            let return_location = read.read_f32::<LittleEndian>()?;
            let x_t = read.read_f32::<LittleEndian>()?;
            let y_t = read.read_f32::<LittleEndian>()?;
            let z_t = read.read_f32::<LittleEndian>()?;
            Some(Waveform::new(
                descriptor_index,
                offset,
                size,
                return_location,
                x_t,
                y_t,
                z_t,
            ))
        } else {
            None
        };

        Ok(RawPoint {
            x,
            y,
            z,
            intensity,
            flags,
            scan_angle,
            user_data,
            point_source_id,
            gps_time,
            color,
            nir,
            waveform,
        })
    }

    /// Writes this raw point record for `format` to `write`.
    pub fn write_to<W: Write>(&self, mut write: W, format: Format) -> Result<()> {
        write.write_i32::<LittleEndian>(self.x)?;
        write.write_i32::<LittleEndian>(self.y)?;
        write.write_i32::<LittleEndian>(self.z)?;
        write.write_u16::<LittleEndian>(self.intensity)?;

        match &self.flags {
            PointFlags::ThreeByte(flags, classification) => {
                let (byte1, byte2) = flags.to_bytes();
                write.write_u8(byte1)?;
                write.write_u8(byte2)?;
                write.write_u8(*classification)?;
            }
            PointFlags::TwoByte(flags, classification) => {
                write.write_u8(flags.to_byte())?;
                write.write_u8(classification.to_byte())?;
            }
        }

        match self.scan_angle {
            ScanAngle::Scaled(raw) => write.write_i16::<LittleEndian>(raw)?,
            ScanAngle::Rank(raw) => write.write_i8(raw)?,
        }

        write.write_u8(self.user_data)?;
        write.write_u16::<LittleEndian>(self.point_source_id)?;

        if format.has_gps_time() {
            let gps_time = self.gps_time.unwrap_or(0.0);
            write.write_f64::<LittleEndian>(gps_time)?;
        }

        if format.has_color() {
            let color = self.color.unwrap_or_default();
            write.write_u16::<LittleEndian>(color.red)?;
            write.write_u16::<LittleEndian>(color.green)?;
            write.write_u16::<LittleEndian>(color.blue)?;
        }

        if format.has_nir() {
            write.write_u16::<LittleEndian>(self.nir.unwrap_or(0))?;
        }

        if format.has_waveform() {
            let waveform = self.waveform.unwrap_or_default();
            write.write_u8(waveform.descriptor_index)?;
            write.write_u64::<LittleEndian>(waveform.offset)?;
            write.write_u32::<LittleEndian>(waveform.size)?;
            write.write_f32::<LittleEndian>(waveform.return_location)?;
            write.write_f32::<LittleEndian>(waveform.x_t)?;
            write.write_f32::<LittleEndian>(waveform.y_t)?;
            write.write_f32::<LittleEndian>(waveform.z_t)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_legacy(format: Format) -> RawPoint {
        RawPoint {
            x: 100,
            y: -200,
            z: 300,
            intensity: 1234,
            flags: PointFlags::TwoByte(
                LegacyFlags::new(5, 5, true, true),
                Classification::new(31, true, false, true),
            ),
            scan_angle: ScanAngle::Rank(45),
            user_data: 7,
            point_source_id: 42,
            gps_time: if format.has_gps_time() {
                Some(123.456)
            } else {
                None
            },
            color: if format.has_color() {
                Some(Color::new(1, 2, 3))
            } else {
                None
            },
            nir: None,
            waveform: None,
        }
    }

    #[test]
    fn round_trip_format_0() {
        let format = Format::new(0).unwrap();
        let point = sample_legacy(format);
        let mut buf = Vec::new();
        point.write_to(&mut buf, format).unwrap();
        assert_eq!(format.len() as usize, buf.len());
        let back = RawPoint::read_from(Cursor::new(buf), format).unwrap();
        assert_eq!(point, back);
    }

    #[test]
    fn round_trip_format_3_with_time_and_color() {
        let format = Format::new(3).unwrap();
        let point = sample_legacy(format);
        let mut buf = Vec::new();
        point.write_to(&mut buf, format).unwrap();
        assert_eq!(format.len() as usize, buf.len());
        let back = RawPoint::read_from(Cursor::new(buf), format).unwrap();
        assert_eq!(point, back);
    }

    #[test]
    fn scenario_bit_pack_boundaries_legacy() {
        let format = Format::new(0).unwrap();
        let point = sample_legacy(format);
        let mut buf = Vec::new();
        point.write_to(&mut buf, format).unwrap();
        assert_eq!(0xED, buf[14]);
        assert_eq!(0xBF, buf[15]);
    }

    #[test]
    fn round_trip_extended_format_with_waveform() {
        let format = Format::new(10).unwrap();
        let point = RawPoint {
            x: 1,
            y: 2,
            z: 3,
            intensity: 10,
            flags: PointFlags::ThreeByte(
                ExtendedFlags::new(15, 15, true, false, true, true, 3, true, false),
                31,
            ),
            scan_angle: ScanAngle::scaled_from_degrees(12.0),
            user_data: 1,
            point_source_id: 1,
            gps_time: Some(1.0),
            color: Some(Color::new(1, 2, 3)),
            nir: Some(4),
            waveform: Some(Waveform::new(1, 2, 3, 4.0, 5.0, 6.0, 7.0)),
        };
        let mut buf = Vec::new();
        point.write_to(&mut buf, format).unwrap();
        assert_eq!(format.len() as usize, buf.len());
        let back = RawPoint::read_from(Cursor::new(buf), format).unwrap();
        assert_eq!(point, back);
    }
}

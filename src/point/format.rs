//! The 11 point record shapes and the semantic columns each one can carry.

use crate::{Error, Result, Version};
use std::fmt;

/// One of the semantic columns a point format may or may not support.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Column {
    Position,
    Intensity,
    ReturnNumber,
    NumberOfReturns,
    ScanDirection,
    EdgeOfFlightLine,
    Synthetic,
    KeyPoint,
    Withheld,
    Overlap,
    ScannerChannel,
    Classification,
    ScanAngle,
    UserData,
    PointSourceId,
    GpsTime,
    Color,
    Nir,
    WaveformDescriptorIndex,
    WaveformOffset,
    WaveformSize,
    WaveformReturnLocation,
    WaveformXyzDerivatives,
}

/// A point record format, identified by a value 0 through 10.
///
/// Each format is a fixed-size binary record shape; see the per-format table in the module docs
/// for byte sizes and minimum spec versions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Format(u8);

struct Descriptor {
    size: u16,
    has_time: bool,
    has_color: bool,
    has_nir: bool,
    has_waveform: bool,
    is_extended: bool,
    min_minor: u8,
}

const DESCRIPTORS: [Descriptor; 11] = [
    Descriptor {
        size: 20,
        has_time: false,
        has_color: false,
        has_nir: false,
        has_waveform: false,
        is_extended: false,
        min_minor: 1,
    },
    Descriptor {
        size: 28,
        has_time: true,
        has_color: false,
        has_nir: false,
        has_waveform: false,
        is_extended: false,
        min_minor: 1,
    },
    Descriptor {
        size: 26,
        has_time: false,
        has_color: true,
        has_nir: false,
        has_waveform: false,
        is_extended: false,
        min_minor: 2,
    },
    Descriptor {
        size: 34,
        has_time: true,
        has_color: true,
        has_nir: false,
        has_waveform: false,
        is_extended: false,
        min_minor: 2,
    },
    Descriptor {
        size: 57,
        has_time: true,
        has_color: false,
        has_nir: false,
        has_waveform: true,
        is_extended: false,
        min_minor: 3,
    },
    Descriptor {
        size: 63,
        has_time: true,
        has_color: true,
        has_nir: false,
        has_waveform: true,
        is_extended: false,
        min_minor: 3,
    },
    Descriptor {
        size: 30,
        has_time: true,
        has_color: false,
        has_nir: false,
        has_waveform: false,
        is_extended: true,
        min_minor: 4,
    },
    Descriptor {
        size: 36,
        has_time: true,
        has_color: true,
        has_nir: false,
        has_waveform: false,
        is_extended: true,
        min_minor: 4,
    },
    Descriptor {
        size: 38,
        has_time: true,
        has_color: true,
        has_nir: true,
        has_waveform: false,
        is_extended: true,
        min_minor: 4,
    },
    Descriptor {
        size: 59,
        has_time: true,
        has_color: false,
        has_nir: false,
        has_waveform: true,
        is_extended: true,
        min_minor: 4,
    },
    Descriptor {
        size: 67,
        has_time: true,
        has_color: true,
        has_nir: true,
        has_waveform: true,
        is_extended: true,
        min_minor: 4,
    },
];

impl Format {
    /// Creates a format from its numeric id, checking that it's in `0..=10`.
    ///
    /// ```
    /// use lastable::point::Format;
    /// assert!(Format::new(10).is_ok());
    /// assert!(Format::new(11).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Format> {
        if (n as usize) < DESCRIPTORS.len() {
            Ok(Format(n))
        } else {
            Err(Error::UnsupportedPointFormat {
                format: n,
                version: Version::default(),
            })
        }
    }

    fn descriptor(&self) -> &'static Descriptor {
        &DESCRIPTORS[self.0 as usize]
    }

    /// Returns the numeric id, 0 through 10.
    pub fn to_u8(&self) -> u8 {
        self.0
    }

    /// Returns the fixed byte size of this format's record, not counting extra bytes.
    pub fn len(&self) -> u16 {
        self.descriptor().size
    }

    /// Returns true iff this format carries a GPS time field.
    pub fn has_gps_time(&self) -> bool {
        self.descriptor().has_time
    }

    /// Returns true iff this format carries red/green/blue color fields.
    pub fn has_color(&self) -> bool {
        self.descriptor().has_color
    }

    /// Returns true iff this format carries a near-infrared field.
    pub fn has_nir(&self) -> bool {
        self.descriptor().has_nir
    }

    /// Returns true iff this format carries waveform sub-fields.
    pub fn has_waveform(&self) -> bool {
        self.descriptor().has_waveform
    }

    /// Returns true iff this format uses the "extended" (formats 6-10) flag/classification/scan
    /// angle layout, as opposed to the legacy (0-5) layout.
    pub fn is_extended(&self) -> bool {
        self.descriptor().is_extended
    }

    /// Returns the minimum LAS spec version able to carry this format.
    ///
    /// ```
    /// use lastable::point::Format;
    /// use lastable::Version;
    /// assert_eq!(Version::new(1, 1), Format::new(0).unwrap().min_version());
    /// assert_eq!(Version::new(1, 4), Format::new(6).unwrap().min_version());
    /// ```
    pub fn min_version(&self) -> Version {
        Version::new(1, self.descriptor().min_minor)
    }

    /// Returns the set of semantic [`Column`]s this format can represent.
    pub fn columns(&self) -> Vec<Column> {
        let d = self.descriptor();
        let mut columns = vec![
            Column::Position,
            Column::Intensity,
            Column::ReturnNumber,
            Column::NumberOfReturns,
            Column::ScanDirection,
            Column::EdgeOfFlightLine,
            Column::Synthetic,
            Column::KeyPoint,
            Column::Withheld,
            Column::Classification,
            Column::ScanAngle,
            Column::UserData,
            Column::PointSourceId,
        ];
        if d.is_extended {
            columns.push(Column::Overlap);
            columns.push(Column::ScannerChannel);
        }
        if d.has_time {
            columns.push(Column::GpsTime);
        }
        if d.has_color {
            columns.push(Column::Color);
        }
        if d.has_nir {
            columns.push(Column::Nir);
        }
        if d.has_waveform {
            columns.push(Column::WaveformDescriptorIndex);
            columns.push(Column::WaveformOffset);
            columns.push(Column::WaveformSize);
            columns.push(Column::WaveformReturnLocation);
            columns.push(Column::WaveformXyzDerivatives);
        }
        columns
    }

    /// Returns true iff this format supports every column in `required`.
    pub fn supports_all(&self, required: &[Column]) -> bool {
        let supported = self.columns();
        required.iter().all(|c| supported.contains(c))
    }
}

/// Chooses the smallest-numbered format whose supported columns are a superset of
/// `required_columns`.
///
/// ```
/// use lastable::point::format::{select_point_format, Column};
/// let format = select_point_format(&[Column::Position, Column::Color]).unwrap();
/// assert_eq!(2, format.to_u8());
/// ```
pub fn select_point_format(required_columns: &[Column]) -> Result<Format> {
    (0..DESCRIPTORS.len() as u8)
        .map(|n| Format(n))
        .find(|format| format.supports_all(required_columns))
        .ok_or_else(|| {
            Error::UnrepresentableColumns(required_columns.iter().map(|c| format!("{c:?}")).collect())
        })
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Format {
    type Error = Error;

    fn try_from(n: u8) -> Result<Format> {
        Format::new(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_spec_table() {
        let sizes = [20, 28, 26, 34, 57, 63, 30, 36, 38, 59, 67];
        for (n, &size) in sizes.iter().enumerate() {
            assert_eq!(size, Format::new(n as u8).unwrap().len());
        }
    }

    #[test]
    fn min_versions_match_spec_table() {
        let expected = [1, 1, 2, 2, 3, 3, 4, 4, 4, 4, 4];
        for (n, &minor) in expected.iter().enumerate() {
            assert_eq!(
                Version::new(1, minor),
                Format::new(n as u8).unwrap().min_version()
            );
        }
    }

    #[test]
    fn select_smallest_format() {
        let format = select_point_format(&[Column::Position]).unwrap();
        assert_eq!(0, format.to_u8());
        let format = select_point_format(&[Column::Position, Column::GpsTime]).unwrap();
        assert_eq!(1, format.to_u8());
        let format = select_point_format(&[Column::Position, Column::Color]).unwrap();
        assert_eq!(2, format.to_u8());
        let format =
            select_point_format(&[Column::Position, Column::Color, Column::Nir]).unwrap();
        assert_eq!(8, format.to_u8());
    }

    #[test]
    fn unrepresentable_columns() {
        // No format supports waveform without gps time being implied separately; but every
        // combination below is actually representable, so check a truly impossible one:
        // overlap is only on extended (6-10) formats, but format 10 supports everything we have,
        // so there is no unrepresentable combination among real columns. Format::new still
        // bounds-checks invalid numeric ids.
        assert!(Format::new(11).is_err());
    }
}

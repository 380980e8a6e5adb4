//! Assembling a [`Header`](super::Header) from its public fields, deferring validation to
//! [`Builder::into_header`].

use chrono::NaiveDate;
use uuid::Uuid;

use crate::bounds::SpatialInfo;
use crate::global_encoding::GlobalEncoding;
use crate::point::Format;
use crate::{Error, Result, Version};

use super::Header;

/// A struct of public fields mirroring [`Header`], used to construct or reconcile one.
///
/// Fields default the way a fresh dataset would: version 1.2, point format 0, a nil GUID, empty
/// identifiers, and a default-scale spatial info with an empty range.
#[derive(Clone, Debug)]
pub struct Builder {
    pub version: Version,
    pub file_source_id: u16,
    pub global_encoding: GlobalEncoding,
    pub project_id: Uuid,
    pub system_identifier: String,
    pub software_identifier: String,
    pub creation_date: Option<NaiveDate>,
    pub point_format: Format,
    pub spatial: SpatialInfo,
}

impl Builder {
    /// Validates the accumulated fields and produces a [`Header`].
    ///
    /// Fails with [`Error::UnsupportedVersion`] if `version` doesn't support `point_format`, and
    /// with [`Error::InconsistentHeader`] if `point_format` requires the WKT global-encoding bit
    /// but it isn't set.
    pub fn into_header(self) -> Result<Header> {
        self.version.validate()?;
        if !self.version.supports_point_format(self.point_format) {
            return Err(Error::UnsupportedPointFormat {
                format: self.point_format.to_u8(),
                version: self.version,
            });
        }
        if self.point_format.to_u8() >= 6 && !self.global_encoding.has_wkt_crs() {
            return Err(Error::InconsistentHeader(
                "point formats 6 and up require the WKT global-encoding bit".to_string(),
            ));
        }
        let point_record_length = self.point_format.len();
        let header_size = self.version.header_size();
        Ok(Header {
            version: self.version,
            file_source_id: self.file_source_id,
            global_encoding: self.global_encoding,
            project_id: self.project_id,
            system_identifier: self.system_identifier,
            software_identifier: self.software_identifier,
            creation_date: self.creation_date,
            point_format: self.point_format,
            point_record_length,
            spatial: self.spatial,
            point_count: 0,
            point_count_by_return: [0; 15],
            vlr_count: 0,
            evlr_count: 0,
            data_offset: u32::from(header_size),
            evlr_start: 0,
            waveform_data_start: 0,
        })
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder {
            version: Version::default(),
            file_source_id: 0,
            global_encoding: GlobalEncoding::default(),
            project_id: Uuid::nil(),
            system_identifier: String::new(),
            software_identifier: String::new(),
            creation_date: None,
            point_format: Format::new(0).expect("format 0 is always valid"),
            spatial: SpatialInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_produces_a_valid_header() {
        let header = Builder::default().into_header().unwrap();
        assert_eq!(Version::new(1, 2), header.version);
        assert_eq!(0, header.point_format.to_u8());
    }

    #[test]
    fn high_format_without_wkt_bit_fails() {
        let mut builder = Builder::default();
        builder.point_format = Format::new(6).unwrap();
        builder.version = Version::new(1, 4);
        assert!(builder.into_header().is_err());
    }

    #[test]
    fn high_format_with_wkt_bit_succeeds() {
        let mut builder = Builder::default();
        builder.point_format = Format::new(6).unwrap();
        builder.version = Version::new(1, 4);
        builder.global_encoding.set_wkt_crs(true);
        assert!(builder.into_header().is_ok());
    }
}

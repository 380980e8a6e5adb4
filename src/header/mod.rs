//! The LAS header block: file-level metadata, the active point format, and the spatial
//! reconciliation between raw integer coordinates and real-valued positions.

pub mod builder;
pub mod raw;

use chrono::NaiveDate;
use uuid::Uuid;

pub use builder::Builder;
use raw::RawHeader;

use crate::bounds::SpatialInfo;
use crate::feature::{Evlrs, GpsStandardTime, SyntheticReturnNumbers, Waveforms, Wkt};
use crate::global_encoding::GlobalEncoding;
use crate::point::Format;
use crate::{Error, Result, Version};

/// The reconciled header: every field of the wire layout, plus the derived point format and
/// spatial info used by the rest of the library.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub(crate) version: Version,
    pub(crate) file_source_id: u16,
    pub(crate) global_encoding: GlobalEncoding,
    pub(crate) project_id: Uuid,
    pub(crate) system_identifier: String,
    pub(crate) software_identifier: String,
    pub(crate) creation_date: Option<NaiveDate>,
    pub(crate) point_format: Format,
    pub(crate) point_record_length: u16,
    pub(crate) spatial: SpatialInfo,
    pub(crate) point_count: u64,
    pub(crate) point_count_by_return: [u64; 15],
    pub(crate) vlr_count: u32,
    pub(crate) evlr_count: u32,
    pub(crate) data_offset: u32,
    pub(crate) evlr_start: u64,
    pub(crate) waveform_data_start: u64,
}

impl Header {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn file_source_id(&self) -> u16 {
        self.file_source_id
    }

    pub fn set_file_source_id(&mut self, id: u16) {
        self.file_source_id = id;
    }

    pub fn global_encoding(&self) -> GlobalEncoding {
        self.global_encoding
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn set_project_id(&mut self, id: Uuid) {
        self.project_id = id;
    }

    pub fn system_identifier(&self) -> &str {
        &self.system_identifier
    }

    pub fn set_system_identifier(&mut self, value: impl Into<String>) {
        self.system_identifier = value.into();
    }

    pub fn software_identifier(&self) -> &str {
        &self.software_identifier
    }

    pub fn set_software_identifier(&mut self, value: impl Into<String>) {
        self.software_identifier = value.into();
    }

    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.creation_date
    }

    pub fn set_creation_date(&mut self, date: Option<NaiveDate>) {
        self.creation_date = date;
    }

    pub fn point_format(&self) -> Format {
        self.point_format
    }

    pub fn point_record_length(&self) -> u16 {
        self.point_record_length
    }

    pub(crate) fn set_point_record_length(&mut self, length: u16) {
        self.point_record_length = length;
    }

    pub fn spatial(&self) -> &SpatialInfo {
        &self.spatial
    }

    pub fn spatial_mut(&mut self) -> &mut SpatialInfo {
        &mut self.spatial
    }

    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    pub fn point_count_by_return(&self) -> &[u64; 15] {
        &self.point_count_by_return
    }

    pub fn vlr_count(&self) -> u32 {
        self.vlr_count
    }

    pub(crate) fn set_vlr_count(&mut self, count: u32) {
        self.vlr_count = count;
    }

    pub fn evlr_count(&self) -> u32 {
        self.evlr_count
    }

    pub(crate) fn set_evlr_count(&mut self, count: u32) {
        self.evlr_count = count;
    }

    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    pub(crate) fn set_data_offset(&mut self, offset: u32) {
        self.data_offset = offset;
    }

    pub fn evlr_start(&self) -> u64 {
        self.evlr_start
    }

    pub(crate) fn set_evlr_start(&mut self, start: u64) {
        self.evlr_start = start;
    }

    pub fn waveform_data_start(&self) -> u64 {
        self.waveform_data_start
    }

    pub(crate) fn set_waveform_data_start(&mut self, start: u64) {
        self.waveform_data_start = start;
    }

    /// The size, in bytes, of the fixed header block for this header's current version.
    pub fn header_size(&self) -> u16 {
        self.version.header_size()
    }

    /// Changes the spec version, adjusting `header_size`, `data_offset`, and the point counts so
    /// the header stays internally consistent.
    ///
    /// Fails with [`Error::UnsupportedVersion`] if `new_v` is outside 1.1..=1.4, or with
    /// [`Error::UnsupportedPointFormat`] if the current point format isn't representable in
    /// `new_v`.
    pub fn set_las_version(&mut self, new_v: Version) -> Result<()> {
        new_v.validate()?;
        if !new_v.supports_point_format(self.point_format) {
            return Err(Error::UnsupportedPointFormat {
                format: self.point_format.to_u8(),
                version: new_v,
            });
        }
        let old_size = self.header_size();
        let new_size = new_v.header_size();
        self.version = new_v;
        if new_size != old_size {
            self.data_offset = self
                .data_offset
                .wrapping_add(u32::from(new_size))
                .wrapping_sub(u32::from(old_size));
        }
        self.refresh_counts()?;
        Ok(())
    }

    /// Changes the point format, upgrading the spec version automatically (never downgrading it)
    /// if the new format requires a later one, and adjusting the point-record length by the size
    /// delta.
    ///
    /// Fails with [`Error::InconsistentHeader`] if `new_fmt` is 6 or above and the WKT
    /// global-encoding bit isn't already set.
    pub fn set_point_format(&mut self, new_fmt: Format) -> Result<()> {
        if new_fmt.to_u8() >= 6 && !self.global_encoding.has_wkt_crs() {
            return Err(Error::InconsistentHeader(
                "point formats 6 and up require the WKT global-encoding bit".to_string(),
            ));
        }
        let required = new_fmt.min_version();
        if self.version < required {
            log::warn!(
                "upgrading las version from {} to {required} to support point format {}",
                self.version,
                new_fmt
            );
            self.version = required;
        }
        let delta = i32::from(new_fmt.len()) - i32::from(self.point_format.len());
        self.point_format = new_fmt;
        self.point_record_length = (i32::from(self.point_record_length) + delta) as u16;
        self.refresh_counts()?;
        Ok(())
    }

    /// Updates the point count, keeping the legacy 32-bit counter in sync when it still applies.
    ///
    /// Fails with [`Error::CountTooLarge`] if `n` exceeds `u32::MAX` and the legacy counter is
    /// the only one in play (spec version below 1.4, or point format 5 or below).
    pub fn set_point_record_count(&mut self, n: u64) -> Result<()> {
        let legacy_required = self.version.minor < 4 || self.point_format.to_u8() <= 5;
        if legacy_required && n > u64::from(u32::MAX) {
            return Err(Error::CountTooLarge(n));
        }
        self.point_count = n;
        Ok(())
    }

    /// Updates the per-return point counts, keeping the legacy five-slot counter in sync when it
    /// still applies.
    pub fn set_point_count_by_return(&mut self, counts: [u64; 15]) -> Result<()> {
        let legacy_required = self.version.minor < 4 || self.point_format.to_u8() <= 5;
        if legacy_required {
            for &count in &counts[5..] {
                if count > 0 {
                    return Err(Error::InconsistentHeader(
                        "legacy per-return counters only cover the first five returns"
                            .to_string(),
                    ));
                }
            }
            for &count in &counts[..5] {
                if count > u64::from(u32::MAX) {
                    return Err(Error::CountTooLarge(count));
                }
            }
        }
        self.point_count_by_return = counts;
        Ok(())
    }

    fn refresh_counts(&mut self) -> Result<()> {
        let n = self.point_count;
        let counts = self.point_count_by_return;
        self.set_point_record_count(n)?;
        self.set_point_count_by_return(counts)?;
        Ok(())
    }

    /// The legacy 32-bit point count, or `None` when it can't represent the current count.
    pub fn legacy_point_count(&self) -> Option<u32> {
        u32::try_from(self.point_count).ok()
    }

    pub fn is_gps_standard_time(&self) -> bool {
        self.global_encoding.is_gps_standard_time()
    }

    pub fn set_gps_standard_time(&mut self, value: bool) -> Result<()> {
        self.version.verify_support_for::<GpsStandardTime>()?;
        self.global_encoding.set_gps_standard_time(value);
        Ok(())
    }

    pub fn set_internal_waveform(&mut self, value: bool) -> Result<()> {
        self.version.verify_support_for::<Waveforms>()?;
        self.global_encoding.set_internal_waveform(value);
        Ok(())
    }

    pub fn set_external_waveform(&mut self, value: bool) -> Result<()> {
        self.version.verify_support_for::<Waveforms>()?;
        self.global_encoding.set_external_waveform(value);
        Ok(())
    }

    pub fn set_synthetic_return_numbers(&mut self, value: bool) -> Result<()> {
        self.version
            .verify_support_for::<SyntheticReturnNumbers>()?;
        self.global_encoding.set_synthetic_return_numbers(value);
        Ok(())
    }

    /// Returns the WKT-CRS bit, checking it against the point format it's required to agree with.
    ///
    /// Fails with [`Error::InconsistentHeader`] if the point format requires the bit but it's
    /// unset.
    pub fn wkt(&self) -> Result<bool> {
        let set = self.global_encoding.has_wkt_crs();
        if self.point_format.to_u8() >= 6 && !set {
            return Err(Error::InconsistentHeader(
                "point formats 6 and up require the WKT global-encoding bit".to_string(),
            ));
        }
        Ok(set)
    }

    pub fn set_wkt_crs(&mut self, value: bool) -> Result<()> {
        self.version.verify_support_for::<Wkt>()?;
        if self.point_format.to_u8() >= 6 && !value {
            return Err(Error::InconsistentHeader(
                "point formats 6 and up require the WKT global-encoding bit".to_string(),
            ));
        }
        self.global_encoding.set_wkt_crs(value);
        Ok(())
    }

    /// Decodes a header from its wire representation.
    pub fn from_raw(raw: RawHeader) -> Result<Header> {
        raw.version.validate()?;
        let point_format = Format::new(raw.point_format)?;
        if !raw.version.supports_point_format(point_format) {
            return Err(Error::UnsupportedPointFormat {
                format: raw.point_format,
                version: raw.version,
            });
        }
        if raw.version.minor >= 4 {
            raw.version.verify_support_for::<Evlrs>()?;
        }
        let creation_date = NaiveDate::from_yo_opt(
            i32::from(raw.creation_year),
            u32::from(raw.creation_day_of_year),
        );
        let point_count = if raw.version.minor >= 4 {
            raw.point_count
        } else {
            u64::from(raw.legacy_point_count)
        };
        let mut point_count_by_return = [0u64; 15];
        if raw.version.minor >= 4 {
            point_count_by_return = raw.point_count_by_return;
        } else {
            for (slot, count) in point_count_by_return
                .iter_mut()
                .zip(raw.legacy_point_count_by_return.iter())
            {
                *slot = u64::from(*count);
            }
        }
        Ok(Header {
            version: raw.version,
            file_source_id: raw.file_source_id,
            global_encoding: GlobalEncoding::from(raw.global_encoding),
            project_id: raw.project_id,
            system_identifier: raw.system_identifier,
            software_identifier: raw.software_identifier,
            creation_date,
            point_format,
            point_record_length: raw.point_record_length,
            spatial: SpatialInfo {
                scale: crate::vector::AxisInfo::new(
                    raw.scales[0],
                    raw.scales[1],
                    raw.scales[2],
                ),
                offset: crate::vector::AxisInfo::new(
                    raw.offsets[0],
                    raw.offsets[1],
                    raw.offsets[2],
                ),
                range: crate::vector::AxisInfo::new(
                    crate::range::Range::new(raw.ranges[1], raw.ranges[0])?,
                    crate::range::Range::new(raw.ranges[3], raw.ranges[2])?,
                    crate::range::Range::new(raw.ranges[5], raw.ranges[4])?,
                ),
            },
            point_count,
            point_count_by_return,
            vlr_count: raw.number_of_vlrs,
            evlr_count: raw.evlr_count,
            data_offset: raw.data_offset,
            evlr_start: raw.evlr_start,
            waveform_data_start: raw.waveform_data_start,
        })
    }

    /// Encodes this header to its wire representation.
    pub fn to_raw(&self) -> Result<RawHeader> {
        let (creation_day_of_year, creation_year) = self
            .creation_date
            .map(|date| (date.format("%j").to_string(), date.format("%Y").to_string()))
            .map(|(day, year)| {
                (
                    day.parse::<u16>().unwrap_or(0),
                    year.parse::<u16>().unwrap_or(0),
                )
            })
            .unwrap_or((0, 0));

        let legacy_point_count = u32::try_from(self.point_count).unwrap_or(0);
        let mut legacy_point_count_by_return = [0u32; 5];
        for (slot, count) in legacy_point_count_by_return
            .iter_mut()
            .zip(self.point_count_by_return.iter())
        {
            *slot = u32::try_from(*count).unwrap_or(0);
        }

        Ok(RawHeader {
            file_source_id: self.file_source_id,
            global_encoding: self.global_encoding.into(),
            project_id: self.project_id,
            version: self.version,
            system_identifier: self.system_identifier.clone(),
            software_identifier: self.software_identifier.clone(),
            creation_day_of_year,
            creation_year,
            header_size: self.header_size(),
            data_offset: self.data_offset,
            number_of_vlrs: self.vlr_count,
            point_format: self.point_format.to_u8(),
            point_record_length: self.point_record_length,
            legacy_point_count,
            legacy_point_count_by_return,
            scales: [self.spatial.scale.x, self.spatial.scale.y, self.spatial.scale.z],
            offsets: [self.spatial.offset.x, self.spatial.offset.y, self.spatial.offset.z],
            ranges: [
                self.spatial.range.x.max,
                self.spatial.range.x.min,
                self.spatial.range.y.max,
                self.spatial.range.y.min,
                self.spatial.range.z.max,
                self.spatial.range.z.min,
            ],
            waveform_data_start: self.waveform_data_start,
            evlr_start: self.evlr_start,
            evlr_count: self.evlr_count,
            point_count: self.point_count,
            point_count_by_return: self.point_count_by_return,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_point_format_upgrades_version() {
        let mut header = Builder::default().into_header().unwrap();
        header.set_point_format(Format::new(6).unwrap()).unwrap_err();
        header.global_encoding.set_wkt_crs(true);
        header.set_point_format(Format::new(6).unwrap()).unwrap();
        assert_eq!(Version::new(1, 4), header.version());
    }

    #[test]
    fn set_point_record_count_rejects_overflow_for_legacy_format() {
        let mut header = Builder::default().into_header().unwrap();
        assert!(header
            .set_point_record_count(u64::from(u32::MAX) + 1)
            .is_err());
    }

    #[test]
    fn set_point_record_count_allows_overflow_for_1_4_with_high_format() {
        let mut builder = Builder::default();
        builder.version = Version::new(1, 4);
        builder.point_format = Format::new(6).unwrap();
        builder.global_encoding.set_wkt_crs(true);
        let mut header = builder.into_header().unwrap();
        assert!(header
            .set_point_record_count(u64::from(u32::MAX) + 1)
            .is_ok());
    }

    #[test]
    fn set_las_version_rejects_unsupported_format_combo() {
        let mut builder = Builder::default();
        builder.point_format = Format::new(6).unwrap();
        builder.version = Version::new(1, 4);
        builder.global_encoding.set_wkt_crs(true);
        let mut header = builder.into_header().unwrap();
        assert!(header.set_las_version(Version::new(1, 2)).is_err());
    }

    #[test]
    fn round_trip_through_raw() {
        let header = Builder::default().into_header().unwrap();
        let raw = header.to_raw().unwrap();
        let back = Header::from_raw(raw).unwrap();
        assert_eq!(header.version(), back.version());
        assert_eq!(header.point_format(), back.point_format());
    }

    #[test]
    fn wkt_getter_reflects_inconsistency() {
        let mut builder = Builder::default();
        builder.point_format = Format::new(6).unwrap();
        builder.version = Version::new(1, 4);
        builder.global_encoding.set_wkt_crs(true);
        let mut header = builder.into_header().unwrap();
        assert!(header.wkt().unwrap());
        header.global_encoding = GlobalEncoding::default();
        assert!(header.wkt().is_err());
    }
}

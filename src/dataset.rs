//! The dataset: the header, point table, VLR/EVLR lists, and user-defined bytes, kept mutually
//! consistent across every mutation.
//!
//! A [`Dataset`] is produced either by decoding a byte stream ([`Dataset::read_from`]) or by
//! assembling one from a [`PointTable`] ([`Dataset::assemble`], or [`Dataset::new`] for the
//! common case of a synthesized header). Every mutating method recomputes whatever header
//! counters, VLR bookkeeping, and spatial ranges its change affects, so a `Dataset` that exists at
//! all is always internally consistent.

use std::io::{Read, Write};

use crate::codec::{read as codec_read, write as codec_write};
use crate::color::Color;
use crate::crs::unit_to_metres;
use crate::header::{Builder, Header};
use crate::point::{select_point_format, Column, Format, Waveform};
use crate::range::Range;
use crate::schema::{field_specs_for_column, FieldSpec, ScalarType};
use crate::table::{PointTable, Row};
use crate::vector::AxisInfo;
use crate::vlr::payloads::ExtraBytesRecord;
use crate::vlr::{extract_vlr, Payload, Vlr};
use crate::{Error, Result, Version};

const EQUALITY_TOLERANCE: f64 = 1e-6;

/// A value to add or overwrite via [`Dataset::add_column`] or [`Dataset::merge_column`].
///
/// The three named variants cover the optional LAS columns a format can be upgraded to carry;
/// [`AddColumn::User`] covers a user-defined ("extra bytes") column of any supported scalar type
/// and arity.
#[derive(Clone, Debug)]
pub enum AddColumn {
    /// GPS time, one value per point.
    GpsTime(Vec<f64>),
    /// RGB color, one value per point.
    Color(Vec<Color>),
    /// Near-infrared, one value per point.
    Nir(Vec<u16>),
    /// Waveform sub-fields, one value per point.
    Waveform(Vec<Waveform>),
    /// A user-defined column, scalar or fixed-size vector.
    User {
        /// The column's name.
        name: String,
        /// The element scalar type.
        scalar: ScalarType,
        /// The number of components per point (1 for a plain scalar column).
        component_count: usize,
        /// One `Vec` of `component_count` values per point.
        values: Vec<Vec<f64>>,
    },
}

/// A fully reconciled LAS dataset.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub(crate) header: Header,
    pub(crate) table: PointTable,
    pub(crate) vlrs: Vec<Vlr>,
    pub(crate) evlrs: Vec<Vlr>,
    pub(crate) user_defined_bytes: Vec<u8>,
    pub(crate) unit_conversion: Option<AxisInfo<f64>>,
}

impl Dataset {
    /// Assembles a dataset from a point table, an optional header to reconcile against (or
    /// `None` to synthesize one), and the VLR/EVLR/user-defined-bytes inputs.
    ///
    /// If `header` is supplied but its point format can't represent every column present in
    /// `table`, the format is upgraded to the smallest one that can (a warning is logged). The
    /// extra-bytes VLR, point-record length, data offset, EVLR start, point counts, spatial
    /// ranges, and WKT bit are all recomputed from scratch regardless of what was passed in.
    pub fn assemble(
        table: PointTable,
        header: Option<Header>,
        mut vlrs: Vec<Vlr>,
        evlrs: Vec<Vlr>,
        user_defined_bytes: Vec<u8>,
    ) -> Result<Dataset> {
        crate::vlr::registry::ensure_builtins_registered();

        let required = present_las_columns(&table);
        let mut header = match header {
            Some(header) => header,
            None => {
                let mut builder = Builder::default();
                builder.point_format = select_point_format(&required)?;
                if !table.is_empty() {
                    builder.spatial.offset = synthesize_offset(&table, &builder.spatial.scale)?;
                }
                builder.into_header()?
            }
        };
        if !header.point_format().supports_all(&required) {
            let format = select_point_format(&required)?;
            log::warn!(
                "upgrading point format from {} to {format} to represent the supplied columns",
                header.point_format()
            );
            set_point_format_reconciled(&mut header, format)?;
        }

        reconcile_extra_bytes_vlr(&table, &mut vlrs);

        let mut dataset = Dataset {
            header,
            table,
            vlrs,
            evlrs,
            user_defined_bytes,
            unit_conversion: None,
        };
        dataset.reconcile()?;
        Ok(dataset)
    }

    /// Assembles a dataset from a point table alone, synthesizing a default header and no VLRs.
    pub fn new(table: PointTable) -> Result<Dataset> {
        Dataset::assemble(table, None, Vec::new(), Vec::new(), Vec::new())
    }

    /// Decodes a dataset from a stream positioned at the start of the header.
    ///
    /// If the file carries an OGC WKT VLR whose linear units aren't metric, every position is
    /// converted to metres on the way in; the conversion factor is recorded so
    /// [`Dataset::write_to`] can reverse it.
    pub fn read_from<R: Read>(read: R) -> Result<Dataset> {
        crate::vlr::registry::ensure_builtins_registered();
        let mut dataset = codec_read::read_from(read)?;
        if let Some(conversion) = unit_conversion_from_vlrs(&dataset.vlrs) {
            for i in 0..dataset.table.len() {
                dataset.table.x[i] *= conversion.x;
                dataset.table.y[i] *= conversion.y;
                dataset.table.z[i] *= conversion.z;
            }
            log::info!("converting positions by {conversion:?} to reconcile wkt units to metres");
            dataset.unit_conversion = Some(conversion);
        }
        Ok(dataset)
    }

    /// Encodes this dataset to a stream: header, VLRs, user-defined bytes, points, EVLRs.
    ///
    /// If a unit conversion was recorded at read time, positions are divided back out of metres
    /// before encoding, so the written file's native units round-trip.
    pub fn write_to<W: Write>(&self, write: W) -> Result<()> {
        match self.unit_conversion {
            None => codec_write::write_to(write, self),
            Some(conversion) => {
                let mut reversed = self.clone();
                for i in 0..reversed.table.len() {
                    reversed.table.x[i] /= conversion.x;
                    reversed.table.y[i] /= conversion.y;
                    reversed.table.z[i] /= conversion.z;
                }
                codec_write::write_to(write, &reversed)
            }
        }
    }

    /// The reconciled header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The columnar point table.
    pub fn table(&self) -> &PointTable {
        &self.table
    }

    /// The normal VLRs, in insertion order.
    pub fn vlrs(&self) -> &[Vlr] {
        &self.vlrs
    }

    /// The extended VLRs, in insertion order.
    pub fn evlrs(&self) -> &[Vlr] {
        &self.evlrs
    }

    /// The bytes between the last VLR and the first point record, if any.
    pub fn user_defined_bytes(&self) -> &[u8] {
        &self.user_defined_bytes
    }

    /// The per-axis factor, if any, applied to positions at read time to reconcile non-metric
    /// WKT units to metres.
    pub fn unit_conversion(&self) -> Option<AxisInfo<f64>> {
        self.unit_conversion
    }

    /// Adds a new column.
    ///
    /// Fails with [`Error::LengthMismatch`] unless the supplied values have one entry per point.
    /// For [`AddColumn::User`], fails if a column of that name already exists; use
    /// [`Dataset::merge_column`] to overwrite one in place. Recognized LAS columns (GPS time,
    /// color, near-infrared, waveform) upgrade the point format if the current one can't carry
    /// them, logging a warning.
    pub fn add_column(&mut self, column: AddColumn) -> Result<()> {
        if let AddColumn::User { ref name, .. } = column {
            if self.table.user_columns.contains_key(name) {
                return Err(Error::InconsistentHeader(format!(
                    "user column {name:?} already exists; use merge_column to overwrite it"
                )));
            }
        }
        self.set_column(column)
    }

    /// Adds or overwrites a column, in place if it already exists.
    pub fn merge_column(&mut self, column: AddColumn) -> Result<()> {
        self.set_column(column)
    }

    fn set_column(&mut self, column: AddColumn) -> Result<()> {
        let len = self.table.len();
        match column {
            AddColumn::GpsTime(values) => {
                check_len(&values, len)?;
                self.upgrade_format_for(Column::GpsTime)?;
                self.table.gps_time = values;
            }
            AddColumn::Color(values) => {
                check_len(&values, len)?;
                self.upgrade_format_for(Column::Color)?;
                self.table.color = values;
            }
            AddColumn::Nir(values) => {
                check_len(&values, len)?;
                self.upgrade_format_for(Column::Nir)?;
                self.table.nir = values;
            }
            AddColumn::Waveform(values) => {
                check_len(&values, len)?;
                self.upgrade_format_for(Column::WaveformDescriptorIndex)?;
                self.table.waveform = values;
            }
            AddColumn::User {
                name,
                scalar,
                component_count,
                values,
            } => {
                self.table.set_user_column(&name, scalar, component_count, &values)?;
            }
        }
        reconcile_extra_bytes_vlr(&self.table, &mut self.vlrs);
        self.reconcile()
    }

    fn upgrade_format_for(&mut self, column: Column) -> Result<()> {
        if self.header.point_format().supports_all(&[column]) {
            return Ok(());
        }
        let mut required = present_las_columns(&self.table);
        required.push(column);
        let format = select_point_format(&required)?;
        log::warn!(
            "upgrading point format from {} to {format} to support column {column:?}",
            self.header.point_format()
        );
        set_point_format_reconciled(&mut self.header, format)
    }

    /// Adds a VLR (or, if [`Vlr::into_extended`] was used, an EVLR).
    ///
    /// Fails with [`Error::DuplicateVlrId`] if a non-superseded VLR or EVLR with the same
    /// `(user_id, record_id)` already exists. Extended VLRs upgrade the spec version to 1.4 if it
    /// isn't already (a warning is logged).
    pub fn add_vlr(&mut self, vlr: Vlr) -> Result<()> {
        if !vlr.is_superseded() {
            let duplicate = self
                .vlrs
                .iter()
                .chain(self.evlrs.iter())
                .any(|existing| existing.key() == vlr.key() && !existing.is_superseded());
            if duplicate {
                return Err(Error::DuplicateVlrId {
                    user_id: vlr.user_id.clone(),
                    record_id: vlr.record_id,
                });
            }
        }
        if vlr.extended && self.header.version() < Version::new(1, 4) {
            log::warn!("upgrading las version to 1.4 to support extended vlrs");
            self.header.set_las_version(Version::new(1, 4))?;
        }
        if vlr.extended {
            self.evlrs.push(vlr);
        } else {
            self.vlrs.push(vlr);
        }
        self.reconcile()
    }

    /// Removes the VLR or EVLR matching `(user_id, record_id)`, returning it.
    ///
    /// Fails with [`Error::VlrNotFound`] if no such VLR exists.
    pub fn remove_vlr(&mut self, user_id: &str, record_id: u16) -> Result<Vlr> {
        if let Some(pos) = self
            .vlrs
            .iter()
            .position(|v| v.user_id == user_id && v.record_id == record_id)
        {
            let vlr = self.vlrs.remove(pos);
            self.reconcile()?;
            return Ok(vlr);
        }
        if let Some(pos) = self
            .evlrs
            .iter()
            .position(|v| v.user_id == user_id && v.record_id == record_id)
        {
            let vlr = self.evlrs.remove(pos);
            self.reconcile()?;
            return Ok(vlr);
        }
        Err(Error::VlrNotFound {
            user_id: user_id.to_string(),
            record_id,
        })
    }

    /// Marks the VLR or EVLR matching `(user_id, record_id)` as superseded, rewriting its record
    /// id to 7.
    ///
    /// Fails with [`Error::VlrNotFound`] if no such VLR exists, or with
    /// [`Error::InconsistentVlr`] if it isn't authored under `"LASF_Spec"`.
    pub fn set_superseded(&mut self, user_id: &str, record_id: u16) -> Result<()> {
        for vlr in self.vlrs.iter_mut().chain(self.evlrs.iter_mut()) {
            if vlr.user_id == user_id && vlr.record_id == record_id {
                vlr.set_superseded()?;
                return Ok(());
            }
        }
        Err(Error::VlrNotFound {
            user_id: user_id.to_string(),
            record_id,
        })
    }

    /// Appends rows to the point table, recomputing point counts and spatial ranges.
    ///
    /// A row missing a value for an existing user column is back-filled with zero (a warning is
    /// logged per missing column, not per row).
    pub fn add_points(&mut self, rows: Vec<Row>) -> Result<()> {
        for name in self.table.user_columns.keys() {
            if rows.iter().any(|row| !row.user_values.contains_key(name)) {
                log::warn!("some rows are missing a value for user column {name:?}; filling with zero");
            }
        }
        for row in rows {
            self.table.push(row)?;
        }
        self.recompute_counts()?;
        self.recompute_spatial_info();
        Ok(())
    }

    /// Removes the rows at `indices`, recomputing point counts and spatial ranges.
    pub fn remove_points(&mut self, indices: &[usize]) -> Result<()> {
        self.table.remove(indices)?;
        self.recompute_counts()?;
        self.recompute_spatial_info();
        Ok(())
    }

    /// Recomputes every derived piece of header state from the current table, VLRs, and EVLRs:
    /// point-record length, counts, spatial ranges, data offset, EVLR start, and the WKT bit.
    fn reconcile(&mut self) -> Result<()> {
        let length = record_length_for(&self.header, &self.table);
        self.header.set_point_record_length(length);
        self.recompute_counts()?;
        self.recompute_spatial_info();
        self.header.set_vlr_count(self.vlrs.len() as u32);
        self.header.set_evlr_count(self.evlrs.len() as u32);
        self.recompute_data_offset()?;
        self.recompute_evlr_start();
        self.recompute_wkt_bit()?;
        Ok(())
    }

    fn recompute_counts(&mut self) -> Result<()> {
        self.header.set_point_record_count(self.table.len() as u64)?;
        let mut counts = [0u64; 15];
        for &return_number in &self.table.return_number {
            if return_number > 0 {
                counts[(return_number as usize - 1).min(14)] += 1;
            }
        }
        self.header.set_point_count_by_return(counts)?;
        Ok(())
    }

    fn recompute_spatial_info(&mut self) {
        let n = self.table.len();
        let (min, max) = if n == 0 {
            (AxisInfo::new(0.0, 0.0, 0.0), AxisInfo::new(0.0, 0.0, 0.0))
        } else {
            crate::bounds::bounding_box(
                (0..n).map(|i| (self.table.x[i], self.table.y[i], self.table.z[i])),
            )
        };
        let spatial = self.header.spatial_mut();
        spatial.range.x = Range::new(min.x, max.x).unwrap_or_default();
        spatial.range.y = Range::new(min.y, max.y).unwrap_or_default();
        spatial.range.z = Range::new(min.z, max.z).unwrap_or_default();
    }

    fn recompute_data_offset(&mut self) -> Result<()> {
        let header_size = u64::from(self.header.header_size());
        let mut vlr_bytes = 0u64;
        for vlr in &self.vlrs {
            vlr_bytes += vlr.wire_size()?;
        }
        let offset = header_size + vlr_bytes + self.user_defined_bytes.len() as u64;
        let offset = u32::try_from(offset).map_err(|_| {
            Error::InconsistentHeader(format!("data offset {offset} does not fit a u32"))
        })?;
        self.header.set_data_offset(offset);
        Ok(())
    }

    fn recompute_evlr_start(&mut self) {
        if self.evlrs.is_empty() {
            self.header.set_evlr_start(0);
            return;
        }
        let start = u64::from(self.header.data_offset())
            + self.header.point_count() * u64::from(self.header.point_record_length());
        self.header.set_evlr_start(start);
    }

    fn recompute_wkt_bit(&mut self) -> Result<()> {
        let needs_wkt = self.header.point_format().to_u8() >= 6
            || extract_vlr(&self.vlrs, "LASF_Projection", 2112).is_some();
        if !needs_wkt {
            if self.header.version().minor < 4 {
                return Ok(());
            }
            return self.header.set_wkt_crs(false);
        }
        if self.header.version() < Version::new(1, 4) {
            log::warn!("upgrading las version to 1.4 to carry the wkt global-encoding bit");
            self.header.set_las_version(Version::new(1, 4))?;
        }
        self.header.set_wkt_crs(true)
    }
}

impl PartialEq for Dataset {
    /// Compares headers exactly, point tables column-by-column with an absolute tolerance of
    /// `1e-6` on floating-point fields, VLRs and EVLRs as order-insensitive sets, and
    /// user-defined bytes exactly.
    fn eq(&self, other: &Dataset) -> bool {
        self.header == other.header
            && self.user_defined_bytes == other.user_defined_bytes
            && vlr_sets_equal(&self.vlrs, &other.vlrs)
            && vlr_sets_equal(&self.evlrs, &other.evlrs)
            && tables_equal_within_tolerance(&self.table, &other.table)
    }
}

/// Calls [`Header::set_point_format`], first clearing the way for formats 6 and up: those require
/// both spec version 1.4 and the WKT global-encoding bit set, and `set_point_format` itself
/// refuses to flip either on the caller's behalf.
fn set_point_format_reconciled(header: &mut Header, format: Format) -> Result<()> {
    if format.to_u8() >= 6 {
        if header.version() < Version::new(1, 4) {
            header.set_las_version(Version::new(1, 4))?;
        }
        header.set_wkt_crs(true)?;
    }
    header.set_point_format(format)
}

fn check_len<T>(values: &[T], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(Error::LengthMismatch {
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

fn present_las_columns(table: &PointTable) -> Vec<Column> {
    let mut columns = vec![Column::Position];
    if table.has(Column::GpsTime) {
        columns.push(Column::GpsTime);
    }
    if table.has(Column::Color) {
        columns.push(Column::Color);
    }
    if table.has(Column::Nir) {
        columns.push(Column::Nir);
    }
    if table.has(Column::WaveformDescriptorIndex) {
        columns.push(Column::WaveformDescriptorIndex);
    }
    columns
}

/// Chooses a per-axis offset for a synthesized header from the table's bounding box, so the
/// default scale/offset pair actually represents every position in `table`.
///
/// Fails with [`Error::ScaleOutOfRange`] if no offset lets some axis's range round-trip through a
/// signed 32-bit raw coordinate at the given scale.
fn synthesize_offset(table: &PointTable, scale: &AxisInfo<f64>) -> Result<AxisInfo<f64>> {
    let n = table.len();
    let (min, max) = crate::bounds::bounding_box(
        (0..n).map(|i| (table.x[i], table.y[i], table.z[i])),
    );
    Ok(AxisInfo::new(
        crate::bounds::determine_offset(min.x, max.x, scale.x, crate::bounds::DEFAULT_OFFSET_THRESHOLD)?,
        crate::bounds::determine_offset(min.y, max.y, scale.y, crate::bounds::DEFAULT_OFFSET_THRESHOLD)?,
        crate::bounds::determine_offset(min.z, max.z, scale.z, crate::bounds::DEFAULT_OFFSET_THRESHOLD)?,
    ))
}

fn documented_schema(table: &PointTable) -> Vec<FieldSpec> {
    table
        .user_columns
        .iter()
        .flat_map(|(name, column)| field_specs_for_column(name, column.scalar, column.component_count))
        .collect()
}

fn record_length_for(header: &Header, table: &PointTable) -> u16 {
    let schema_size: usize = documented_schema(table).iter().map(FieldSpec::size).sum();
    let undocumented = table.undocumented_bytes.first().map_or(0, Vec::len);
    (header.point_format().len() as usize + schema_size + undocumented) as u16
}

/// Replaces the file's single `("LASF_Spec", 4)` extra-bytes VLR with one documenting `table`'s
/// current user columns, or removes it if there are none.
fn reconcile_extra_bytes_vlr(table: &PointTable, vlrs: &mut Vec<Vlr>) {
    vlrs.retain(|vlr| !(vlr.user_id == "LASF_Spec" && vlr.record_id == 4));
    let schema = documented_schema(table);
    if schema.is_empty() {
        return;
    }
    let records = schema
        .iter()
        .map(|field| ExtraBytesRecord::new(field.name.clone(), field.scalar))
        .collect();
    let vlr = Vlr::new("LASF_Spec", 4, "extra bytes", Payload::ExtraBytes(crate::vlr::payloads::ExtraBytes(records)))
        .expect("a freshly built extra-bytes vlr always has the correct record id");
    vlrs.push(vlr);
}

fn unit_conversion_from_vlrs(vlrs: &[Vlr]) -> Option<AxisInfo<f64>> {
    let wkt = match &extract_vlr(vlrs, "LASF_Projection", 2112)?.payload {
        Payload::Wkt(wkt) => wkt,
        _ => return None,
    };
    let horizontal = wkt.horizontal_unit.as_deref().and_then(unit_to_metres).unwrap_or(1.0);
    let vertical = wkt.vertical_unit.as_deref().and_then(unit_to_metres).unwrap_or(1.0);
    if (horizontal - 1.0).abs() < f64::EPSILON && (vertical - 1.0).abs() < f64::EPSILON {
        None
    } else {
        Some(AxisInfo::new(horizontal, horizontal, vertical))
    }
}

fn vlr_sets_equal(a: &[Vlr], b: &[Vlr]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut remaining: Vec<&Vlr> = b.iter().collect();
    for vlr in a {
        match remaining.iter().position(|&other| other == vlr) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => return false,
        }
    }
    true
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EQUALITY_TOLERANCE
}

fn tables_equal_within_tolerance(a: &PointTable, b: &PointTable) -> bool {
    let n = a.len();
    if n != b.len() {
        return false;
    }
    for i in 0..n {
        if !close(a.x[i], b.x[i]) || !close(a.y[i], b.y[i]) || !close(a.z[i], b.z[i]) {
            return false;
        }
        if !close(a.scan_angle[i], b.scan_angle[i]) {
            return false;
        }
    }
    if a.intensity != b.intensity
        || a.return_number != b.return_number
        || a.number_of_returns != b.number_of_returns
        || a.scan_direction != b.scan_direction
        || a.edge_of_flight_line != b.edge_of_flight_line
        || a.synthetic != b.synthetic
        || a.key_point != b.key_point
        || a.withheld != b.withheld
        || a.overlap != b.overlap
        || a.scanner_channel != b.scanner_channel
        || a.classification != b.classification
        || a.user_data != b.user_data
        || a.point_source_id != b.point_source_id
        || a.color != b.color
        || a.nir != b.nir
        || a.waveform != b.waveform
        || a.undocumented_bytes != b.undocumented_bytes
        || a.gps_time.len() != b.gps_time.len()
    {
        return false;
    }
    for i in 0..a.gps_time.len() {
        if !close(a.gps_time[i], b.gps_time[i]) {
            return false;
        }
    }
    if a.user_columns.len() != b.user_columns.len() {
        return false;
    }
    for (name, column) in &a.user_columns {
        let Some(other) = b.user_columns.get(name) else {
            return false;
        };
        if other.scalar != column.scalar || other.component_count != column.component_count {
            return false;
        }
        for i in 0..n {
            let left = column.row_f64(i);
            let right = other.row_f64(i);
            if left.len() != right.len() || left.iter().zip(&right).any(|(x, y)| !close(*x, *y)) {
                return false;
            }
        }
    }
    true
}

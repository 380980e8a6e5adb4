//! The columnar point table: one `Vec` per LAS column plus a map of user columns, kept in lock
//! step by row count.

pub mod column;

use std::collections::BTreeMap;

pub use column::UserColumn;

use crate::classification::Classification;
use crate::color::Color;
use crate::point::{Column, Waveform};
use crate::schema::ScalarType;
use crate::{Error, Result};

/// One fully decoded logical point, as produced by the streaming read path or accepted by
/// [`PointTable::push`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub position: (f64, f64, f64),
    pub intensity: u16,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub scan_direction: bool,
    pub edge_of_flight_line: bool,
    pub synthetic: bool,
    pub key_point: bool,
    pub withheld: bool,
    pub overlap: bool,
    pub scanner_channel: u8,
    pub classification: Classification,
    pub scan_angle: f64,
    pub user_data: u8,
    pub point_source_id: u16,
    pub gps_time: Option<f64>,
    pub color: Option<Color>,
    pub nir: Option<u16>,
    pub waveform: Option<Waveform>,
    pub undocumented_bytes: Vec<u8>,
    pub user_values: BTreeMap<String, Vec<f64>>,
}

/// The point table: a columnar container of typed LAS columns plus user-defined ("extra bytes")
/// columns, all kept at the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointTable {
    len: usize,
    pub ids: Vec<u64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub intensity: Vec<u16>,
    pub return_number: Vec<u8>,
    pub number_of_returns: Vec<u8>,
    pub scan_direction: Vec<bool>,
    pub edge_of_flight_line: Vec<bool>,
    pub synthetic: Vec<bool>,
    pub key_point: Vec<bool>,
    pub withheld: Vec<bool>,
    pub overlap: Vec<bool>,
    pub scanner_channel: Vec<u8>,
    pub classification: Vec<Classification>,
    pub scan_angle: Vec<f64>,
    pub user_data: Vec<u8>,
    pub point_source_id: Vec<u16>,
    pub gps_time: Vec<f64>,
    pub color: Vec<Color>,
    pub nir: Vec<u16>,
    pub waveform: Vec<Waveform>,
    pub undocumented_bytes: Vec<Vec<u8>>,
    pub user_columns: BTreeMap<String, UserColumn>,
}

impl PointTable {
    pub fn new() -> PointTable {
        PointTable::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true iff `column` has been populated (its backing `Vec` is as long as the table).
    pub fn has(&self, column: Column) -> bool {
        match column {
            Column::Position => !self.x.is_empty(),
            Column::Intensity => !self.intensity.is_empty(),
            Column::ReturnNumber => !self.return_number.is_empty(),
            Column::NumberOfReturns => !self.number_of_returns.is_empty(),
            Column::ScanDirection => !self.scan_direction.is_empty(),
            Column::EdgeOfFlightLine => !self.edge_of_flight_line.is_empty(),
            Column::Synthetic => !self.synthetic.is_empty(),
            Column::KeyPoint => !self.key_point.is_empty(),
            Column::Withheld => !self.withheld.is_empty(),
            Column::Overlap => !self.overlap.is_empty(),
            Column::ScannerChannel => !self.scanner_channel.is_empty(),
            Column::Classification => !self.classification.is_empty(),
            Column::ScanAngle => !self.scan_angle.is_empty(),
            Column::UserData => !self.user_data.is_empty(),
            Column::PointSourceId => !self.point_source_id.is_empty(),
            Column::GpsTime => !self.gps_time.is_empty(),
            Column::Color => !self.color.is_empty(),
            Column::Nir => !self.nir.is_empty(),
            Column::WaveformDescriptorIndex
            | Column::WaveformOffset
            | Column::WaveformSize
            | Column::WaveformReturnLocation
            | Column::WaveformXyzDerivatives => !self.waveform.is_empty(),
        }
    }

    /// Appends one row, assigning it the next synthetic id.
    pub fn push(&mut self, row: Row) -> Result<()> {
        let next_id = self.ids.last().map_or(1, |last| last + 1);
        self.ids.push(next_id);
        self.x.push(row.position.0);
        self.y.push(row.position.1);
        self.z.push(row.position.2);
        self.intensity.push(row.intensity);
        self.return_number.push(row.return_number);
        self.number_of_returns.push(row.number_of_returns);
        self.scan_direction.push(row.scan_direction);
        self.edge_of_flight_line.push(row.edge_of_flight_line);
        self.synthetic.push(row.synthetic);
        self.key_point.push(row.key_point);
        self.withheld.push(row.withheld);
        self.overlap.push(row.overlap);
        self.scanner_channel.push(row.scanner_channel);
        self.classification.push(row.classification);
        self.scan_angle.push(row.scan_angle);
        self.user_data.push(row.user_data);
        self.point_source_id.push(row.point_source_id);
        if let Some(gps_time) = row.gps_time {
            self.gps_time.push(gps_time);
        }
        if let Some(color) = row.color {
            self.color.push(color);
        }
        if let Some(nir) = row.nir {
            self.nir.push(nir);
        }
        if let Some(waveform) = row.waveform {
            self.waveform.push(waveform);
        }
        self.undocumented_bytes.push(row.undocumented_bytes);

        for (name, column) in self.user_columns.iter_mut() {
            let values = row
                .user_values
                .get(name)
                .cloned()
                .unwrap_or_else(|| vec![0.0; column.component_count]);
            column.push_f64(&values)?;
        }
        self.len += 1;
        Ok(())
    }

    /// Removes the rows at `indices` (need not be sorted), recomputing synthetic ids and shifting
    /// every column down.
    pub fn remove(&mut self, indices: &[usize]) -> Result<()> {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for &index in &sorted {
            if index >= self.len {
                return Err(Error::LengthMismatch {
                    expected: self.len,
                    actual: index,
                });
            }
        }
        remove_indices(&mut self.x, &sorted);
        remove_indices(&mut self.y, &sorted);
        remove_indices(&mut self.z, &sorted);
        remove_indices(&mut self.intensity, &sorted);
        remove_indices(&mut self.return_number, &sorted);
        remove_indices(&mut self.number_of_returns, &sorted);
        remove_indices(&mut self.scan_direction, &sorted);
        remove_indices(&mut self.edge_of_flight_line, &sorted);
        remove_indices(&mut self.synthetic, &sorted);
        remove_indices(&mut self.key_point, &sorted);
        remove_indices(&mut self.withheld, &sorted);
        remove_indices(&mut self.overlap, &sorted);
        remove_indices(&mut self.scanner_channel, &sorted);
        remove_indices(&mut self.classification, &sorted);
        remove_indices(&mut self.scan_angle, &sorted);
        remove_indices(&mut self.user_data, &sorted);
        remove_indices(&mut self.point_source_id, &sorted);
        if self.gps_time.len() == self.len {
            remove_indices(&mut self.gps_time, &sorted);
        }
        if self.color.len() == self.len {
            remove_indices(&mut self.color, &sorted);
        }
        if self.nir.len() == self.len {
            remove_indices(&mut self.nir, &sorted);
        }
        if self.waveform.len() == self.len {
            remove_indices(&mut self.waveform, &sorted);
        }
        remove_indices(&mut self.undocumented_bytes, &sorted);
        for column in self.user_columns.values_mut() {
            column.remove_indices(&sorted);
        }

        self.len -= sorted.len();
        self.ids = (1..=self.len as u64).collect();
        Ok(())
    }

    /// Adds or replaces a user column, back-filling absent points with zero and the rest from
    /// `values` (one `Vec<f64>` of length `component_count` per point).
    ///
    /// Fails with [`Error::LengthMismatch`] unless `values.len() == self.len()`.
    pub fn set_user_column(
        &mut self,
        name: &str,
        scalar: ScalarType,
        component_count: usize,
        values: &[Vec<f64>],
    ) -> Result<()> {
        if values.len() != self.len {
            return Err(Error::LengthMismatch {
                expected: self.len,
                actual: values.len(),
            });
        }
        let mut column = UserColumn::new(scalar, component_count);
        for row in values {
            column.push_f64(row)?;
        }
        self.user_columns.insert(name.to_string(), column);
        Ok(())
    }

    pub fn row(&self, index: usize) -> Row {
        let user_values = self
            .user_columns
            .iter()
            .map(|(name, column)| (name.clone(), column.row_f64(index)))
            .collect();
        Row {
            position: (self.x[index], self.y[index], self.z[index]),
            intensity: self.intensity[index],
            return_number: self.return_number[index],
            number_of_returns: self.number_of_returns[index],
            scan_direction: self.scan_direction[index],
            edge_of_flight_line: self.edge_of_flight_line[index],
            synthetic: self.synthetic[index],
            key_point: self.key_point[index],
            withheld: self.withheld[index],
            overlap: self.overlap[index],
            scanner_channel: self.scanner_channel[index],
            classification: self.classification[index],
            scan_angle: self.scan_angle[index],
            user_data: self.user_data[index],
            point_source_id: self.point_source_id[index],
            gps_time: self.gps_time.get(index).copied(),
            color: self.color.get(index).copied(),
            nir: self.nir.get(index).copied(),
            waveform: self.waveform.get(index).copied(),
            undocumented_bytes: self
                .undocumented_bytes
                .get(index)
                .cloned()
                .unwrap_or_default(),
            user_values,
        }
    }
}

fn remove_indices<T>(values: &mut Vec<T>, sorted_indices: &[usize]) {
    let mut i = 0usize;
    let mut next = 0usize;
    values.retain(|_| {
        let drop = next < sorted_indices.len() && sorted_indices[next] == i;
        if drop {
            next += 1;
        }
        i += 1;
        !drop
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(x: f64) -> Row {
        Row {
            position: (x, 0.0, 0.0),
            intensity: 100,
            ..Row::default()
        }
    }

    #[test]
    fn push_assigns_sequential_ids() {
        let mut table = PointTable::new();
        table.push(sample_row(1.0)).unwrap();
        table.push(sample_row(2.0)).unwrap();
        assert_eq!(vec![1, 2], table.ids);
        assert_eq!(2, table.len());
    }

    #[test]
    fn remove_shifts_and_renumbers() {
        let mut table = PointTable::new();
        for x in [1.0, 2.0, 3.0] {
            table.push(sample_row(x)).unwrap();
        }
        table.remove(&[1]).unwrap();
        assert_eq!(2, table.len());
        assert_eq!(vec![1.0, 3.0], table.x);
        assert_eq!(vec![1, 2], table.ids);
    }

    #[test]
    fn user_column_back_fills_and_round_trips() {
        let mut table = PointTable::new();
        for x in [1.0, 2.0] {
            table.push(sample_row(x)).unwrap();
        }
        table
            .set_user_column("height_above_ground", ScalarType::F32, 1, &[vec![0.5], vec![1.5]])
            .unwrap();
        let row = table.row(1);
        assert_eq!(vec![1.5], row.user_values["height_above_ground"]);
    }

    #[test]
    fn set_user_column_rejects_length_mismatch() {
        let mut table = PointTable::new();
        table.push(sample_row(1.0)).unwrap();
        assert!(table
            .set_user_column("x", ScalarType::U8, 1, &[vec![1.0], vec![2.0]])
            .is_err());
    }
}

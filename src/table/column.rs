//! Storage for a single user-defined ("extra bytes") column: a scalar type, an optional vector
//! arity, and a packed byte buffer holding every point's value contiguously.

use num_traits::{Bounded, NumCast};

use crate::schema::ScalarType;
use crate::{Error, Result};

/// Converts `value` to `T`, saturating to `T`'s bounds for out-of-range input and mapping `NaN`
/// to zero, matching `as`'s float-to-integer conversion rules.
fn saturating_cast<T: NumCast + Bounded>(value: f64) -> T {
    if value.is_nan() {
        return NumCast::from(0).expect("every supported scalar type can represent zero");
    }
    NumCast::from(value).unwrap_or_else(|| {
        if value < 0.0 {
            T::min_value()
        } else {
            T::max_value()
        }
    })
}

/// A user column's raw storage: `len` points, each `component_count` components of `scalar`,
/// packed component-major-within-point, point-major overall.
///
/// Values are read from and written to the wire as exact bytes; the `f64`-based accessors below
/// are a convenience for callers that don't need bit-for-bit precision (e.g. inspecting a column
/// built from `f32` or narrower integer types loses no information going in, but converting back
/// out through `f64` can for `i64`/`u64` magnitudes beyond 2^53).
#[derive(Clone, Debug, PartialEq)]
pub struct UserColumn {
    pub scalar: ScalarType,
    pub component_count: usize,
    bytes: Vec<u8>,
    len: usize,
}

impl UserColumn {
    /// Creates an empty column of the given scalar type and component count (1 for a plain
    /// scalar column, >1 for a fixed-size vector column).
    pub fn new(scalar: ScalarType, component_count: usize) -> UserColumn {
        UserColumn {
            scalar,
            component_count,
            bytes: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn stride(&self) -> usize {
        self.scalar.size() * self.component_count
    }

    /// Returns the raw bytes for the whole column, in point-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Builds a column directly from a byte buffer already in the right layout.
    ///
    /// Fails with [`Error::LengthMismatch`] if `bytes.len()` isn't a multiple of the element
    /// stride.
    pub fn from_bytes(scalar: ScalarType, component_count: usize, bytes: Vec<u8>) -> Result<UserColumn> {
        let stride = scalar.size() * component_count;
        if bytes.len() % stride != 0 {
            return Err(Error::LengthMismatch {
                expected: 0,
                actual: bytes.len(),
            });
        }
        let len = bytes.len() / stride;
        Ok(UserColumn {
            scalar,
            component_count,
            bytes,
            len,
        })
    }

    /// Appends one point's worth of components, converting each from `f64`.
    ///
    /// Fails with [`Error::LengthMismatch`] if `values.len() != self.component_count`.
    pub fn push_f64(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.component_count {
            return Err(Error::LengthMismatch {
                expected: self.component_count,
                actual: values.len(),
            });
        }
        for &value in values {
            self.push_scalar(value);
        }
        self.len += 1;
        Ok(())
    }

    fn push_scalar(&mut self, value: f64) {
        use byteorder::{LittleEndian, WriteBytesExt};

        let buf = &mut self.bytes;
        match self.scalar {
            ScalarType::U8 => buf.push(saturating_cast::<u8>(value)),
            ScalarType::I8 => buf.push(saturating_cast::<i8>(value) as u8),
            ScalarType::U16 => buf.write_u16::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::I16 => buf.write_i16::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::U32 => buf.write_u32::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::I32 => buf.write_i32::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::U64 => buf.write_u64::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::I64 => buf.write_i64::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::F32 => buf.write_f32::<LittleEndian>(saturating_cast(value)).unwrap(),
            ScalarType::F64 => buf.write_f64::<LittleEndian>(value).unwrap(),
        }
    }

    /// Reads point `index`'s components back out as `f64`.
    pub fn row_f64(&self, index: usize) -> Vec<f64> {
        use byteorder::{LittleEndian, ReadBytesExt};
        use num_traits::ToPrimitive;

        let stride = self.stride();
        let start = index * stride;
        let mut slice = &self.bytes[start..start + stride];
        let mut out = Vec::with_capacity(self.component_count);
        for _ in 0..self.component_count {
            let value = match self.scalar {
                ScalarType::U8 => slice.read_u8().unwrap().to_f64().unwrap(),
                ScalarType::I8 => slice.read_i8().unwrap().to_f64().unwrap(),
                ScalarType::U16 => slice.read_u16::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::I16 => slice.read_i16::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::U32 => slice.read_u32::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::I32 => slice.read_i32::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::U64 => slice.read_u64::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::I64 => slice.read_i64::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::F32 => slice.read_f32::<LittleEndian>().unwrap().to_f64().unwrap(),
                ScalarType::F64 => slice.read_f64::<LittleEndian>().unwrap(),
            };
            out.push(value);
        }
        out
    }

    /// Removes the points at `indices` (assumed sorted ascending), shifting the rest down.
    pub fn remove_indices(&mut self, indices: &[usize]) {
        let stride = self.stride();
        let mut kept = Vec::with_capacity(self.bytes.len());
        for i in 0..self.len {
            if indices.binary_search(&i).is_err() {
                kept.extend_from_slice(&self.bytes[i * stride..(i + 1) * stride]);
            }
        }
        self.len -= indices.len();
        self.bytes = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back_scalar() {
        let mut column = UserColumn::new(ScalarType::I32, 1);
        column.push_f64(&[42.0]).unwrap();
        column.push_f64(&[-7.0]).unwrap();
        assert_eq!(2, column.len());
        assert_eq!(vec![42.0], column.row_f64(0));
        assert_eq!(vec![-7.0], column.row_f64(1));
    }

    #[test]
    fn push_and_read_back_vector() {
        let mut column = UserColumn::new(ScalarType::F32, 3);
        column.push_f64(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(vec![1.0, 2.0, 3.0], column.row_f64(0));
    }

    #[test]
    fn push_saturates_out_of_range_values() {
        let mut column = UserColumn::new(ScalarType::U8, 1);
        column.push_f64(&[300.0]).unwrap();
        column.push_f64(&[-5.0]).unwrap();
        column.push_f64(&[f64::NAN]).unwrap();
        assert_eq!(vec![255.0], column.row_f64(0));
        assert_eq!(vec![0.0], column.row_f64(1));
        assert_eq!(vec![0.0], column.row_f64(2));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut column = UserColumn::new(ScalarType::U8, 2);
        assert!(column.push_f64(&[1.0]).is_err());
    }

    #[test]
    fn remove_indices_shifts_remaining_rows() {
        let mut column = UserColumn::new(ScalarType::U16, 1);
        for v in [10.0, 20.0, 30.0, 40.0] {
            column.push_f64(&[v]).unwrap();
        }
        column.remove_indices(&[1, 2]);
        assert_eq!(2, column.len());
        assert_eq!(vec![10.0], column.row_f64(0));
        assert_eq!(vec![40.0], column.row_f64(1));
    }

    #[test]
    fn from_bytes_rejects_misaligned_length() {
        assert!(UserColumn::from_bytes(ScalarType::U32, 1, vec![0u8; 6]).is_err());
    }
}

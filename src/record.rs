//! Resolution of a file's per-point wire shape from its declared record length.
//!
//! A point record is always the fixed format bytes, optionally followed by documented user
//! fields (the extra-bytes schema), optionally followed by undocumented trailing bytes whose
//! meaning this library does not attempt to interpret.

use crate::point::format::Format;
use crate::schema::FieldSpec;
use crate::{Error, Result};

/// The resolved shape of every point record in a file.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordKind {
    /// Just the formatted point, no user fields, no undocumented bytes.
    Point,
    /// The formatted point plus documented user fields.
    Extended {
        /// The user fields, in on-disk order.
        schema: Vec<FieldSpec>,
    },
    /// The formatted point plus `len` undocumented trailing bytes.
    Undocumented {
        /// Count of trailing bytes this library passes through uninterpreted.
        len: usize,
    },
    /// The formatted point, documented user fields, and undocumented trailing bytes.
    Full {
        /// The user fields, in on-disk order.
        schema: Vec<FieldSpec>,
        /// Count of trailing bytes left over after the user fields.
        undocumented_len: usize,
    },
}

impl RecordKind {
    /// Returns the total on-disk size of one record of this kind, for `format`.
    pub fn wire_size(&self, format: Format) -> usize {
        format.len() as usize
            + match self {
                RecordKind::Point => 0,
                RecordKind::Extended { schema } => schema.iter().map(FieldSpec::size).sum(),
                RecordKind::Undocumented { len } => *len,
                RecordKind::Full {
                    schema,
                    undocumented_len,
                } => schema.iter().map(FieldSpec::size).sum::<usize>() + undocumented_len,
            }
    }

    /// Returns the documented user-field schema, if this kind carries one.
    pub fn schema(&self) -> &[FieldSpec] {
        match self {
            RecordKind::Point | RecordKind::Undocumented { .. } => &[],
            RecordKind::Extended { schema } | RecordKind::Full { schema, .. } => schema,
        }
    }

    /// Returns the count of undocumented trailing bytes per record, zero if none.
    pub fn undocumented_len(&self) -> usize {
        match self {
            RecordKind::Point | RecordKind::Extended { .. } => 0,
            RecordKind::Undocumented { len } => *len,
            RecordKind::Full {
                undocumented_len, ..
            } => *undocumented_len,
        }
    }
}

/// Resolves the wire shape of a file's point records from its declared per-record length, point
/// format, and documented extra-bytes schema.
///
/// `point_record_length` is the header's declared length; `extra_bytes` is the schema recovered
/// from the file's single `ExtraBytes` VLR, if any.
pub fn record_format(
    point_record_length: u16,
    format: Format,
    extra_bytes: &[FieldSpec],
) -> Result<RecordKind> {
    let d = i64::from(point_record_length) - i64::from(format.len());
    if d < 0 {
        return Err(Error::InconsistentRecordLength(format!(
            "point record length {point_record_length} is smaller than format {format}'s size {}",
            format.len()
        )));
    }
    let d = d as usize;
    if d == 0 {
        if extra_bytes.is_empty() {
            Ok(RecordKind::Point)
        } else {
            Ok(RecordKind::Extended {
                schema: extra_bytes.to_vec(),
            })
        }
    } else if extra_bytes.is_empty() {
        Ok(RecordKind::Undocumented { len: d })
    } else {
        let schema_size: usize = extra_bytes.iter().map(FieldSpec::size).sum();
        if schema_size > d {
            Err(Error::InconsistentRecordLength(format!(
                "extra-bytes schema size {schema_size} exceeds the {d} bytes available beyond the formatted point"
            )))
        } else {
            Ok(RecordKind::Full {
                schema: extra_bytes.to_vec(),
                undocumented_len: d - schema_size,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarType;

    #[test]
    fn exact_fit_is_plain_point() {
        let format = Format::new(0).unwrap();
        let kind = record_format(format.len(), format, &[]).unwrap();
        assert_eq!(RecordKind::Point, kind);
    }

    #[test]
    fn shortfall_is_an_error() {
        let format = Format::new(0).unwrap();
        assert!(record_format(format.len() - 1, format, &[]).is_err());
    }

    #[test]
    fn surplus_with_no_schema_is_undocumented() {
        let format = Format::new(0).unwrap();
        let kind = record_format(format.len() + 6, format, &[]).unwrap();
        assert_eq!(RecordKind::Undocumented { len: 6 }, kind);
    }

    #[test]
    fn surplus_with_schema_is_full() {
        let format = Format::new(0).unwrap();
        let schema = vec![FieldSpec::new("thing", ScalarType::F64)];
        let kind = record_format(format.len() + 8 + 2, format, &schema).unwrap();
        assert_eq!(
            RecordKind::Full {
                schema: schema.clone(),
                undocumented_len: 2
            },
            kind
        );
    }

    #[test]
    fn schema_larger_than_surplus_is_an_error() {
        let format = Format::new(0).unwrap();
        let schema = vec![FieldSpec::new("thing", ScalarType::F64)];
        assert!(record_format(format.len() + 4, format, &schema).is_err());
    }

    #[test]
    fn wire_size_accounts_for_schema_and_undocumented_bytes() {
        let format = Format::new(0).unwrap();
        let schema = vec![FieldSpec::new("thing", ScalarType::F64)];
        let kind = RecordKind::Full {
            schema,
            undocumented_len: 2,
        };
        assert_eq!(format.len() as usize + 8 + 2, kind.wire_size(format));
    }
}

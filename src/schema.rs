//! The scalar type vocabulary shared by user columns and their extra-bytes documentation.

use crate::{Error, Result};

/// One of the ten base scalar types a user column's elements may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarType {
    /// Returns the on-disk byte size of a single value of this type.
    pub fn size(&self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 => 2,
            ScalarType::U32 | ScalarType::I32 | ScalarType::F32 => 4,
            ScalarType::U64 | ScalarType::I64 | ScalarType::F64 => 8,
        }
    }

    /// Returns the extra-bytes VLR data-type code for this scalar type, per the ASPRS encoding
    /// (1=u8, 2=i8, 3=u16, 4=i16, 5=u32, 6=i32, 7=u64, 8=i64, 9=f32, 10=f64).
    pub fn to_data_type_code(&self) -> u8 {
        match self {
            ScalarType::U8 => 1,
            ScalarType::I8 => 2,
            ScalarType::U16 => 3,
            ScalarType::I16 => 4,
            ScalarType::U32 => 5,
            ScalarType::I32 => 6,
            ScalarType::U64 => 7,
            ScalarType::I64 => 8,
            ScalarType::F32 => 9,
            ScalarType::F64 => 10,
        }
    }

    /// Parses an extra-bytes VLR data-type code back into a scalar type.
    pub fn from_data_type_code(code: u8) -> Result<ScalarType> {
        match code {
            1 => Ok(ScalarType::U8),
            2 => Ok(ScalarType::I8),
            3 => Ok(ScalarType::U16),
            4 => Ok(ScalarType::I16),
            5 => Ok(ScalarType::U32),
            6 => Ok(ScalarType::I32),
            7 => Ok(ScalarType::U64),
            8 => Ok(ScalarType::I64),
            9 => Ok(ScalarType::F32),
            10 => Ok(ScalarType::F64),
            other => Err(Error::UnsupportedUserType(format!(
                "unrecognized extra-bytes data type code {other}"
            ))),
        }
    }
}

/// A single documented entry in a dataset's extra-bytes schema: one scalar column, or one
/// component of a vector column.
///
/// Vector columns are split into consecutive entries named `"col [0]"`, `"col [1]"`, etc.; see
/// [`crate::vlr::payloads::ExtraBytes`].
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// The entry's name, as it appears in the extra-bytes VLR.
    pub name: String,
    /// The entry's scalar type.
    pub scalar: ScalarType,
}

impl FieldSpec {
    /// Creates a new field spec.
    pub fn new(name: impl Into<String>, scalar: ScalarType) -> FieldSpec {
        FieldSpec {
            name: name.into(),
            scalar,
        }
    }

    /// Returns the on-disk byte size of this entry.
    pub fn size(&self) -> usize {
        self.scalar.size()
    }
}

/// Splits a vector column's base name and element type into its per-component field specs,
/// named `"name [0]"` through `"name [len-1]"`.
///
/// ```
/// use lastable::schema::{field_specs_for_column, ScalarType};
/// let specs = field_specs_for_column("rgbish", ScalarType::F64, 3);
/// assert_eq!("rgbish [0]", specs[0].name);
/// assert_eq!("rgbish [2]", specs[2].name);
/// ```
pub fn field_specs_for_column(name: &str, scalar: ScalarType, len: usize) -> Vec<FieldSpec> {
    if len == 1 {
        vec![FieldSpec::new(name, scalar)]
    } else {
        (0..len)
            .map(|i| FieldSpec::new(format!("{name} [{i}]"), scalar))
            .collect()
    }
}

/// The inverse of [`field_specs_for_column`]: regroups a flat schema back into named columns,
/// recognizing `"name [0]"`, `"name [1]"`, ... runs as the components of one vector column.
///
/// A run only merges when the indices are consecutive starting at 0 and share a scalar type;
/// anything else is treated as its own scalar (or malformed-vector) column, one entry each.
pub fn group_into_columns(schema: &[FieldSpec]) -> Vec<(String, ScalarType, usize)> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < schema.len() {
        let (base, index) = split_indexed_name(&schema[i].name);
        if index == Some(0) {
            let scalar = schema[i].scalar;
            let mut count = 1;
            while i + count < schema.len() {
                let (next_base, next_index) = split_indexed_name(&schema[i + count].name);
                if next_base == base
                    && next_index == Some(count)
                    && schema[i + count].scalar == scalar
                {
                    count += 1;
                } else {
                    break;
                }
            }
            groups.push((base, scalar, count));
            i += count;
        } else {
            groups.push((schema[i].name.clone(), schema[i].scalar, 1));
            i += 1;
        }
    }
    groups
}

fn split_indexed_name(name: &str) -> (String, Option<usize>) {
    if let Some(open) = name.rfind(" [") {
        if let Some(stripped) = name.strip_suffix(']') {
            if let Ok(index) = stripped[open + 2..].parse::<usize>() {
                return (name[..open].to_string(), Some(index));
            }
        }
    }
    (name.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_into_columns_reassembles_vector_and_scalar() {
        let schema = field_specs_for_column("rgbish", ScalarType::F64, 3)
            .into_iter()
            .chain(field_specs_for_column("other", ScalarType::I16, 1))
            .collect::<Vec<_>>();
        let groups = group_into_columns(&schema);
        assert_eq!(
            vec![
                ("rgbish".to_string(), ScalarType::F64, 3),
                ("other".to_string(), ScalarType::I16, 1),
            ],
            groups
        );
    }

    #[test]
    fn data_type_code_round_trip() {
        for code in 1..=10u8 {
            let scalar = ScalarType::from_data_type_code(code).unwrap();
            assert_eq!(code, scalar.to_data_type_code());
        }
    }

    #[test]
    fn unsupported_data_type_code() {
        assert!(ScalarType::from_data_type_code(0).is_err());
        assert!(ScalarType::from_data_type_code(11).is_err());
    }

    #[test]
    fn scalar_column_keeps_bare_name() {
        let specs = field_specs_for_column("other", ScalarType::I16, 1);
        assert_eq!(1, specs.len());
        assert_eq!("other", specs[0].name);
    }

    #[test]
    fn vector_column_splits_into_indexed_entries() {
        let specs = field_specs_for_column("rgbish", ScalarType::F64, 3);
        assert_eq!(3, specs.len());
        assert_eq!("rgbish [0]", specs[0].name);
        assert_eq!("rgbish [1]", specs[1].name);
        assert_eq!("rgbish [2]", specs[2].name);
        assert!(specs.iter().all(|s| s.scalar == ScalarType::F64));
    }
}

//! Crate-specific errors.

use crate::point::Format;
use crate::Version;
use thiserror::Error;

/// Errors that can occur when reading, writing, or reconciling a [`Dataset`](crate::Dataset).
#[derive(Debug, Error)]
pub enum Error {
    /// The file signature was not `LASF`, or the byte layout could not be recognized.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The spec version was outside 1.1..=1.4.
    #[error("unsupported las version: {0}")]
    UnsupportedVersion(Version),

    /// The point format id was outside 0..=10, or is incompatible with the declared spec version.
    #[error("unsupported point format {format} for las version {version}")]
    UnsupportedPointFormat {
        /// The offending point format id.
        format: u8,
        /// The header's current version.
        version: Version,
    },

    /// Header counters or offsets disagree with the rest of the file.
    #[error("inconsistent header: {0}")]
    InconsistentHeader(String),

    /// A known VLR payload type was stored under the wrong record id.
    #[error("inconsistent vlr: {0}")]
    InconsistentVlr(String),

    /// The point record length doesn't match the format size plus extra bytes plus padding.
    #[error("inconsistent point record length: {0}")]
    InconsistentRecordLength(String),

    /// A VLR payload exceeded its format's size cap.
    #[error("vlr payload of {len} bytes exceeds the cap of {max} bytes")]
    PayloadTooLarge {
        /// The payload's encoded length.
        len: u64,
        /// The maximum allowed length for this VLR kind (normal or extended).
        max: u64,
    },

    /// A point count exceeded `u32::MAX` where only the legacy 32-bit field is available.
    #[error("point count {0} is too large for the legacy 32-bit counter")]
    CountTooLarge(u64),

    /// A bounding box could not be represented with the configured scale.
    #[error("value {value} is out of range for scale {scale} and offset {offset}")]
    ScaleOutOfRange {
        /// The offending real-valued coordinate.
        value: f64,
        /// The scale factor that was tried.
        scale: f64,
        /// The offset that was tried.
        offset: f64,
    },

    /// No point format supports the requested combination of columns.
    #[error("no point format supports the requested columns: {0:?}")]
    UnrepresentableColumns(Vec<String>),

    /// A user column's element type is not one of the ten supported base types (or a fixed-size
    /// vector of them).
    #[error("unsupported user column type: {0}")]
    UnsupportedUserType(String),

    /// A column's length didn't match the point count.
    #[error("column length {actual} does not match point count {expected}")]
    LengthMismatch {
        /// The point table's current length.
        expected: usize,
        /// The length of the value provided by the caller.
        actual: usize,
    },

    /// A non-superseded VLR with the same (user id, record id) already exists.
    #[error("duplicate vlr id: user_id={user_id:?} record_id={record_id}")]
    DuplicateVlrId {
        /// The VLR's user id.
        user_id: String,
        /// The VLR's record id.
        record_id: u16,
    },

    /// A payload type was registered against more than one user id, or a (user id, record id)
    /// pair was registered twice.
    #[error("duplicate vlr registration for user_id={user_id:?} record_id={record_id}")]
    DuplicateRegistration {
        /// The colliding user id.
        user_id: String,
        /// The colliding record id.
        record_id: u16,
    },

    /// The requested VLR was not found.
    #[error("vlr not found: user_id={user_id:?} record_id={record_id}")]
    VlrNotFound {
        /// The user id that was searched for.
        user_id: String,
        /// The record id that was searched for.
        record_id: u16,
    },

    /// A string was too long to fit in its fixed-width, null-padded field.
    #[error("string {value:?} is longer than {max} bytes")]
    InvalidArgument {
        /// The offending string.
        value: String,
        /// The maximum number of bytes it could have occupied.
        max: usize,
    },

    /// A point format's columns weren't a superset of the table's current columns.
    #[error("point format {format:?} cannot represent column {column}")]
    PointFormat {
        /// The point format that was tried.
        format: Format,
        /// The column that couldn't be represented.
        column: String,
    },

    /// Wraps `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

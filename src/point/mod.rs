//! The 11 point record shapes: their fixed byte layouts, bit-packed sub-fields, and the columns
//! each one can carry.

pub mod flags;
pub mod format;
pub mod raw;
pub mod scan_angle;
pub mod waveform;

pub use format::{select_point_format, Column, Format};
pub use raw::{PointFlags, RawPoint};
pub use scan_angle::ScanAngle;
pub use waveform::Waveform;

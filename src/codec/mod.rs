//! The binary codec: streaming decode, columnar-blit encode.

pub mod read;
pub mod write;

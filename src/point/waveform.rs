//! Waveform sub-fields carried by point formats 4, 5, 9, and 10.

/// The waveform columns attached to a point, when its format supports them.
///
/// Absent waveform data is represented with every field at zero, matching the wire convention for
/// points that carry a waveform-capable format but no actual waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Waveform {
    /// Index into the waveform packet descriptor VLR collection.
    pub descriptor_index: u8,
    /// Byte offset of this point's waveform packet within the waveform data.
    pub offset: u64,
    /// Size, in bytes, of this point's waveform packet.
    pub size: u32,
    /// Location of this return within the waveform, in picoseconds.
    pub return_location: f32,
    /// X component of the parametric line used to locate waveform samples in space.
    pub x_t: f32,
    /// Y component of the parametric line used to locate waveform samples in space.
    pub y_t: f32,
    /// Z component of the parametric line used to locate waveform samples in space.
    pub z_t: f32,
}

impl Waveform {
    /// Creates a new waveform record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        descriptor_index: u8,
        offset: u64,
        size: u32,
        return_location: f32,
        x_t: f32,
        y_t: f32,
        z_t: f32,
    ) -> Waveform {
        Waveform {
            descriptor_index,
            offset,
            size,
            return_location,
            x_t,
            y_t,
            z_t,
        }
    }
}

//! Point color.

/// The red, green, and blue image channels associated with a point.
///
/// Values are always normalized to 16 bits, regardless of the sensor's native bit depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    /// The red channel.
    pub red: u16,
    /// The green channel.
    pub green: u16,
    /// The blue channel.
    pub blue: u16,
}

impl Color {
    /// Creates a new color.
    ///
    /// ```
    /// use lastable::Color;
    /// let color = Color::new(1, 2, 3);
    /// assert_eq!(1, color.red);
    /// ```
    pub fn new(red: u16, green: u16, blue: u16) -> Color {
        Color { red, green, blue }
    }
}

//! Ordered (x, y, z) triples, generic over the component type.

/// An ordered (x, y, z) triple of some type `T`.
///
/// Used throughout the dataset for anything that's naturally per-axis: scale factors, offsets,
/// and (as `AxisInfo<Range<f64>>`) bounding ranges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisInfo<T> {
    /// The x-axis value.
    pub x: T,
    /// The y-axis value.
    pub y: T,
    /// The z-axis value.
    pub z: T,
}

impl<T> AxisInfo<T> {
    /// Creates a new triple.
    ///
    /// ```
    /// use lastable::vector::AxisInfo;
    /// let triple = AxisInfo::new(1., 2., 3.);
    /// assert_eq!(2., triple.y);
    /// ```
    pub fn new(x: T, y: T, z: T) -> AxisInfo<T> {
        AxisInfo { x, y, z }
    }

    /// Maps each component through `f`.
    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> AxisInfo<U> {
        AxisInfo::new(f(&self.x), f(&self.y), f(&self.z))
    }
}

impl AxisInfo<f64> {
    /// The default per-axis scale factor used when a dataset is assembled without one: `1e-4`.
    pub const DEFAULT_SCALE: f64 = 1e-4;

    /// Returns a triple of the default scale factor, `1e-4`, for each axis.
    ///
    /// ```
    /// use lastable::vector::AxisInfo;
    /// assert_eq!(1e-4, AxisInfo::<f64>::default_scale().x);
    /// ```
    pub fn default_scale() -> AxisInfo<f64> {
        AxisInfo::new(Self::DEFAULT_SCALE, Self::DEFAULT_SCALE, Self::DEFAULT_SCALE)
    }
}

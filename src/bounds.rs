//! The spatial model: per-axis scale/offset transforms and bounding ranges.
//!
//! Raw, signed 32-bit point coordinates map to real-valued positions via
//! `real = raw * scale + offset`. This module provides that transform, a
//! single-pass bounding-box helper, and the scale/offset solver described in
//! the container format's spec.

use crate::range::Range;
use crate::vector::AxisInfo;
use crate::{Error, Result};

/// The default threshold used by [`determine_offset`] when none is specified.
pub const DEFAULT_OFFSET_THRESHOLD: f64 = 1e7;

/// A per-axis linear transform between raw integer coordinates and real-valued positions.
///
/// If `real = raw * scale + offset`, `scale` is the multiplicative constant and `offset` is the
/// additive one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The multiplicative constant.
    pub scale: f64,
    /// The additive constant.
    pub offset: f64,
}

impl Transform {
    /// Creates a new transform.
    pub fn new(scale: f64, offset: f64) -> Transform {
        Transform { scale, offset }
    }

    /// Computes `raw * scale + offset`.
    ///
    /// ```
    /// use lastable::bounds::Transform;
    /// let t = Transform::new(0.01, 100.);
    /// assert_eq!(150., t.direct(5_000));
    /// ```
    pub fn direct(&self, raw: i32) -> f64 {
        f64::from(raw) * self.scale + self.offset
    }

    /// Computes `(real - offset) / scale`, rounded and clamped to `i32::MIN..=i32::MAX`.
    ///
    /// ```
    /// use lastable::bounds::Transform;
    /// let t = Transform::new(0.01, 100.);
    /// assert_eq!(5_000, t.inverse_clamped(150.));
    /// ```
    pub fn inverse_clamped(&self, real: f64) -> i32 {
        let raw = ((real - self.offset) / self.scale).round();
        if raw >= f64::from(i32::MAX) {
            i32::MAX
        } else if raw <= f64::from(i32::MIN) {
            i32::MIN
        } else {
            raw as i32
        }
    }

    /// Like [`Transform::inverse_clamped`], but fails if rounding to `i32` would saturate, as
    /// happens when the endpoint doesn't fit the chosen scale/offset.
    pub fn inverse_checked(&self, real: f64) -> Result<i32> {
        let raw = (real - self.offset) / self.scale;
        let rounded = raw.round();
        if rounded > f64::from(i32::MAX) || rounded < f64::from(i32::MIN) {
            Err(Error::ScaleOutOfRange {
                value: real,
                scale: self.scale,
                offset: self.offset,
            })
        } else {
            Ok(rounded as i32)
        }
    }
}

/// Scale, offset, and bounding range for all three axes.
///
/// Encodes how raw integer coordinates in point records map to real-valued positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialInfo {
    /// Per-axis scale factors.
    pub scale: AxisInfo<f64>,
    /// Per-axis offsets.
    pub offset: AxisInfo<f64>,
    /// Per-axis inclusive bounding ranges.
    pub range: AxisInfo<Range<f64>>,
}

impl SpatialInfo {
    /// Returns the per-axis transform, combining scale and offset.
    pub fn transform(&self) -> AxisInfo<Transform> {
        AxisInfo::new(
            Transform::new(self.scale.x, self.offset.x),
            Transform::new(self.scale.y, self.offset.y),
            Transform::new(self.scale.z, self.offset.z),
        )
    }

    /// Returns true if `(x, y, z)` falls within this info's range on every axis.
    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        self.range.x.contains(&x) && self.range.y.contains(&y) && self.range.z.contains(&z)
    }

    /// Grows the range, in place, to enclose `(x, y, z)`.
    pub fn grow(&mut self, x: f64, y: f64, z: f64) {
        self.range.x.grow(x);
        self.range.y.grow(y);
        self.range.z.grow(z);
    }
}

impl Default for SpatialInfo {
    fn default() -> SpatialInfo {
        SpatialInfo {
            scale: AxisInfo::default_scale(),
            offset: AxisInfo::default(),
            range: AxisInfo::default(),
        }
    }
}

/// Computes the (min, max) bounding box of an iterator of positions, in a single pass.
///
/// ```
/// use lastable::bounds::bounding_box;
/// let positions = vec![(0., 0., 0.), (1., -1., 2.), (-2., 3., 1.)];
/// let (min, max) = bounding_box(positions.into_iter());
/// assert_eq!(-2., min.x);
/// assert_eq!(3., max.y);
/// ```
pub fn bounding_box<I: Iterator<Item = (f64, f64, f64)>>(
    positions: I,
) -> (AxisInfo<f64>, AxisInfo<f64>) {
    let mut min = AxisInfo::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = AxisInfo::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y, z) in positions {
        min.x = min.x.min(x);
        min.y = min.y.min(y);
        min.z = min.z.min(z);
        max.x = max.x.max(x);
        max.y = max.y.max(y);
        max.z = max.z.max(z);
    }
    (min, max)
}

/// Chooses an offset for one axis such that `min` and `max`, once transformed to raw integer
/// coordinates with `scale`, both fit a signed 32-bit integer and round-trip to the same sign.
///
/// The offset is snapped to a round multiple of `threshold * scale` near the midpoint, following
/// the same convention LAS writers commonly use so that offsets stay human-readable.
pub fn determine_offset(min: f64, max: f64, scale: f64, threshold: f64) -> Result<f64> {
    let snapped = ((min + max) / (2.0 * scale * threshold)).round() * threshold * scale;
    for &endpoint in &[min, max] {
        let delta = endpoint - snapped;
        let rounded = (delta / scale).round();
        if rounded > f64::from(i32::MAX) || rounded < f64::from(i32::MIN) {
            return Err(Error::ScaleOutOfRange {
                value: endpoint,
                scale,
                offset: snapped,
            });
        }
        // The rounded raw value must land back on the same side of the offset as the
        // original endpoint, or the chosen offset doesn't actually represent it.
        if rounded.signum() != delta.signum() && rounded != 0.0 && delta != 0.0 {
            return Err(Error::ScaleOutOfRange {
                value: endpoint,
                scale,
                offset: snapped,
            });
        }
    }
    Ok(snapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trip() {
        let t = Transform::new(0.01, 100.);
        assert_eq!(150., t.direct(t.inverse_clamped(150.)));
    }

    #[test]
    fn inverse_clamped_saturates() {
        let t = Transform::new(1e-4, 0.0);
        assert_eq!(i32::MAX, t.inverse_clamped(1e12));
        assert_eq!(i32::MIN, t.inverse_clamped(-1e12));
    }

    #[test]
    fn bounding_box_single_pass() {
        let positions = vec![(0., 0., 0.), (1., -1., 2.), (-2., 3., 1.)];
        let (min, max) = bounding_box(positions.into_iter());
        assert_eq!(-2., min.x);
        assert_eq!(-1., min.y);
        assert_eq!(0., min.z);
        assert_eq!(1., max.x);
        assert_eq!(3., max.y);
        assert_eq!(2., max.z);
    }

    #[test]
    fn determine_offset_default_scale_out_of_range() {
        let scale = 1e-4;
        let x = 3.0 * f64::from(i32::MAX) * scale;
        assert!(determine_offset(0.0, x, scale, DEFAULT_OFFSET_THRESHOLD).is_err());
    }

    #[test]
    fn determine_offset_succeeds_with_looser_scale() {
        let scale = 1e-2;
        let x = 3.0 * f64::from(i32::MAX) * 1e-4;
        let offset = determine_offset(0.0, x, scale, DEFAULT_OFFSET_THRESHOLD).unwrap();
        let transform = Transform::new(scale, offset);
        let raw = transform.inverse_clamped(x);
        assert!((transform.direct(raw) - x).abs() <= scale);
    }
}

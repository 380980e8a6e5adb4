//! The scan angle field, whose wire width and scale differ between legacy and extended formats.

/// A point's scan angle, in one of two wire representations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScanAngle {
    /// The legacy representation used by point formats 0 through 5: a signed byte, one degree
    /// per unit, clamped to ±90.
    Rank(i8),
    /// The extended representation used by point formats 6 through 10: a signed 16-bit value at
    /// 0.006 degrees per unit, clamped to ±30,000 (±180 degrees).
    Scaled(i16),
}

const SCALED_LSB: f64 = 0.006;

impl ScanAngle {
    /// Builds the legacy representation from a degree value, clamped to ±90.
    pub fn rank_from_degrees(degrees: f64) -> ScanAngle {
        ScanAngle::Rank(degrees.round().clamp(-90.0, 90.0) as i8)
    }

    /// Builds the extended representation from a degree value, clamped to ±30,000 raw units
    /// (±180 degrees).
    ///
    /// ```
    /// use lastable::point::scan_angle::ScanAngle;
    /// let angle = ScanAngle::scaled_from_degrees(12.0);
    /// assert_eq!(2000, angle.to_raw());
    /// ```
    pub fn scaled_from_degrees(degrees: f64) -> ScanAngle {
        let raw = (degrees / SCALED_LSB).round();
        let clamped = raw.clamp(-30_000.0, 30_000.0);
        ScanAngle::Scaled(clamped as i16)
    }

    /// Returns the angle in degrees.
    pub fn to_degrees(&self) -> f64 {
        match *self {
            ScanAngle::Rank(rank) => f64::from(rank),
            ScanAngle::Scaled(raw) => f64::from(raw) * SCALED_LSB,
        }
    }

    /// Returns the raw wire value, widened to `i16` for either representation.
    pub fn to_raw(&self) -> i16 {
        match *self {
            ScanAngle::Rank(rank) => i16::from(rank),
            ScanAngle::Scaled(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_clamps_to_ninety() {
        assert_eq!(ScanAngle::Rank(90), ScanAngle::rank_from_degrees(200.0));
        assert_eq!(ScanAngle::Rank(-90), ScanAngle::rank_from_degrees(-200.0));
    }

    #[test]
    fn scaled_clamps_to_thirty_thousand() {
        assert_eq!(
            ScanAngle::Scaled(30_000),
            ScanAngle::scaled_from_degrees(1000.0)
        );
        assert_eq!(
            ScanAngle::Scaled(-30_000),
            ScanAngle::scaled_from_degrees(-1000.0)
        );
    }

    #[test]
    fn scaled_round_trip_degrees() {
        let angle = ScanAngle::scaled_from_degrees(12.0);
        assert!((angle.to_degrees() - 12.0).abs() < 1e-9);
    }
}

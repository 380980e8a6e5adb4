//! LAS spec version (major.minor), and which features each version supports.

use crate::feature::Feature;
use crate::point::Format;
use crate::{Error, Result};
use std::fmt;

/// LAS spec version.
///
/// Defaults to 1.2, matching the header default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// The major version. Always 1 for the versions this crate understands.
    pub major: u8,
    /// The minor version, 1 through 4.
    pub minor: u8,
}

impl Version {
    /// Creates a new version. Does not check that it's a version this crate supports.
    pub fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Checks that this is one of the versions 1.1 through 1.4 that this crate implements.
    pub fn validate(&self) -> Result<()> {
        if self.major == 1 && (1..=4).contains(&self.minor) {
            Ok(())
        } else {
            Err(Error::UnsupportedVersion(*self))
        }
    }

    /// Returns the size, in bytes, of the fixed portion of the header for this version.
    ///
    /// ```
    /// use lastable::Version;
    /// assert_eq!(227, Version::new(1, 1).header_size());
    /// assert_eq!(227, Version::new(1, 2).header_size());
    /// assert_eq!(235, Version::new(1, 3).header_size());
    /// assert_eq!(375, Version::new(1, 4).header_size());
    /// ```
    pub fn header_size(&self) -> u16 {
        match self.minor {
            0 | 1 | 2 => 227,
            3 => 235,
            _ => 375,
        }
    }

    /// Checks whether this version supports a given [`Feature`], returning an error if not.
    pub fn verify_support_for<F: Feature>(&self) -> Result<()> {
        if self.supports::<F>() {
            Ok(())
        } else {
            Err(Error::UnsupportedVersion(*self))
        }
    }

    /// Checks whether this version supports a given [`Feature`].
    pub fn supports<F: Feature>(&self) -> bool {
        F::is_supported_by(*self)
    }

    /// Checks whether this version can carry the given point format.
    ///
    /// ```
    /// use lastable::Version;
    /// use lastable::point::Format;
    /// assert!(Version::new(1, 2).supports_point_format(Format::new(3).unwrap()));
    /// assert!(!Version::new(1, 2).supports_point_format(Format::new(4).unwrap()));
    /// assert!(Version::new(1, 4).supports_point_format(Format::new(10).unwrap()));
    /// ```
    pub fn supports_point_format(&self, format: Format) -> bool {
        *self >= format.min_version()
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::new(1, 2)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version::new(major, minor)
    }
}

impl From<Version> for (u8, u8) {
    fn from(version: Version) -> (u8, u8) {
        (version.major, version.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes() {
        assert_eq!(227, Version::new(1, 1).header_size());
        assert_eq!(227, Version::new(1, 2).header_size());
        assert_eq!(235, Version::new(1, 3).header_size());
        assert_eq!(375, Version::new(1, 4).header_size());
    }

    #[test]
    fn validate() {
        assert!(Version::new(1, 1).validate().is_ok());
        assert!(Version::new(1, 4).validate().is_ok());
        assert!(Version::new(1, 0).validate().is_err());
        assert!(Version::new(1, 5).validate().is_err());
        assert!(Version::new(2, 0).validate().is_err());
    }

    #[test]
    fn ordering() {
        assert!(Version::new(1, 1) < Version::new(1, 4));
    }
}

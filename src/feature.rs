//! Programmatically determine whether a las version supports a feature.
//!
//! Mirrors the base crate's feature-marker pattern: each feature is a
//! zero-sized type implementing [`Feature`], queried via [`Version::supports`].

use crate::Version;

const MAJOR: u8 = 1;

/// A trait implemented by each feature marker type.
pub trait Feature {
    /// Is this feature supported by this version?
    fn is_supported_by(version: Version) -> bool;

    /// Returns the name of this feature, for error messages.
    fn name() -> &'static str;
}

macro_rules! features {
    ( $(
        $(#[$meta:meta])*
        $name:ident ($($minor:expr),+);
    )+ ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug)]
            pub struct $name {}

            impl Feature for $name {
                fn is_supported_by(version: Version) -> bool {
                    [$($minor),+].into_iter().any(|minor| version == Version::new(MAJOR, minor))
                }

                fn name() -> &'static str {
                    stringify!($name)
                }
            }
        )+
    }
}

features! {
    /// Is there a bit flag for whether GPS time is standard or week time?
    GpsStandardTime(2, 3, 4);
    /// Does this version support waveform data packets?
    Waveforms(3, 4);
    /// Is there a bit flag to indicate synthetically generated return numbers?
    SyntheticReturnNumbers(3, 4);
    /// Does this version support 64-bit point counts and 15-element per-return counts?
    LargeFiles(4);
    /// Does this version support extended variable length records?
    Evlrs(4);
    /// Does this version support a WKT coordinate reference system?
    Wkt(4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveforms() {
        assert!(!Waveforms::is_supported_by(Version::new(1, 2)));
        assert!(Waveforms::is_supported_by(Version::new(1, 3)));
        assert!(Waveforms::is_supported_by(Version::new(1, 4)));
    }

    #[test]
    fn large_files() {
        assert!(!LargeFiles::is_supported_by(Version::new(1, 3)));
        assert!(LargeFiles::is_supported_by(Version::new(1, 4)));
    }
}

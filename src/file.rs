//! Thin path-based convenience wrappers around the stream-oriented [`Dataset`] API.
//!
//! No argument parsing and no invariant enforcement happens here; it's a facade over
//! [`Dataset::read_from`]/[`Dataset::write_to`] for the common case of a file on disk.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::{Dataset, Result};

impl Dataset {
    /// Reads a dataset from the LAS (or LAZ, with the `laz` feature and a `.laz` extension) file
    /// at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        #[cfg(feature = "laz")]
        if path.extension().and_then(|ext| ext.to_str()) == Some("laz") {
            return crate::laz::read_laz(File::open(path)?);
        }
        let file = File::open(path)?;
        Dataset::read_from(BufReader::new(file))
    }

    /// Writes this dataset to `path`, compressing to LAZ if the `laz` feature is enabled and
    /// `path` ends in `.laz`.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        #[cfg(feature = "laz")]
        if path.extension().and_then(|ext| ext.to_str()) == Some("laz") {
            return crate::laz::write_laz(self, File::create(path)?);
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Reads a dataset from a path, dispatching on extension between the native codec and LAZ.
pub fn open_las(path: impl AsRef<Path>) -> Result<Dataset> {
    Dataset::from_path(path)
}

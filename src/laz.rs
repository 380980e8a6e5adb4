//! LAZ support: shelling out to an external `laszip` executable rather than decompressing
//! in-process.
//!
//! LAZ's compressor is out of scope for this crate (see spec.md's Non-goals); this module instead
//! round-trips through temporary `.las`/`.laz` files and an external `laszip` invocation, so the
//! rest of the crate never has to know a file was compressed.

use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;

use tempfile::Builder;

use crate::{Dataset, Error, Result};

/// Decodes a dataset from a LAZ stream by writing it to a temp file, decompressing it with
/// `laszip` into a sibling `.las` temp file, and decoding that.
pub fn read_laz<R: Read>(mut read: R) -> Result<Dataset> {
    let mut laz_file = Builder::new().suffix(".laz").tempfile()?;
    std::io::copy(&mut read, &mut laz_file)?;
    laz_file.flush()?;

    let las_file = Builder::new().suffix(".las").tempfile()?;
    let las_path = las_file.path().to_path_buf();
    // laszip refuses to overwrite an existing output file, so only the path is kept.
    drop(las_file);

    run_laszip(&["-i", path_str(laz_file.path())?, "-o", path_str(&las_path)?])?;

    let las_file = std::fs::File::open(&las_path)?;
    let dataset = Dataset::read_from(std::io::BufReader::new(las_file));
    let _ = std::fs::remove_file(&las_path);
    dataset
}

/// Encodes a dataset to a LAZ stream by writing it to a temp `.las` file, compressing it with
/// `laszip` into a sibling `.laz` temp file, and copying that out.
pub fn write_laz<W: Write>(dataset: &Dataset, mut write: W) -> Result<()> {
    let mut las_file = Builder::new().suffix(".las").tempfile()?;
    dataset.write_to(&mut las_file)?;
    las_file.flush()?;

    let laz_file = Builder::new().suffix(".laz").tempfile()?;
    let laz_path = laz_file.path().to_path_buf();
    drop(laz_file);

    run_laszip(&["-i", path_str(las_file.path())?, "-o", path_str(&laz_path)?])?;

    let mut laz_file = std::fs::File::open(&laz_path)?;
    std::io::copy(&mut laz_file, &mut write)?;
    let _ = std::fs::remove_file(&laz_path);
    Ok(())
}

fn run_laszip(args: &[&str]) -> Result<()> {
    let output = Command::new("laszip").args(args).output()?;
    if !output.status.success() {
        return Err(Error::InvalidFormat(format!(
            "laszip exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        Error::InvalidFormat(format!("temp path {path:?} is not valid utf-8"))
    })
}

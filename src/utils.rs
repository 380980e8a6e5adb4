//! Byte-level primitives: fixed-width strings and little-endian numeric I/O.

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The four-byte file signature every LAS file must start with.
pub const LASF: [u8; 4] = *b"LASF";

/// Reads four bytes and checks that they spell `LASF`.
///
/// ```
/// use std::io::Cursor;
/// use lastable::utils::skip_signature;
/// assert!(skip_signature(Cursor::new(b"LASF")).is_ok());
/// assert!(skip_signature(Cursor::new(b"ABCD")).is_err());
/// ```
pub fn skip_signature<R: Read>(mut read: R) -> Result<()> {
    let mut signature = [0; 4];
    read.read_exact(&mut signature)?;
    if signature == LASF {
        Ok(())
    } else {
        Err(Error::InvalidFormat(format!(
            "file signature was {:?}, expected \"LASF\"",
            signature
        )))
    }
}

/// Reads `n` bytes and returns the prefix before the first NUL byte, as a `String`.
///
/// Trailing bytes after the first NUL are discarded without complaint — in-the-wild LAS files
/// often don't zero-fill their string fields past the first terminator.
///
/// ```
/// use std::io::Cursor;
/// use lastable::utils::read_padded_string;
/// let s = read_padded_string(Cursor::new(b"hi\0\0\0"), 5).unwrap();
/// assert_eq!("hi", s);
/// ```
pub fn read_padded_string<R: Read>(mut read: R, n: usize) -> Result<String> {
    let mut bytes = vec![0; n];
    read.read_exact(&mut bytes)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes.truncate(end);
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidFormat(format!("field is not valid utf-8: {e}")))
}

/// Writes `s` followed by enough NUL bytes to fill exactly `n` bytes.
///
/// Fails with [`Error::InvalidArgument`] if `s` is longer than `n` bytes.
///
/// ```
/// use std::io::Cursor;
/// use lastable::utils::write_padded_string;
/// let mut buf = Vec::new();
/// write_padded_string(&mut buf, "hi", 5).unwrap();
/// assert_eq!(b"hi\0\0\0", &buf[..]);
/// ```
pub fn write_padded_string<W: Write>(mut write: W, s: &str, n: usize) -> Result<()> {
    if s.len() > n {
        return Err(Error::InvalidArgument {
            value: s.to_string(),
            max: n,
        });
    }
    write.write_all(s.as_bytes())?;
    let padding = vec![0u8; n - s.len()];
    write.write_all(&padding)?;
    Ok(())
}

/// Returns `Some(n)` unless `n` is zero — several LAS fields use zero to mean "absent".
pub fn some_unless_zero<T: PartialEq + Default>(n: T) -> Option<T> {
    if n == T::default() {
        None
    } else {
        Some(n)
    }
}

pub(crate) fn read_u16<R: Read>(mut r: R) -> Result<u16> {
    Ok(r.read_u16::<LittleEndian>()?)
}

pub(crate) fn write_u16<W: Write>(mut w: W, n: u16) -> Result<()> {
    Ok(w.write_u16::<LittleEndian>(n)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn padded_string_round_trip() {
        let mut buf = Vec::new();
        write_padded_string(&mut buf, "LASF_Spec", 16).unwrap();
        assert_eq!(16, buf.len());
        let s = read_padded_string(Cursor::new(buf), 16).unwrap();
        assert_eq!("LASF_Spec", s);
    }

    #[test]
    fn write_padded_string_too_long() {
        let mut buf = Vec::new();
        assert!(write_padded_string(&mut buf, "this is too long", 4).is_err());
    }

    #[test]
    fn signature_mismatch() {
        assert!(skip_signature(Cursor::new(b"ABCD")).is_err());
    }
}

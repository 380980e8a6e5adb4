//! The wire header shared by every VLR and EVLR, with its payload left undecoded.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::utils::{read_padded_string, write_padded_string};
use crate::{Error, Result};

/// Wire size of a normal VLR's header, not counting its payload.
pub const HEADER_SIZE: u64 = 54;
/// Wire size of an extended VLR's header, not counting its payload.
pub const EXTENDED_HEADER_SIZE: u64 = 60;

const USER_ID_LEN: usize = 16;
const DESCRIPTION_LEN: usize = 32;

/// The raw, not-yet-dispatched contents of one VLR or EVLR: its header fields plus an undecoded
/// payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawVlr {
    /// Reserved wire field; always round-tripped as read.
    pub reserved: u16,
    /// The registering organization's id, e.g. `"LASF_Spec"`.
    pub user_id: String,
    /// The payload kind, scoped to `user_id`.
    pub record_id: u16,
    /// A free-form description.
    pub description: String,
    /// The undecoded payload bytes.
    pub payload: Vec<u8>,
}

impl RawVlr {
    /// Reads one VLR header and payload. `extended` selects the 16-bit (normal) or 64-bit
    /// (extended) payload length field.
    pub fn read_from<R: Read>(mut read: R, extended: bool) -> Result<RawVlr> {
        let reserved = read.read_u16::<LittleEndian>()?;
        let user_id = read_padded_string(&mut read, USER_ID_LEN)?;
        let record_id = read.read_u16::<LittleEndian>()?;
        let payload_len = if extended {
            read.read_u64::<LittleEndian>()?
        } else {
            u64::from(read.read_u16::<LittleEndian>()?)
        };
        let description = read_padded_string(&mut read, DESCRIPTION_LEN)?;
        let mut payload = vec![0u8; payload_len as usize];
        read.read_exact(&mut payload)?;
        Ok(RawVlr {
            reserved,
            user_id,
            record_id,
            description,
            payload,
        })
    }

    /// Writes this VLR's header and payload. Fails with [`Error::PayloadTooLarge`] if the payload
    /// exceeds the size cap for `extended`.
    pub fn write_to<W: Write>(&self, mut write: W, extended: bool) -> Result<()> {
        let max = if extended {
            u64::MAX
        } else {
            u64::from(u16::MAX)
        };
        let len = self.payload.len() as u64;
        if len > max {
            return Err(Error::PayloadTooLarge { len, max });
        }
        write.write_u16::<LittleEndian>(self.reserved)?;
        write_padded_string(&mut write, &self.user_id, USER_ID_LEN)?;
        write.write_u16::<LittleEndian>(self.record_id)?;
        if extended {
            write.write_u64::<LittleEndian>(len)?;
        } else {
            write.write_u16::<LittleEndian>(len as u16)?;
        }
        write_padded_string(&mut write, &self.description, DESCRIPTION_LEN)?;
        write.write_all(&self.payload)?;
        Ok(())
    }

    /// Returns this VLR's total wire size, header plus payload.
    pub fn wire_size(&self, extended: bool) -> u64 {
        let header = if extended {
            EXTENDED_HEADER_SIZE
        } else {
            HEADER_SIZE
        };
        header + self.payload.len() as u64
    }
}

//! The well-known VLR payload types this library understands natively.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::any::TypeId;
use std::io::{Cursor, Read, Write};

use crate::schema::ScalarType;
use crate::utils::{read_padded_string, write_padded_string};
use crate::vlr::registry;
use crate::{Error, Result};

/// One entry in a [`GeoKeys`] directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    /// The GeoTIFF key id.
    pub key_id: u16,
    /// Which tag the value lives in (0 means the value is stored inline in `value_offset`).
    pub tiff_tag_location: u16,
    /// Number of values, for array-valued keys.
    pub count: u16,
    /// Either the value itself (when `tiff_tag_location == 0`) or an offset into the referenced
    /// tag's array.
    pub value_offset: u16,
}

/// `("LASF_Projection", 34735)`: a directory of GeoTIFF-style coordinate reference system keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeoKeys {
    /// Directory version; always 1 in practice.
    pub key_directory_version: u16,
    /// Key revision major component.
    pub key_revision: u16,
    /// Key revision minor component.
    pub minor_revision: u16,
    /// The key entries.
    pub keys: Vec<KeyEntry>,
}

impl GeoKeys {
    pub(crate) fn decode(bytes: &[u8]) -> Result<GeoKeys> {
        let mut cursor = Cursor::new(bytes);
        let key_directory_version = cursor.read_u16::<LittleEndian>()?;
        let key_revision = cursor.read_u16::<LittleEndian>()?;
        let minor_revision = cursor.read_u16::<LittleEndian>()?;
        let number_of_keys = cursor.read_u16::<LittleEndian>()?;
        let mut keys = Vec::with_capacity(number_of_keys as usize);
        for _ in 0..number_of_keys {
            keys.push(KeyEntry {
                key_id: cursor.read_u16::<LittleEndian>()?,
                tiff_tag_location: cursor.read_u16::<LittleEndian>()?,
                count: cursor.read_u16::<LittleEndian>()?,
                value_offset: cursor.read_u16::<LittleEndian>()?,
            });
        }
        Ok(GeoKeys {
            key_directory_version,
            key_revision,
            minor_revision,
            keys,
        })
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.write_u16::<LittleEndian>(self.key_directory_version)?;
        buf.write_u16::<LittleEndian>(self.key_revision)?;
        buf.write_u16::<LittleEndian>(self.minor_revision)?;
        buf.write_u16::<LittleEndian>(self.keys.len() as u16)?;
        for key in &self.keys {
            buf.write_u16::<LittleEndian>(key.key_id)?;
            buf.write_u16::<LittleEndian>(key.tiff_tag_location)?;
            buf.write_u16::<LittleEndian>(key.count)?;
            buf.write_u16::<LittleEndian>(key.value_offset)?;
        }
        Ok(buf)
    }
}

/// `("LASF_Projection", 34736)`: double-precision parameters referenced by [`GeoKeys`] entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoDoubleParamsTag(pub Vec<f64>);

impl GeoDoubleParamsTag {
    pub(crate) fn decode(bytes: &[u8]) -> Result<GeoDoubleParamsTag> {
        let mut cursor = Cursor::new(bytes);
        let mut values = Vec::with_capacity(bytes.len() / 8);
        while (cursor.position() as usize) < bytes.len() {
            values.push(cursor.read_f64::<LittleEndian>()?);
        }
        Ok(GeoDoubleParamsTag(values))
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for value in &self.0 {
            buf.write_f64::<LittleEndian>(*value)?;
        }
        Ok(buf)
    }
}

/// `("LASF_Projection", 34737)`: a null-delimited blob of ASCII parameters referenced by
/// [`GeoKeys`] entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeoAsciiParamsTag(pub String);

impl GeoAsciiParamsTag {
    pub(crate) fn decode(bytes: &[u8]) -> Result<GeoAsciiParamsTag> {
        let text = bytes
            .iter()
            .map(|&b| if b == 0 { '|' } else { b as char })
            .collect();
        Ok(GeoAsciiParamsTag(text))
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        Ok(self
            .0
            .chars()
            .map(|c| if c == '|' { 0 } else { c as u8 })
            .collect())
    }
}

/// `("LASF_Projection", 2112)`: an OGC WKT coordinate reference system string, with its linear
/// units parsed out at decode time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OgcWkt {
    /// The raw WKT text, without its trailing NUL.
    pub wkt: String,
    /// The horizontal linear unit name, if one could be parsed out of `wkt`.
    pub horizontal_unit: Option<String>,
    /// The vertical linear unit name, if one could be parsed out of `wkt`.
    pub vertical_unit: Option<String>,
}

impl OgcWkt {
    pub(crate) fn decode(bytes: &[u8]) -> Result<OgcWkt> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let wkt = String::from_utf8(bytes[..end].to_vec())
            .map_err(|e| Error::InvalidFormat(format!("wkt payload is not valid utf-8: {e}")))?;
        let (horizontal_unit, vertical_unit) = crate::crs::parse_units(&wkt);
        Ok(OgcWkt {
            wkt,
            horizontal_unit,
            vertical_unit,
        })
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = self.wkt.as_bytes().to_vec();
        buf.push(0);
        Ok(buf)
    }
}

/// One entry in a [`ClassificationLookup`] table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationLookupEntry {
    /// The class number this entry describes.
    pub class: u8,
    /// A free-form description of the class.
    pub description: String,
}

/// `("LASF_Spec", 0)`: a dictionary mapping class numbers to human-readable descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationLookup(pub Vec<ClassificationLookupEntry>);

const CLASSIFICATION_LOOKUP_DESCRIPTION_LEN: usize = 15;
const CLASSIFICATION_LOOKUP_ENTRY_SIZE: usize = 1 + CLASSIFICATION_LOOKUP_DESCRIPTION_LEN;
const CLASSIFICATION_LOOKUP_MAX_ENTRIES: usize = 256;

impl ClassificationLookup {
    pub(crate) fn decode(bytes: &[u8]) -> Result<ClassificationLookup> {
        let mut entries = Vec::new();
        let mut cursor = Cursor::new(bytes);
        while (cursor.position() as usize) + CLASSIFICATION_LOOKUP_ENTRY_SIZE <= bytes.len() {
            let class = cursor.read_u8()?;
            let description =
                read_padded_string(&mut cursor, CLASSIFICATION_LOOKUP_DESCRIPTION_LEN)?;
            entries.push(ClassificationLookupEntry { class, description });
        }
        Ok(ClassificationLookup(entries))
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        if self.0.len() > CLASSIFICATION_LOOKUP_MAX_ENTRIES {
            return Err(Error::InvalidArgument {
                value: format!("{} classification lookup entries", self.0.len()),
                max: CLASSIFICATION_LOOKUP_MAX_ENTRIES,
            });
        }
        let mut buf = Vec::new();
        for entry in &self.0 {
            buf.write_u8(entry.class)?;
            write_padded_string(&mut buf, &entry.description, CLASSIFICATION_LOOKUP_DESCRIPTION_LEN)?;
        }
        Ok(buf)
    }
}

/// `("LASF_Spec", 3)`: a free-form ASCII blob, commonly used for area-of-coverage descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextAreaDescription(pub String);

impl TextAreaDescription {
    pub(crate) fn decode(bytes: &[u8]) -> Result<TextAreaDescription> {
        String::from_utf8(bytes.to_vec())
            .map(TextAreaDescription)
            .map_err(|e| Error::InvalidFormat(format!("text area description is not valid utf-8: {e}")))
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.0.as_bytes().to_vec())
    }
}

/// One documented user column, or one component of a vector user column.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraBytesRecord {
    /// Bitfield of which of no-data/min/max/scale/offset are meaningful.
    pub options: u8,
    /// The column name (or, for a vector component, `"name [i]"`).
    pub name: String,
    /// Raw 8-byte no-data value, interpreted per `data_type`.
    pub no_data: [u8; 8],
    /// Raw 8-byte minimum value, interpreted per `data_type`.
    pub min: [u8; 8],
    /// Raw 8-byte maximum value, interpreted per `data_type`.
    pub max: [u8; 8],
    /// Raw 8-byte scale factor, interpreted per `data_type`.
    pub scale: [u8; 8],
    /// Raw 8-byte offset, interpreted per `data_type`.
    pub offset: [u8; 8],
    /// A free-form description.
    pub description: String,
    /// The ASPRS extra-bytes data-type code; see [`ScalarType::to_data_type_code`].
    pub data_type: u8,
}

const EXTRA_BYTES_NAME_LEN: usize = 32;
const EXTRA_BYTES_DESCRIPTION_LEN: usize = 32;
/// The fixed on-disk size of one [`ExtraBytesRecord`].
pub const EXTRA_BYTES_RECORD_SIZE: usize = 192;
const EXTRA_BYTES_RESERVED_LEN: usize =
    EXTRA_BYTES_RECORD_SIZE - (1 + EXTRA_BYTES_NAME_LEN + 8 * 5 + EXTRA_BYTES_DESCRIPTION_LEN + 1);

impl ExtraBytesRecord {
    /// Creates a new extra-bytes record for `scalar`, with no-data/min/max/scale/offset left
    /// unset.
    pub fn new(name: impl Into<String>, scalar: ScalarType) -> ExtraBytesRecord {
        ExtraBytesRecord {
            options: 0,
            name: name.into(),
            no_data: [0; 8],
            min: [0; 8],
            max: [0; 8],
            scale: [0; 8],
            offset: [0; 8],
            description: String::new(),
            data_type: scalar.to_data_type_code(),
        }
    }

    /// Returns the scalar type this record documents.
    pub fn scalar(&self) -> Result<ScalarType> {
        ScalarType::from_data_type_code(self.data_type)
    }
}

/// `("LASF_Spec", 4)`: the documented schema of every user column in the file.
///
/// One VLR, with one record per scalar column (vector columns are split into consecutive
/// `"col [i]"` entries), shared by the whole file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtraBytes(pub Vec<ExtraBytesRecord>);

impl ExtraBytes {
    pub(crate) fn decode(bytes: &[u8]) -> Result<ExtraBytes> {
        if bytes.len() % EXTRA_BYTES_RECORD_SIZE != 0 {
            return Err(Error::InconsistentVlr(format!(
                "extra bytes payload of {} bytes is not a multiple of the {}-byte record size",
                bytes.len(),
                EXTRA_BYTES_RECORD_SIZE
            )));
        }
        let mut records = Vec::with_capacity(bytes.len() / EXTRA_BYTES_RECORD_SIZE);
        let mut cursor = Cursor::new(bytes);
        while (cursor.position() as usize) < bytes.len() {
            let options = cursor.read_u8()?;
            let name = read_padded_string(&mut cursor, EXTRA_BYTES_NAME_LEN)?;
            let mut no_data = [0u8; 8];
            cursor.read_exact(&mut no_data)?;
            let mut min = [0u8; 8];
            cursor.read_exact(&mut min)?;
            let mut max = [0u8; 8];
            cursor.read_exact(&mut max)?;
            let mut scale = [0u8; 8];
            cursor.read_exact(&mut scale)?;
            let mut offset = [0u8; 8];
            cursor.read_exact(&mut offset)?;
            let description = read_padded_string(&mut cursor, EXTRA_BYTES_DESCRIPTION_LEN)?;
            let data_type = cursor.read_u8()?;
            let mut reserved = vec![0u8; EXTRA_BYTES_RESERVED_LEN];
            cursor.read_exact(&mut reserved)?;
            records.push(ExtraBytesRecord {
                options,
                name,
                no_data,
                min,
                max,
                scale,
                offset,
                description,
                data_type,
            });
        }
        Ok(ExtraBytes(records))
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.0.len() * EXTRA_BYTES_RECORD_SIZE);
        for record in &self.0 {
            buf.write_u8(record.options)?;
            write_padded_string(&mut buf, &record.name, EXTRA_BYTES_NAME_LEN)?;
            buf.write_all(&record.no_data)?;
            buf.write_all(&record.min)?;
            buf.write_all(&record.max)?;
            buf.write_all(&record.scale)?;
            buf.write_all(&record.offset)?;
            write_padded_string(&mut buf, &record.description, EXTRA_BYTES_DESCRIPTION_LEN)?;
            buf.write_u8(record.data_type)?;
            buf.write_all(&vec![0u8; EXTRA_BYTES_RESERVED_LEN])?;
        }
        Ok(buf)
    }
}

/// `("LASF_Spec", 100..=354)`: the fixed descriptor for one registered waveform packet format.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaveformPacketDescriptor {
    /// Bits of sample precision, 2 through 32.
    pub bits_per_sample: u8,
    /// Compression scheme; 0 means uncompressed.
    pub compression_type: u8,
    /// Number of samples per waveform packet of this kind.
    pub number_of_samples: u32,
    /// Spacing between samples, in picoseconds.
    pub temporal_sample_spacing: u32,
    /// Multiplier applied to digitized amplitude to recover voltage.
    pub digitizer_gain: f64,
    /// Offset applied to digitized amplitude to recover voltage.
    pub digitizer_offset: f64,
}

impl WaveformPacketDescriptor {
    pub(crate) fn decode(bytes: &[u8]) -> Result<WaveformPacketDescriptor> {
        let mut cursor = Cursor::new(bytes);
        Ok(WaveformPacketDescriptor {
            bits_per_sample: cursor.read_u8()?,
            compression_type: cursor.read_u8()?,
            number_of_samples: cursor.read_u32::<LittleEndian>()?,
            temporal_sample_spacing: cursor.read_u32::<LittleEndian>()?,
            digitizer_gain: cursor.read_f64::<LittleEndian>()?,
            digitizer_offset: cursor.read_f64::<LittleEndian>()?,
        })
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.write_u8(self.bits_per_sample)?;
        buf.write_u8(self.compression_type)?;
        buf.write_u32::<LittleEndian>(self.number_of_samples)?;
        buf.write_u32::<LittleEndian>(self.temporal_sample_spacing)?;
        buf.write_f64::<LittleEndian>(self.digitizer_gain)?;
        buf.write_f64::<LittleEndian>(self.digitizer_offset)?;
        Ok(buf)
    }
}

/// The record id a superseded `"LASF_Spec"` VLR is rewritten to.
pub const SUPERSEDED_RECORD_ID: u16 = 7;
/// The record id range reserved for [`WaveformPacketDescriptor`] entries.
pub const WAVEFORM_PACKET_DESCRIPTOR_RECORD_IDS: std::ops::RangeInclusive<u16> = 100..=354;

/// Binds `Payload::$variant` to its decode/encode pair for [`registry::register`].
///
/// The encode side matches on the concrete variant because a registered codec can be looked up for
/// a `(user_id, record_id)` whose VLR has since been superseded and carries some other payload
/// mid-transition; [`crate::vlr::Payload::encode`] only calls the registry for the variant it was
/// bound under, but this guards against a mismatch producing silently wrong bytes.
macro_rules! codec {
    ($ty:ident, $variant:ident) => {
        (
            (|bytes: &[u8]| {
                Ok(crate::vlr::Payload::$variant($ty::decode(bytes)?))
            }) as registry::Decode,
            (|payload: &crate::vlr::Payload| match payload {
                crate::vlr::Payload::$variant(p) => p.encode(),
                other => Err(Error::InconsistentVlr(format!(
                    "registered {} codec can't encode a {} payload",
                    stringify!($variant),
                    other.kind_name()
                ))),
            }) as registry::Encode,
        )
    };
}

/// Reserves this module's well-known `(user-id, record-id)` pairs in the process-wide registry,
/// binding each to the decode/encode pair [`crate::vlr::Payload::decode`]/`encode` dispatch
/// through. Called once via [`registry::ensure_builtins_registered`].
pub(crate) fn register_builtins() -> Result<()> {
    let (decode, encode) = codec!(ClassificationLookup, ClassificationLookup);
    registry::register(
        TypeId::of::<ClassificationLookup>(),
        "LASF_Spec",
        &[0],
        decode,
        encode,
    )?;
    let (decode, encode) = codec!(TextAreaDescription, TextAreaDescription);
    registry::register(
        TypeId::of::<TextAreaDescription>(),
        "LASF_Spec",
        &[3],
        decode,
        encode,
    )?;
    let (decode, encode) = codec!(ExtraBytes, ExtraBytes);
    registry::register(
        TypeId::of::<ExtraBytes>(),
        "LASF_Spec",
        &[4],
        decode,
        encode,
    )?;
    let waveform_ids: Vec<u16> = WAVEFORM_PACKET_DESCRIPTOR_RECORD_IDS.collect();
    let (decode, encode) = codec!(WaveformPacketDescriptor, WaveformPacketDescriptor);
    registry::register(
        TypeId::of::<WaveformPacketDescriptor>(),
        "LASF_Spec",
        &waveform_ids,
        decode,
        encode,
    )?;
    let (decode, encode) = codec!(GeoKeys, GeoKeys);
    registry::register(
        TypeId::of::<GeoKeys>(),
        "LASF_Projection",
        &[34735],
        decode,
        encode,
    )?;
    let (decode, encode) = codec!(GeoDoubleParamsTag, GeoDoubleParams);
    registry::register(
        TypeId::of::<GeoDoubleParamsTag>(),
        "LASF_Projection",
        &[34736],
        decode,
        encode,
    )?;
    let (decode, encode) = codec!(GeoAsciiParamsTag, GeoAsciiParams);
    registry::register(
        TypeId::of::<GeoAsciiParamsTag>(),
        "LASF_Projection",
        &[34737],
        decode,
        encode,
    )?;
    let (decode, encode) = codec!(OgcWkt, Wkt);
    registry::register(
        TypeId::of::<OgcWkt>(),
        "LASF_Projection",
        &[2112],
        decode,
        encode,
    )?;
    Ok(())
}

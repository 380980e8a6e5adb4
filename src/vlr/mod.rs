//! Variable-Length Records: the generic container, its well-known payload types, and the
//! process-wide registry that dispatches a `(user-id, record-id)` pair to one of them.

pub mod payloads;
pub mod raw;
pub mod registry;

use crate::{Error, Result};
use payloads::{
    ClassificationLookup, ExtraBytes, GeoAsciiParamsTag, GeoDoubleParamsTag, GeoKeys, OgcWkt,
    TextAreaDescription, WaveformPacketDescriptor, SUPERSEDED_RECORD_ID,
    WAVEFORM_PACKET_DESCRIPTOR_RECORD_IDS,
};
use raw::RawVlr;

/// A VLR's decoded payload: one of the well-known kinds this library understands, or the raw
/// bytes of anything else.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// `("LASF_Projection", 34735)`.
    GeoKeys(GeoKeys),
    /// `("LASF_Projection", 34736)`.
    GeoDoubleParams(GeoDoubleParamsTag),
    /// `("LASF_Projection", 34737)`.
    GeoAsciiParams(GeoAsciiParamsTag),
    /// `("LASF_Projection", 2112)`.
    Wkt(OgcWkt),
    /// `("LASF_Spec", 0)`.
    ClassificationLookup(ClassificationLookup),
    /// `("LASF_Spec", 3)`.
    TextAreaDescription(TextAreaDescription),
    /// `("LASF_Spec", 4)`.
    ExtraBytes(ExtraBytes),
    /// `("LASF_Spec", 100..=354)`.
    WaveformPacketDescriptor(WaveformPacketDescriptor),
    /// Any `(user-id, record-id)` pair this library doesn't have a dedicated type for.
    Unknown(Vec<u8>),
}

impl Payload {
    /// Decodes a payload's wire bytes, dispatching on `(user_id, record_id)` via the process-wide
    /// registry. A pair with no registered codec decodes as [`Payload::Unknown`].
    fn decode(user_id: &str, record_id: u16, bytes: &[u8]) -> Result<Payload> {
        registry::ensure_builtins_registered();
        match registry::decode(user_id, record_id, bytes) {
            Some(result) => result,
            None => Ok(Payload::Unknown(bytes.to_vec())),
        }
    }

    /// Encodes this payload to its wire bytes, preferring the codec registered for
    /// `(user_id, record_id)`.
    ///
    /// Falls back to this payload's own variant-matched encoder when no codec is registered for
    /// that pair (always true for [`Payload::Unknown`], and also possible for a well-known payload
    /// whose VLR was rewritten to the superseded record id after construction).
    fn encode(&self, user_id: &str, record_id: u16) -> Result<Vec<u8>> {
        registry::ensure_builtins_registered();
        if let Some(result) = registry::encode(user_id, record_id, self) {
            return result;
        }
        self.encode_direct()
    }

    fn encode_direct(&self) -> Result<Vec<u8>> {
        match self {
            Payload::GeoKeys(p) => p.encode(),
            Payload::GeoDoubleParams(p) => p.encode(),
            Payload::GeoAsciiParams(p) => p.encode(),
            Payload::Wkt(p) => p.encode(),
            Payload::ClassificationLookup(p) => p.encode(),
            Payload::TextAreaDescription(p) => p.encode(),
            Payload::ExtraBytes(p) => p.encode(),
            Payload::WaveformPacketDescriptor(p) => p.encode(),
            Payload::Unknown(bytes) => Ok(bytes.clone()),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Payload::GeoKeys(_) => "GeoKeys",
            Payload::GeoDoubleParams(_) => "GeoDoubleParamsTag",
            Payload::GeoAsciiParams(_) => "GeoAsciiParamsTag",
            Payload::Wkt(_) => "OGC_WKT",
            Payload::ClassificationLookup(_) => "ClassificationLookup",
            Payload::TextAreaDescription(_) => "TextAreaDescription",
            Payload::ExtraBytes(_) => "ExtraBytes",
            Payload::WaveformPacketDescriptor(_) => "WaveformPacketDescriptor",
            Payload::Unknown(_) => "unknown",
        }
    }
}

/// A Variable-Length Record (or, when `extended` is true, an Extended VLR): a typed payload under
/// a registering organization's user id and a payload-specific record id.
#[derive(Clone, Debug, PartialEq)]
pub struct Vlr {
    /// Reserved wire field; preserved as read, zero by default.
    pub reserved: u16,
    /// The registering organization's id, e.g. `"LASF_Spec"`.
    pub user_id: String,
    /// The payload kind, scoped to `user_id`.
    pub record_id: u16,
    /// A free-form description.
    pub description: String,
    /// The decoded payload.
    pub payload: Payload,
    /// Whether this VLR is stored as an Extended VLR (after point records) rather than a normal
    /// one (before them).
    pub extended: bool,
}

impl Vlr {
    /// Creates a new VLR, checking that `record_id` matches `payload`'s expected id for
    /// well-known payload types stored under `"LASF_Spec"` or `"LASF_Projection"`.
    pub fn new(
        user_id: impl Into<String>,
        record_id: u16,
        description: impl Into<String>,
        payload: Payload,
    ) -> Result<Vlr> {
        let user_id = user_id.into();
        let description = description.into();
        check_record_id(&user_id, record_id, &payload)?;
        Ok(Vlr {
            reserved: 0,
            user_id,
            record_id,
            description,
            payload,
            extended: false,
        })
    }

    /// Marks this VLR as an Extended VLR (stored after point records, with a 64-bit payload
    /// length) rather than a normal one.
    pub fn into_extended(mut self) -> Vlr {
        self.extended = true;
        self
    }

    /// Returns the (user-id, record-id) key this VLR is addressed by.
    pub fn key(&self) -> (&str, u16) {
        (&self.user_id, self.record_id)
    }

    /// Returns true iff this VLR has been marked superseded (record-id rewritten to 7).
    pub fn is_superseded(&self) -> bool {
        self.record_id == SUPERSEDED_RECORD_ID
    }

    /// Rewrites this VLR's record-id to 7, marking it superseded.
    ///
    /// Fails with [`Error::InconsistentVlr`] unless this VLR is authored under `"LASF_Spec"`.
    pub fn set_superseded(&mut self) -> Result<()> {
        if self.user_id != "LASF_Spec" {
            return Err(Error::InconsistentVlr(format!(
                "only \"LASF_Spec\" vlrs may be superseded, got {:?}",
                self.user_id
            )));
        }
        self.record_id = SUPERSEDED_RECORD_ID;
        Ok(())
    }

    /// Decodes a VLR from its raw wire form, dispatching on `(user_id, record_id)`.
    pub fn from_raw(raw: RawVlr, extended: bool) -> Result<Vlr> {
        let payload = Payload::decode(&raw.user_id, raw.record_id, &raw.payload)?;
        Ok(Vlr {
            reserved: raw.reserved,
            user_id: raw.user_id,
            record_id: raw.record_id,
            description: raw.description,
            payload,
            extended,
        })
    }

    /// Encodes this VLR to its raw wire form.
    pub fn to_raw(&self) -> Result<RawVlr> {
        Ok(RawVlr {
            reserved: self.reserved,
            user_id: self.user_id.clone(),
            record_id: self.record_id,
            description: self.description.clone(),
            payload: self.payload.encode(&self.user_id, self.record_id)?,
        })
    }

    /// Returns this VLR's total wire size, header plus payload.
    pub fn wire_size(&self) -> Result<u64> {
        Ok(self.to_raw()?.wire_size(self.extended))
    }
}

fn check_record_id(user_id: &str, record_id: u16, payload: &Payload) -> Result<()> {
    if record_id == SUPERSEDED_RECORD_ID && user_id == "LASF_Spec" {
        return Ok(());
    }
    let expected: Option<u16> = match (user_id, payload) {
        ("LASF_Spec", Payload::ClassificationLookup(_)) => Some(0),
        ("LASF_Spec", Payload::TextAreaDescription(_)) => Some(3),
        ("LASF_Spec", Payload::ExtraBytes(_)) => Some(4),
        ("LASF_Projection", Payload::GeoKeys(_)) => Some(34735),
        ("LASF_Projection", Payload::GeoDoubleParams(_)) => Some(34736),
        ("LASF_Projection", Payload::GeoAsciiParams(_)) => Some(34737),
        ("LASF_Projection", Payload::Wkt(_)) => Some(2112),
        _ => None,
    };
    if let Some(expected_id) = expected {
        if record_id != expected_id {
            return Err(Error::InconsistentVlr(format!(
                "{} under {:?} must use record id {}, got {}",
                payload.kind_name(),
                user_id,
                expected_id,
                record_id
            )));
        }
    }
    if user_id == "LASF_Spec"
        && matches!(payload, Payload::WaveformPacketDescriptor(_))
        && !WAVEFORM_PACKET_DESCRIPTOR_RECORD_IDS.contains(&record_id)
    {
        return Err(Error::InconsistentVlr(format!(
            "waveform packet descriptor record id {record_id} is outside {}..={}",
            WAVEFORM_PACKET_DESCRIPTOR_RECORD_IDS.start(),
            WAVEFORM_PACKET_DESCRIPTOR_RECORD_IDS.end()
        )));
    }
    Ok(())
}

/// Looks up a VLR by `(user_id, record_id)`, the canonical lookup helper.
pub fn extract_vlr<'a>(vlrs: &'a [Vlr], user_id: &str, record_id: u16) -> Option<&'a Vlr> {
    vlrs.iter()
        .find(|vlr| vlr.user_id == user_id && vlr.record_id == record_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarType;
    use payloads::{ClassificationLookup, ExtraBytes, ExtraBytesRecord, TextAreaDescription};

    #[test]
    fn rejects_mismatched_record_id() {
        let payload = Payload::ClassificationLookup(ClassificationLookup(Vec::new()));
        assert!(Vlr::new("LASF_Spec", 99, "", payload).is_err());
    }

    #[test]
    fn accepts_matching_record_id() {
        let payload = Payload::ExtraBytes(ExtraBytes(vec![ExtraBytesRecord::new(
            "thing",
            ScalarType::F64,
        )]));
        assert!(Vlr::new("LASF_Spec", 4, "", payload).is_ok());
    }

    #[test]
    fn supersede_requires_lasf_spec() {
        let payload = Payload::Unknown(vec![1, 2, 3]);
        let mut vlr = Vlr::new("SOME_VENDOR", 1, "", payload).unwrap();
        assert!(vlr.set_superseded().is_err());
    }

    #[test]
    fn supersede_rewrites_record_id() {
        let payload = Payload::TextAreaDescription(TextAreaDescription("hi".to_string()));
        let mut vlr = Vlr::new("LASF_Spec", 3, "", payload).unwrap();
        vlr.set_superseded().unwrap();
        assert!(vlr.is_superseded());
    }

    #[test]
    fn round_trip_through_raw() {
        let payload = Payload::TextAreaDescription(TextAreaDescription("coverage".to_string()));
        let vlr = Vlr::new("LASF_Spec", 3, "desc", payload).unwrap();
        let raw = vlr.to_raw().unwrap();
        let back = Vlr::from_raw(raw, false).unwrap();
        assert_eq!(vlr, back);
    }

    #[test]
    fn extract_finds_matching_vlr() {
        let payload = Payload::TextAreaDescription(TextAreaDescription("x".to_string()));
        let vlr = Vlr::new("LASF_Spec", 3, "", payload).unwrap();
        let vlrs = vec![vlr];
        assert!(extract_vlr(&vlrs, "LASF_Spec", 3).is_some());
        assert!(extract_vlr(&vlrs, "LASF_Spec", 4).is_none());
    }
}

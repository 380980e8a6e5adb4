//! A process-wide dispatch table from `(user-id, record-id)` to a registered payload's
//! decode/encode function pair.
//!
//! The registry is populated once, at process initialization, with the built-in payload types in
//! [`crate::vlr::payloads`] (see [`ensure_builtins_registered`]); it is read-only thereafter. A
//! payload type is identified here by its [`TypeId`], which lets the registry enforce that it is
//! never bound to more than one user id, without needing the payload type itself to be generic
//! over a decode/encode trait. [`Payload::decode`](super::Payload::decode) consults this table for
//! every `(user_id, record_id)` pair it sees; anything unregistered becomes
//! [`Payload::Unknown`](super::Payload::Unknown).

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Mutex, Once, OnceLock};

use super::Payload;
use crate::{Error, Result};

/// Decodes a payload's wire bytes into its typed form.
pub type Decode = fn(&[u8]) -> Result<Payload>;
/// Encodes a payload's typed form back to its wire bytes.
///
/// Called only with the [`Payload`] variant it was registered for; any other variant indicates a
/// `(user_id, record_id)` that was reassigned after construction (see [`super::Vlr::set_superseded`]),
/// which callers fall back to [`Payload`]'s own per-variant encode for.
pub type Encode = fn(&Payload) -> Result<Vec<u8>>;

struct Binding {
    type_id: TypeId,
    decode: Decode,
    encode: Encode,
}

fn bindings() -> &'static Mutex<HashMap<(String, u16), Binding>> {
    static BINDINGS: OnceLock<Mutex<HashMap<(String, u16), Binding>>> = OnceLock::new();
    BINDINGS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn owners() -> &'static Mutex<HashMap<TypeId, String>> {
    static OWNERS: OnceLock<Mutex<HashMap<TypeId, String>>> = OnceLock::new();
    OWNERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Binds `type_id`'s `decode`/`encode` pair as the payload codec for `user_id` under every id in
/// `record_ids`.
///
/// Fails with [`Error::DuplicateRegistration`] if `type_id` is already bound to a different user
/// id, or if any `(user_id, record_id)` pair is already claimed by a different type.
pub fn register(
    type_id: TypeId,
    user_id: &str,
    record_ids: &[u16],
    decode: Decode,
    encode: Encode,
) -> Result<()> {
    let mut owners = owners().lock().expect("vlr registry poisoned");
    if let Some(existing) = owners.get(&type_id) {
        if existing != user_id {
            return Err(Error::DuplicateRegistration {
                user_id: user_id.to_string(),
                record_id: record_ids.first().copied().unwrap_or_default(),
            });
        }
    }

    let mut bindings = bindings().lock().expect("vlr registry poisoned");
    for &record_id in record_ids {
        let key = (user_id.to_string(), record_id);
        if let Some(existing) = bindings.get(&key) {
            if existing.type_id != type_id {
                return Err(Error::DuplicateRegistration {
                    user_id: user_id.to_string(),
                    record_id,
                });
            }
        }
    }
    for &record_id in record_ids {
        bindings.insert(
            (user_id.to_string(), record_id),
            Binding {
                type_id,
                decode,
                encode,
            },
        );
    }
    owners.insert(type_id, user_id.to_string());
    Ok(())
}

/// Decodes `bytes` using the codec bound to `(user_id, record_id)`, if any is registered.
pub fn decode(user_id: &str, record_id: u16, bytes: &[u8]) -> Option<Result<Payload>> {
    let bindings = bindings().lock().expect("vlr registry poisoned");
    bindings
        .get(&(user_id.to_string(), record_id))
        .map(|binding| (binding.decode)(bytes))
}

/// Encodes `payload` using the codec bound to `(user_id, record_id)`, if any is registered.
pub fn encode(user_id: &str, record_id: u16, payload: &Payload) -> Option<Result<Vec<u8>>> {
    let bindings = bindings().lock().expect("vlr registry poisoned");
    bindings
        .get(&(user_id.to_string(), record_id))
        .map(|binding| (binding.encode)(payload))
}

static BUILTINS: Once = Once::new();

/// Registers the built-in payload types from [`crate::vlr::payloads`], if they haven't been
/// already. Safe to call repeatedly; only the first call has an effect.
pub fn ensure_builtins_registered() {
    BUILTINS.call_once(|| {
        crate::vlr::payloads::register_builtins().expect("built-in vlr registration is infallible");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MarkerA;
    struct MarkerB;
    struct MarkerC;

    fn noop_decode(bytes: &[u8]) -> Result<Payload> {
        Ok(Payload::Unknown(bytes.to_vec()))
    }

    fn noop_encode(payload: &Payload) -> Result<Vec<u8>> {
        match payload {
            Payload::Unknown(bytes) => Ok(bytes.clone()),
            _ => Ok(Vec::new()),
        }
    }

    #[test]
    fn same_type_can_register_repeatedly() {
        let a = TypeId::of::<MarkerA>();
        register(a, "TEST_NS_A", &[9001], noop_decode, noop_encode).unwrap();
        register(a, "TEST_NS_A", &[9002], noop_decode, noop_encode).unwrap();
    }

    #[test]
    fn colliding_record_id_is_rejected() {
        let a = TypeId::of::<MarkerB>();
        register(a, "TEST_NS_B", &[9101], noop_decode, noop_encode).unwrap();
        struct Other;
        let b = TypeId::of::<Other>();
        assert!(register(b, "TEST_NS_B", &[9101], noop_decode, noop_encode).is_err());
    }

    #[test]
    fn decode_dispatches_to_the_bound_codec() {
        let a = TypeId::of::<MarkerC>();
        register(a, "TEST_NS_C", &[9201], noop_decode, noop_encode).unwrap();
        let decoded = decode("TEST_NS_C", 9201, &[1, 2, 3]).unwrap().unwrap();
        assert_eq!(Payload::Unknown(vec![1, 2, 3]), decoded);
        assert!(decode("TEST_NS_C", 9999, &[]).is_none());
    }
}

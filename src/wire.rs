//! Versioned wire encoding for keys, shares and proofs.
//!
//! The calling environment moves these objects between parties; the
//! encoding is bincode wrapped in a version tag so that incompatible
//! payloads are rejected instead of misparsed.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, warn};
use unknown_order::BigNumber;

const WIRE_VERSION: u16 = 0;

#[derive(Serialize, Deserialize)]
struct BytesVersioned {
    version: u16,
    payload: Vec<u8>,
}

/// Encode `value` for transport. `None` on serialization failure, which
/// is unreachable for the types this crate exports.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Option<Vec<u8>> {
    let payload = serialize(value)?;
    serialize(&BytesVersioned {
        version: WIRE_VERSION,
        payload,
    })
}

/// Decode a value produced by [`encode`].
/// Deserialization failures are non-fatal: the caller gets `None`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    let versioned: BytesVersioned = bincode::deserialize(bytes)
        .map_err(|err| {
            warn!("outer deserialization failure: {}", err);
        })
        .ok()?;
    if versioned.version != WIRE_VERSION {
        warn!(
            "encoding version {}, expected {}",
            versioned.version, WIRE_VERSION
        );
        return None;
    }
    bincode::deserialize(&versioned.payload)
        .map_err(|err| {
            warn!("inner deserialization failure: {}", err);
        })
        .ok()
}

fn serialize<T: Serialize + ?Sized>(value: &T) -> Option<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|err| {
            error!("serialization failure: {}", err);
        })
        .ok()
}

/// Canonical integer encoding fed to proof transcripts: the big-endian
/// magnitude prefixed with a 32-bit big-endian byte count.
pub(crate) fn uint_bytes(x: &BigNumber) -> Vec<u8> {
    let magnitude = x.to_bytes();
    let mut out = Vec::with_capacity(4 + magnitude.len());
    out.extend_from_slice(&(magnitude.len() as u32).to_be_bytes());
    out.extend_from_slice(&magnitude);
    out
}

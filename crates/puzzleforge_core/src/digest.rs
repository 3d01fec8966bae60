//! # Stable Digests
//!
//! SHA-256 digests over canonical JSON.
//!
//! Maps in the data model are `BTreeMap`s and `serde_json` writes struct
//! fields in declaration order, so the same value always serializes to the
//! same bytes. Digests are therefore order-independent with respect to how
//! a parameter map was built, and stable across process restarts.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::Parameters;

/// Length of a parameter signature in hex chars.
pub const SIGNATURE_LEN: usize = 16;

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    hex::encode(hasher.finalize())
}

/// Canonical JSON text of a value.
///
/// Serialization of the engine's own types cannot fail; a value that does
/// fail (e.g. a map with non-string keys) yields an empty string.
#[must_use]
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Stable signature of a parameter map.
#[must_use]
pub fn parameter_signature(parameters: &Parameters) -> String {
    let mut digest = sha256_hex(canonical_json(parameters));
    digest.truncate(SIGNATURE_LEN);
    digest
}

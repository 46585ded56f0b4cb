// ABOUTME: Canonical state-hash computation for deployable instances.
// ABOUTME: Used as the StateHash container label, the sole record of what is deployed.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes a stable hex digest over a value's canonical JSON encoding.
///
/// `serde_json` preserves struct field order as declared, so the caller's
/// struct must list fields in a fixed order rather than rely on a `HashMap`
/// anywhere in the hashed value - that's what makes the digest deterministic
/// across runs and across map insertion order.
pub fn state_hash<T: Serialize>(value: &T) -> String {
    let encoded = serde_json::to_vec(value).expect("comparable fields must serialize");
    let digest = Sha256::digest(&encoded);
    hex::encode(digest)
}

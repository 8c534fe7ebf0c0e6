use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of the input and returns it as a
/// hexadecimal string (64 characters).
pub fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    format!("{:x}", hasher.finalize())
}

/// Computes a content digest for any serializable value.
///
/// The value is serialized to JSON and hashed with SHA-256. Two values
/// with identical serialized content always produce the same digest.
pub fn hash_json<T: Serialize>(value: &T) -> String {
    // Serialization of an in-memory value cannot fail for the types
    // this crate hashes (string keys, no non-finite floats).
    let bytes = serde_json::to_vec(value).expect("value must serialize to JSON");
    sha256_hex(&bytes)
}

/// Generates a random 32-byte secret as a hexadecimal string.
///
/// Used by the user registry to mint private hashes and recovery keys.
pub fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

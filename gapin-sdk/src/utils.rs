//! Identifier and digest helpers.

use uuid::Uuid;

/// Length in bytes of a [`hash_data`] digest.
pub const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Generate a random (v4) UUID in its hyphenated text form.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// BLAKE3 digest of the UTF-8 bytes of `data`, as raw bytes.
pub fn hash_data(data: &str) -> [u8; DIGEST_LEN] {
    *blake3::hash(data.as_bytes()).as_bytes()
}

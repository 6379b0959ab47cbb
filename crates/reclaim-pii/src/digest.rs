use sha2::{Digest, Sha256};

/// Separator between digest inputs so `("ab", "c")` and `("a", "bc")` differ.
const UNIT_SEPARATOR: u8 = 0x1f;

/// SHA-256 over the key and each part, unit-separated.
pub(crate) fn keyed_digest(key: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    for part in parts {
        hasher.update([UNIT_SEPARATOR]);
        hasher.update(*part);
    }
    hasher.finalize().into()
}

pub(crate) fn keyed_hex(key: &str, parts: &[&[u8]]) -> String {
    hex::encode(keyed_digest(key, parts))
}

//! Schema source fingerprints.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the schema source text.
pub fn fingerprint(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = fingerprint("name,type\nrecord_id,int\n");
        let b = fingerprint("name,type\nrecord_id,int\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, fingerprint("name,type\nrecord_id,str\n"));
    }
}

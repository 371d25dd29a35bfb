//! crates/toffee_core/src/hash.rs
//!
//! Content addressing for marketplace dedup. Every producer of a
//! `text_hash` goes through this function; share and import checks are
//! only meaningful if both sides derive the digest identically.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the document text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable() {
        assert_eq!(content_hash("toffee"), content_hash("toffee"));
    }

    #[test]
    fn hash_distinguishes_content() {
        assert_ne!(content_hash("toffee"), content_hash("caramel"));
    }

    #[test]
    fn hash_is_lowercase_hex() {
        let digest = content_hash("");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

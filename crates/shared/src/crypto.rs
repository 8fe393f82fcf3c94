//! Cryptographic utilities for token hashing and bracelet UID generation.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Characters used in generated bracelet UIDs. Uppercase only so UIDs
/// survive case-mangling NFC writer tools.
const UID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random portion of a generated bracelet UID.
const UID_RANDOM_LEN: usize = 8;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a bracelet UID of the form `{prefix}-XXXXXXXX` where the
/// suffix is 8 random characters from [`UID_CHARSET`].
///
/// An empty prefix yields just the random part.
pub fn generate_bracelet_uid(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..UID_RANDOM_LEN)
        .map(|_| UID_CHARSET[rng.gen_range(0..UID_CHARSET.len())] as char)
        .collect();
    if prefix.is_empty() {
        suffix
    } else {
        format!("{}-{}", prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        let hash = sha256_hex("");
        assert_eq!(hash.len(), 64);
        // SHA256 of empty string
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        let hash1 = sha256_hex("same_input");
        let hash2 = sha256_hex("same_input");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_sha256_hex_different_inputs() {
        let hash1 = sha256_hex("input1");
        let hash2 = sha256_hex("input2");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_sha256_hex_unicode() {
        let hash = sha256_hex("你好世界");
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_generate_bracelet_uid_with_prefix() {
        let uid = generate_bracelet_uid("prod");
        assert_eq!(uid.len(), 4 + 1 + 8);
        assert!(uid.starts_with("prod-"));
    }

    #[test]
    fn test_generate_bracelet_uid_without_prefix() {
        let uid = generate_bracelet_uid("");
        assert_eq!(uid.len(), 8);
    }

    #[test]
    fn test_generate_bracelet_uid_charset() {
        let uid = generate_bracelet_uid("test");
        let suffix = uid.strip_prefix("test-").unwrap();
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_bracelet_uid_not_constant() {
        // 36^8 possible suffixes, a collision here would point at a broken RNG
        let a = generate_bracelet_uid("prod");
        let b = generate_bracelet_uid("prod");
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_uid_passes_validation() {
        let uid = generate_bracelet_uid("test");
        assert!(crate::validation::validate_bracelet_uid(&uid).is_ok());
    }
}

//! Content fingerprinting: truncated hex digests over file bytes.

use sha2::{Digest, Sha256, Sha512};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::Algorithm;

/// Digest `content` and truncate to `length` lowercase hex characters.
///
/// Same bytes always yield the same fingerprint, regardless of filename or
/// timestamps.
pub fn fingerprint(content: &[u8], algorithm: Algorithm, length: usize) -> String {
    let mut hex = match algorithm {
        Algorithm::Md5 => format!("{:x}", md5::compute(content)),
        Algorithm::Sha256 => format!("{:x}", Sha256::digest(content)),
        Algorithm::Sha512 => format!("{:x}", Sha512::digest(content)),
        Algorithm::Xxh3 => format!("{:016x}", xxh3_64(content)),
    };
    hex.truncate(length);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(b"hello world", Algorithm::Sha256, 8);
        let b = fingerprint(b"hello world", Algorithm::Sha256, 8);
        assert_eq!(a, b);
        assert_ne!(a, fingerprint(b"other content", Algorithm::Sha256, 8));
    }

    #[test]
    fn test_fingerprint_truncates_to_length() {
        assert_eq!(fingerprint(b"x", Algorithm::Sha256, 8).len(), 8);
        assert_eq!(fingerprint(b"x", Algorithm::Sha256, 12).len(), 12);
        // xxh3 yields 16 hex chars; longer requests keep all of them
        assert_eq!(fingerprint(b"x", Algorithm::Xxh3, 32).len(), 16);
    }

    #[test]
    fn test_fingerprint_known_values() {
        // sha256("hello world") = b94d27b9934d3e08...
        assert_eq!(fingerprint(b"hello world", Algorithm::Sha256, 8), "b94d27b9");
        // md5("hello") = 5d41402abc4b2a76b9719d911017c592
        assert_eq!(fingerprint(b"hello", Algorithm::Md5, 8), "5d41402a");
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        for algorithm in [
            Algorithm::Md5,
            Algorithm::Sha256,
            Algorithm::Sha512,
            Algorithm::Xxh3,
        ] {
            let fp = fingerprint(b"sample", algorithm, 8);
            assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}

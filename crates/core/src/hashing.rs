//! SHA-256 digests for privacy-preserving identifiers.
//!
//! Video IDs are hashed once so clients can look segments up by hash
//! prefix without revealing the full video ID. User identities are
//! stretched over many rounds so the private ID a client holds cannot be
//! recovered from the stored public ID.

use sha2::{Digest, Sha256};

/// Rounds applied when deriving a public user ID from a private one.
pub const USER_ID_HASH_ROUNDS: u32 = 5000;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Hash a video ID for prefix lookup.
pub fn hash_video_id(video_id: &str) -> String {
    sha256_hex(video_id.as_bytes())
}

/// Derive the stored public user ID from a client's private user ID.
pub fn hash_user_id(private_user_id: &str) -> String {
    let mut digest = sha256_hex(private_user_id.as_bytes());
    for _ in 1..USER_ID_HASH_ROUNDS {
        digest = sha256_hex(digest.as_bytes());
    }
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn video_hash_is_hex_and_stable() {
        let h = hash_video_id("dQw4w9WgXcQ");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, hash_video_id("dQw4w9WgXcQ"));
    }

    #[test]
    fn user_hash_differs_from_single_round() {
        let private = "some-private-id";
        assert_ne!(hash_user_id(private), sha256_hex(private.as_bytes()));
        assert_eq!(hash_user_id(private).len(), 64);
    }

    #[test]
    fn user_hash_is_deterministic() {
        assert_eq!(hash_user_id("abc"), hash_user_id("abc"));
        assert_ne!(hash_user_id("abc"), hash_user_id("abd"));
    }
}

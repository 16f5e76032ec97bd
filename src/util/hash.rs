//! Hashing utilities for artifact digests.

use sha2::{Digest, Sha256};

/// Compute the SHA256 hash of a byte slice as lowercase hex.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Shortened digest for status lines.
pub fn short_digest(digest: &str) -> &str {
    &digest[..digest.len().min(12)]
}

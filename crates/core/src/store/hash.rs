//! Content-addressed identifier generation.

use sha2::{Digest, Sha256};

/// Compute the stable identifier for a source URL.
///
/// Hashes the raw URL text exactly as submitted, so any string (even one that
/// is not a valid URL) yields a 64-character lower-case hex identifier.
pub fn compute_identifier(source_url: &str) -> String {
    hex::encode(Sha256::digest(source_url.as_bytes()))
}

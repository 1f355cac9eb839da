//! Content hashing for cache-busting version tokens

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// A SHA-256 digest of an asset's bytes.
///
/// Served asset URLs carry the hex form as a `?version=` token, so clients
/// pick up a new image exactly when its content changes.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute a hash from bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Compute a hash from a file's contents
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(&data))
    }

    /// Get the hash as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Append this hash as a version query to an asset URL.
    pub fn versioned_url(&self, url: &str) -> String {
        format!("{}?version={}", url, self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_bytes_same_hash() {
        assert_eq!(
            ContentHash::from_bytes(b"frame"),
            ContentHash::from_bytes(b"frame")
        );
        assert_ne!(
            ContentHash::from_bytes(b"frame"),
            ContentHash::from_bytes(b"frame2")
        );
    }

    #[test]
    fn test_known_digest() {
        let h = ContentHash::from_bytes(b"abc");
        assert_eq!(
            h.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_versioned_url() {
        let h = ContentHash::from_bytes(b"abc");
        let url = h.versioned_url("/local/floorplan/base.png");
        assert!(url.starts_with("/local/floorplan/base.png?version=ba7816bf"));
        assert_eq!(url.len(), "/local/floorplan/base.png?version=".len() + 64);
    }

    #[test]
    fn test_from_file_matches_bytes() {
        let dir = std::env::temp_dir().join(format!("lumaplan_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("asset.bin");
        std::fs::write(&path, b"pixels").unwrap();

        let h = ContentHash::from_file(&path).unwrap();
        assert_eq!(h, ContentHash::from_bytes(b"pixels"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}

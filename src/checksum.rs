//! Checksums of written documents

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of a rendered document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, content: &[u8]) -> bool {
        Self::from_bytes(content) == *self
    }

    /// Line for a `sha256sum`-compatible checksums file
    pub fn manifest_line(&self, file_name: &str) -> String {
        format!("{}  {}", self.0, file_name)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = br#"{"openapi": "3.0.0"}"#;
        assert_eq!(Checksum::from_bytes(content), Checksum::from_bytes(content));
        assert_eq!(Checksum::from_bytes(content).as_str().len(), 64);
    }

    #[test]
    fn test_checksum_verification() {
        let checksum = Checksum::from_bytes(b"document");
        assert!(checksum.verify(b"document"));
        assert!(!checksum.verify(b"different content"));
    }

    #[test]
    fn test_manifest_line() {
        let checksum = Checksum::from_bytes(b"");
        assert_eq!(
            checksum.manifest_line("99-kern.openregister.json"),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  99-kern.openregister.json"
        );
    }
}

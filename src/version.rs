//! Model version handling

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the source data model the documents are generated from.
///
/// Written verbatim into every schema, register and envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Semantic version (e.g., "2.5.0")
    pub version: Version,
}

impl ModelVersion {
    /// Create a new model version
    pub fn new(version: Version) -> Self {
        Self { version }
    }

    /// Create from a version string
    pub fn parse(version_str: &str) -> Result<Self, semver::Error> {
        // Strip leading 'v' if present
        let version_str = version_str.trim();
        let version_str = version_str.strip_prefix('v').unwrap_or(version_str);
        let version = Version::parse(version_str)?;
        Ok(Self::new(version))
    }

    /// Get the version string (e.g., "2.5.0")
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Get the tag string (e.g., "v2.5.0")
    pub fn tag_string(&self) -> String {
        format!("v{}", self.version)
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

//! Error types for the generator

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Generator errors
///
/// Only conditions that make the whole run meaningless end up here. Unresolved
/// cross references and slug collisions are handled inside the engine.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Snapshot could not be read from {path}: {reason}")]
    Snapshot { path: String, reason: String },

    #[error("Invalid model version: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Invalid domain table: {0}")]
    InvalidDomains(String),

    #[error("Duplicate domain {field}: {value}")]
    DuplicateDomain { field: &'static str, value: String },

    #[error(
        "Domain {inner} (package {inner_root}) lies inside domain {outer} (package {outer_root})"
    )]
    OverlappingDomains {
        inner: String,
        inner_root: i64,
        outer: String,
        outer_root: i64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

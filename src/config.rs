//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (ggm-openregister.toml)
//! - Environment variables (GGM__*)
//!
//! ## Example config file (ggm-openregister.toml):
//! ```toml
//! [model]
//! version = "2.5.0"
//! entity_stereotype = "Objecttype"
//!
//! [provenance]
//! repo = "ConductionNL/ggm-openregister"
//! branch = "main"
//!
//! [output]
//! dir = "./generated"
//! format = "pretty"
//!
//! [[domains]]
//! root_id = 367
//! name = "99 Kern"
//! slug = "ggm-kern"
//! file = "99-kern.openregister.json"
//! ```
//!
//! When `[[domains]]` is omitted the twelve GGM top-level domains are used.

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{GeneratorError, Result};
use crate::model::PackageId;
use crate::version::ModelVersion;

/// Main configuration for the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Source model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Provenance written into every document envelope
    #[serde(default)]
    pub provenance: ProvenanceConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Ordered partition table; one output document per entry
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainPartition>,
}

/// Source model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model version stamped on every generated schema
    #[serde(default = "default_model_version")]
    pub version: String,

    /// Stereotype marking a class as a modeled entity
    #[serde(default = "default_entity_stereotype")]
    pub entity_stereotype: String,

    /// Prefix of the generated description for entities without a note
    #[serde(default = "default_description_prefix")]
    pub description_prefix: String,
}

/// Provenance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    /// GitHub repository (owner/name) the documents are published from
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Branch the documents are published from
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Supported OpenRegister version constraint
    #[serde(default = "default_openregister")]
    pub openregister: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the documents are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Write a checksums.sha256 file next to the documents
    #[serde(default)]
    pub include_checksums: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// One top-level partition of the source model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainPartition {
    /// Package id of the partition root
    pub root_id: PackageId,
    /// Display name
    pub name: String,
    /// Register slug
    pub slug: String,
    /// Output file name
    pub file: String,
}

impl DomainPartition {
    pub fn new(
        root_id: PackageId,
        name: impl Into<String>,
        slug: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            root_id,
            name: name.into(),
            slug: slug.into(),
            file: file.into(),
        }
    }
}

// Default value functions
fn default_model_version() -> String {
    "2.5.0".to_string()
}

fn default_entity_stereotype() -> String {
    "Objecttype".to_string()
}

fn default_description_prefix() -> String {
    "GGM entity".to_string()
}

fn default_repo() -> String {
    "ConductionNL/ggm-openregister".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_openregister() -> String {
    "^v0.2.10".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// The twelve top-level domains of the Gemeentelijk Gegevensmodel
pub fn default_domains() -> Vec<DomainPartition> {
    vec![
        DomainPartition::new(
            4,
            "0 Bestuur, Politiek en Ondersteuning",
            "ggm-bestuur-politiek",
            "0-bestuur-politiek.openregister.json",
        ),
        DomainPartition::new(
            12,
            "1 Veiligheid en Vergunningen",
            "ggm-veiligheid-vergunningen",
            "1-veiligheid-vergunningen.openregister.json",
        ),
        DomainPartition::new(
            15,
            "2 Verkeer, Vervoer en Waterstaat",
            "ggm-verkeer-vervoer-waterstaat",
            "2-verkeer-vervoer-waterstaat.openregister.json",
        ),
        DomainPartition::new(22, "3 Economie", "ggm-economie", "3-economie.openregister.json"),
        DomainPartition::new(25, "4 Onderwijs", "ggm-onderwijs", "4-onderwijs.openregister.json"),
        DomainPartition::new(
            32,
            "5 Sport, Cultuur en Recreatie",
            "ggm-sport-cultuur-recreatie",
            "5-sport-cultuur-recreatie.openregister.json",
        ),
        DomainPartition::new(
            52,
            "6 Sociaal Domein",
            "ggm-sociaal-domein",
            "6-sociaal-domein.openregister.json",
        ),
        DomainPartition::new(
            91,
            "7 Volksgezondheid en Milieu",
            "ggm-volksgezondheid-milieu",
            "7-volksgezondheid-milieu.openregister.json",
        ),
        DomainPartition::new(
            95,
            "8 Volkshuisvesting, Leefomgeving en Stedelijke Vernieuwing",
            "ggm-volkshuisvesting-leefomgeving",
            "8-volkshuisvesting-leefomgeving.openregister.json",
        ),
        DomainPartition::new(
            114,
            "9 Interne Organisatie",
            "ggm-interne-organisatie",
            "9-interne-organisatie.openregister.json",
        ),
        DomainPartition::new(
            135,
            "10 Dienstverlening",
            "ggm-dienstverlening",
            "10-dienstverlening.openregister.json",
        ),
        DomainPartition::new(367, "99 Kern", "ggm-kern", "99-kern.openregister.json"),
    ]
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            version: default_model_version(),
            entity_stereotype: default_entity_stereotype(),
            description_prefix: default_description_prefix(),
        }
    }
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            branch: default_branch(),
            openregister: default_openregister(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::Pretty,
            include_checksums: false,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            provenance: ProvenanceConfig::default(),
            output: OutputConfig::default(),
            domains: default_domains(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from the default locations, then an optional explicit file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "ggm-openregister.toml",
            ".ggm-openregister.toml",
            "config/ggm-openregister.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) =
            directories::ProjectDirs::from("nl", "conduction", "ggm-openregister")
        {
            let xdg_config = config_dir.config_dir().join("ggm-openregister.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (GGM__*)
        builder = builder.add_source(
            Environment::with_prefix("GGM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed model version
    pub fn model_version(&self) -> Result<ModelVersion> {
        Ok(ModelVersion::parse(&self.model.version)?)
    }

    /// Check the partition table and version before any work is done
    pub fn validate(&self) -> Result<()> {
        self.model_version()?;

        if self.domains.is_empty() {
            return Err(GeneratorError::InvalidDomains(
                "at least one domain must be configured".to_string(),
            ));
        }

        let mut roots = HashSet::new();
        let mut slugs = HashSet::new();
        let mut files = HashSet::new();
        for domain in &self.domains {
            if domain.slug.trim().is_empty() || domain.file.trim().is_empty() {
                return Err(GeneratorError::InvalidDomains(format!(
                    "domain {} needs both a slug and a file name",
                    domain.root_id
                )));
            }
            if !roots.insert(domain.root_id) {
                return Err(GeneratorError::DuplicateDomain {
                    field: "root_id",
                    value: domain.root_id.to_string(),
                });
            }
            if !slugs.insert(domain.slug.as_str()) {
                return Err(GeneratorError::DuplicateDomain {
                    field: "slug",
                    value: domain.slug.clone(),
                });
            }
            if !files.insert(domain.file.as_str()) {
                return Err(GeneratorError::DuplicateDomain {
                    field: "file",
                    value: domain.file.clone(),
                });
            }
        }

        Ok(())
    }

    /// Get the output directory (resolves relative paths)
    pub fn output_dir(&self) -> PathBuf {
        if self.output.dir.is_absolute() {
            self.output.dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.output.dir)
        }
    }
}

/// Validated settings handed to the generation engine
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub version: ModelVersion,
    pub entity_stereotype: String,
    pub description_prefix: String,
    pub provenance: ProvenanceConfig,
}

impl GenerationSettings {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            version: config.model_version()?,
            entity_stereotype: config.model.entity_stereotype.clone(),
            description_prefix: config.model.description_prefix.clone(),
            provenance: config.provenance.clone(),
        })
    }
}

//! Domain assembly
//!
//! One OpenRegister document per partition: every schema of the partition
//! under `components.schemas`, a single register listing them under
//! `components.registers`, wrapped in an OpenAPI-style envelope.
//!
//! ```text
//! {
//!   "openapi": "3.0.0",
//!   "info": { "title", "description", "version" },
//!   "x-openregister": { provenance },
//!   "components": {
//!     "schemas":   { "<slug>": schema, ... },
//!     "registers": { "<domain slug>": register }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::builder::{BuildStats, SchemaBuilder};
use crate::config::{DomainPartition, GenerationSettings};
use crate::index::{DomainScope, GlobalIndex};
use crate::model::ModelSnapshot;
use crate::schema::SchemaDocument;

/// OpenAPI version of the envelope
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Register source marker
pub const REGISTER_SOURCE: &str = "internal";

/// Envelope info block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}

/// Where the document is published from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubSource {
    pub repo: String,
    pub branch: String,
    pub path: String,
}

/// `x-openregister` provenance block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(rename = "type")]
    pub kind: String,
    pub source_type: String,
    pub source_url: String,
    pub openregister: String,
    pub github: GithubSource,
    pub description: String,
}

/// Register owning the schemas of one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterObject {
    pub slug: String,
    pub title: String,
    pub version: String,
    pub description: String,
    /// Final schema slugs, in generation order
    pub schemas: Vec<String>,
    pub source: String,
}

/// Schemas and registers of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaDocument>,
    pub registers: IndexMap<String, RegisterObject>,
}

/// The document generated for one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDocument {
    pub openapi: String,
    pub info: DocumentInfo,
    #[serde(rename = "x-openregister")]
    pub provenance: Provenance,
    pub components: Components,
}

impl DomainDocument {
    /// Number of schemas in the document
    pub fn schema_count(&self) -> usize {
        self.components.schemas.len()
    }

    /// Get a schema by its final slug
    pub fn schema(&self, slug: &str) -> Option<&SchemaDocument> {
        self.components.schemas.get(slug)
    }

    /// The register of this document
    pub fn register(&self) -> Option<&RegisterObject> {
        self.components.registers.values().next()
    }
}

/// Per-domain generation statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DomainStats {
    pub entities: usize,
    pub schemas: usize,
    pub renamed_slugs: usize,
    pub build: BuildStats,
}

/// A generated document together with its target file
#[derive(Debug, Clone)]
pub struct GeneratedDomain {
    pub partition: DomainPartition,
    pub document: DomainDocument,
    pub stats: DomainStats,
}

/// Assembles the document of each partition
pub struct DomainAssembler<'a> {
    snapshot: &'a ModelSnapshot,
    index: &'a GlobalIndex,
    settings: &'a GenerationSettings,
}

impl<'a> DomainAssembler<'a> {
    pub fn new(
        snapshot: &'a ModelSnapshot,
        index: &'a GlobalIndex,
        settings: &'a GenerationSettings,
    ) -> Self {
        Self {
            snapshot,
            index,
            settings,
        }
    }

    /// Build every schema of a partition and wrap them in a document
    pub fn assemble(&self, scope: &DomainScope<'_>) -> GeneratedDomain {
        let partition = scope.partition;

        let local_enums = self
            .snapshot
            .enumerations_in(&scope.packages)
            .filter_map(|e| self.snapshot.enum_literals(e.id).map(|literals| (e.id, literals)))
            .collect();
        let mut builder = SchemaBuilder::new(self.snapshot, self.index, self.settings, local_enums);

        let mut stats = DomainStats::default();
        let mut schemas: IndexMap<String, SchemaDocument> = IndexMap::new();

        for entity in self
            .snapshot
            .entities_in(&scope.packages, &self.settings.entity_stereotype)
        {
            stats.entities += 1;
            let Some(schema) = builder.build(entity) else {
                continue;
            };
            if insert_unique(&mut schemas, schema) {
                stats.renamed_slugs += 1;
            }
        }

        stats.schemas = schemas.len();
        stats.build = builder.stats();

        info!(
            domain = %partition.slug,
            schemas = stats.schemas,
            renamed = stats.renamed_slugs,
            dropped_relationships = stats.build.unresolved_associations,
            "Assembled domain"
        );

        GeneratedDomain {
            partition: partition.clone(),
            document: self.envelope(partition, schemas),
            stats,
        }
    }

    fn envelope(
        &self,
        partition: &DomainPartition,
        schemas: IndexMap<String, SchemaDocument>,
    ) -> DomainDocument {
        let version = self.settings.version.version_string();
        let provenance = &self.settings.provenance;

        let register = RegisterObject {
            slug: partition.slug.clone(),
            title: format!("GGM - {}", partition.name),
            version: version.clone(),
            description: format!("Gemeentelijk Gegevensmodel domain: {}", partition.name),
            schemas: schemas.keys().cloned().collect(),
            source: REGISTER_SOURCE.to_string(),
        };

        let mut registers = IndexMap::new();
        registers.insert(partition.slug.clone(), register);

        DomainDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: DocumentInfo {
                title: format!("GGM - {}", partition.name),
                description: format!(
                    "OpenRegister configuration for the Gemeentelijk Gegevensmodel (GGM) \
                     domain: {}. Auto-generated from GGM {}.",
                    partition.name,
                    self.settings.version.tag_string()
                ),
                version,
            },
            provenance: Provenance {
                kind: "application".to_string(),
                source_type: "github".to_string(),
                source_url: format!("https://github.com/{}", provenance.repo),
                openregister: provenance.openregister.clone(),
                github: GithubSource {
                    repo: provenance.repo.clone(),
                    branch: provenance.branch.clone(),
                    path: partition.file.clone(),
                },
                description: format!("Gemeentelijk Gegevensmodel - {}", partition.name),
            },
            components: Components { schemas, registers },
        }
    }
}

/// Insert a schema under a slug unique within the domain.
///
/// A taken slug becomes `<slug>-2`, `<slug>-3`, ...; the schema's own slug is
/// rewritten to match its key. Returns whether the schema was renamed.
pub fn insert_unique(
    schemas: &mut IndexMap<String, SchemaDocument>,
    mut schema: SchemaDocument,
) -> bool {
    let base = schema.slug.clone();
    let mut slug = base.clone();
    let mut counter = 2;
    while schemas.contains_key(&slug) {
        slug = format!("{}-{}", base, counter);
        counter += 1;
    }

    let renamed = slug != base;
    if renamed {
        debug!(from = %base, to = %slug, "Renamed colliding schema slug");
        schema.slug = slug.clone();
    }
    schemas.insert(slug, schema);
    renamed
}

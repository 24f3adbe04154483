//! Generation pipeline
//!
//! ```text
//! config ─ validate ─┐
//!                    ├─ expand scopes ─ GlobalIndex (all domains)
//! snapshot ──────────┘                        │
//!                                             └─ DomainAssembler per domain
//! ```
//!
//! The index is complete and frozen before the first schema is built, since
//! relationships may point into domains that are assembled later.

use tracing::info;

use crate::config::{GenerationSettings, GeneratorConfig};
use crate::domain::{DomainAssembler, GeneratedDomain};
use crate::error::Result;
use crate::index::{expand_scopes, GlobalIndex};
use crate::model::ModelSnapshot;

/// Output of a full run, one entry per configured partition
#[derive(Debug, Clone)]
pub struct Generation {
    pub domains: Vec<GeneratedDomain>,
    /// Entities known to the cross-domain index
    pub indexed_entities: usize,
}

impl Generation {
    /// Total number of schemas across all documents
    pub fn schema_count(&self) -> usize {
        self.domains.iter().map(|d| d.stats.schemas).sum()
    }

    /// Find the generated document for a register slug
    pub fn domain(&self, slug: &str) -> Option<&GeneratedDomain> {
        self.domains.iter().find(|d| d.partition.slug == slug)
    }
}

/// Runs the model-to-schema transformation over a snapshot
pub struct Generator<'a> {
    snapshot: &'a ModelSnapshot,
    config: &'a GeneratorConfig,
}

impl<'a> Generator<'a> {
    pub fn new(snapshot: &'a ModelSnapshot, config: &'a GeneratorConfig) -> Self {
        Self { snapshot, config }
    }

    /// Build the cross-domain index only
    pub fn index(&self) -> Result<GlobalIndex> {
        self.config.validate()?;
        let settings = GenerationSettings::from_config(self.config)?;
        let scopes = expand_scopes(self.snapshot, &self.config.domains)?;
        Ok(GlobalIndex::build(self.snapshot, &scopes, &settings.entity_stereotype))
    }

    /// Generate the documents of every configured partition
    pub fn run(&self) -> Result<Generation> {
        self.config.validate()?;
        let settings = GenerationSettings::from_config(self.config)?;

        let scopes = expand_scopes(self.snapshot, &self.config.domains)?;
        let index = GlobalIndex::build(self.snapshot, &scopes, &settings.entity_stereotype);
        info!(entities = index.len(), domains = scopes.len(), "Built cross-domain index");

        let assembler = DomainAssembler::new(self.snapshot, &index, &settings);
        let domains = scopes.iter().map(|scope| assembler.assemble(scope)).collect();

        Ok(Generation {
            domains,
            indexed_entities: index.len(),
        })
    }
}

//! Writing generated documents
//!
//! Each document is rendered to JSON and written to its configured file name.
//! Optionally a `checksums.sha256` file is written alongside, and a
//! [`GenerationReport`] summarises what was produced, dropped and renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::checksum::Checksum;
use crate::config::{GeneratorConfig, OutputFormat};
use crate::domain::{DomainDocument, GeneratedDomain};
use crate::error::Result;
use crate::generator::Generation;

/// Name of the checksums file
pub const CHECKSUMS_FILE: &str = "checksums.sha256";

/// Render a document as JSON
pub fn render(document: &DomainDocument, format: OutputFormat) -> Result<String> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(document)?,
        OutputFormat::Compact => serde_json::to_string(document)?,
    };
    Ok(json)
}

/// Summary of one generated document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReport {
    pub slug: String,
    pub file: String,
    pub entities: usize,
    pub schemas: usize,
    pub renamed_slugs: usize,
    pub unresolved_associations: usize,
    pub unresolved_parents: usize,
    pub skipped_association_keys: usize,
    pub skipped_attributes: usize,
    pub skipped_entities: usize,
    pub bytes: usize,
    pub checksum: Checksum,
}

impl DomainReport {
    fn new(domain: &GeneratedDomain, rendered: &str) -> Self {
        let stats = &domain.stats;
        Self {
            slug: domain.partition.slug.clone(),
            file: domain.partition.file.clone(),
            entities: stats.entities,
            schemas: stats.schemas,
            renamed_slugs: stats.renamed_slugs,
            unresolved_associations: stats.build.unresolved_associations,
            unresolved_parents: stats.build.unresolved_parents,
            skipped_association_keys: stats.build.skipped_association_keys,
            skipped_attributes: stats.build.skipped_attributes,
            skipped_entities: stats.build.skipped_entities,
            bytes: rendered.len(),
            checksum: Checksum::from_bytes(rendered.as_bytes()),
        }
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub indexed_entities: usize,
    pub total_schemas: usize,
    pub domains: Vec<DomainReport>,
}

impl GenerationReport {
    /// Save the report as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Writes documents to the output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    format: OutputFormat,
    include_checksums: bool,
    dry_run: bool,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            include_checksums: false,
            dry_run: false,
        }
    }

    /// Writer configured from the `[output]` section
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.output_dir(), config.output.format)
            .with_checksums(config.output.include_checksums)
    }

    pub fn with_checksums(mut self, include_checksums: bool) -> Self {
        self.include_checksums = include_checksums;
        self
    }

    /// Render everything but write nothing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render and write every document of a run
    pub fn write(&self, generation: &Generation, model_version: &str) -> Result<GenerationReport> {
        if !self.dry_run {
            fs::create_dir_all(&self.dir)?;
        }

        let mut reports = Vec::with_capacity(generation.domains.len());
        for domain in &generation.domains {
            let rendered = render(&domain.document, self.format)?;
            let report = DomainReport::new(domain, &rendered);

            if self.dry_run {
                info!(file = %report.file, schemas = report.schemas, "Dry run, not writing");
            } else {
                let path = self.dir.join(&domain.partition.file);
                fs::write(&path, &rendered)?;
                info!(
                    path = %path.display(),
                    schemas = report.schemas,
                    bytes = report.bytes,
                    "Wrote document"
                );
            }
            reports.push(report);
        }

        if self.include_checksums && !self.dry_run {
            let manifest: String = reports
                .iter()
                .map(|r| r.checksum.manifest_line(&r.file) + "\n")
                .collect();
            fs::write(self.dir.join(CHECKSUMS_FILE), manifest)?;
        }

        Ok(GenerationReport {
            generated_at: Utc::now(),
            model_version: model_version.to_string(),
            output_dir: self.dir.clone(),
            dry_run: self.dry_run,
            indexed_entities: generation.indexed_entities,
            total_schemas: generation.schema_count(),
            domains: reports,
        })
    }
}

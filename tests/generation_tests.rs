//! End-to-end generation tests
//!
//! Runs the full pipeline over a small GGM-shaped snapshot using the default
//! twelve-domain table and checks the resulting documents.

use ggm_openregister::{
    DomainDocument, DomainPartition, Generator, GeneratorConfig, GeneratorError, ModelSnapshot,
    OutputFormat, OutputWriter,
};
use serde_json::{json, Value};

fn snapshot() -> ModelSnapshot {
    ModelSnapshot::from_json_str(include_str!("fixtures/persoon_adres.json")).unwrap()
}

fn generate() -> ggm_openregister::Generation {
    let snapshot = snapshot();
    let config = GeneratorConfig::default();
    Generator::new(&snapshot, &config).run().unwrap()
}

fn document<'a>(generation: &'a ggm_openregister::Generation, slug: &str) -> &'a DomainDocument {
    &generation.domain(slug).unwrap().document
}

fn property(doc: &DomainDocument, schema: &str, key: &str) -> Value {
    serde_json::to_value(doc.schema(schema).unwrap().property(key).unwrap()).unwrap()
}

// =============================================================================
// Documents
// =============================================================================

#[test]
fn test_one_document_per_domain() {
    let generation = generate();
    assert_eq!(generation.domains.len(), 12);
    assert_eq!(generation.indexed_entities, 6);
    assert_eq!(generation.schema_count(), 6);

    // Domains without packages in the snapshot still produce a document
    let economie = document(&generation, "ggm-economie");
    assert_eq!(economie.schema_count(), 0);
    assert!(economie.register().unwrap().schemas.is_empty());
}

#[test]
fn test_persoon_schema() {
    let generation = generate();
    let kern = document(&generation, "ggm-kern");
    let persoon = kern.schema("persoon").unwrap();

    assert_eq!(
        property(kern, "persoon", "leeftijd"),
        json!({"type": "integer", "title": "leeftijd"})
    );
    assert_eq!(persoon.required, vec!["leeftijd"]);
    assert_eq!(
        property(kern, "persoon", "adressen"),
        json!({"type": "array", "title": "adressen", "items": {"type": "object", "$ref": "adres"}})
    );
    assert_eq!(
        property(kern, "persoon", "geslacht"),
        json!({"type": "string", "title": "geslacht", "enum": ["Man", "Vrouw", "Onbekend"]})
    );
    assert_eq!(
        property(kern, "persoon", "datumOverlijden"),
        json!({"type": "string", "format": "date", "title": "datum overlijden"})
    );
    assert_eq!(persoon.description, "Een natuurlijk persoon. Extends: subject.");
}

#[test]
fn test_adres_schema() {
    let generation = generate();
    let kern = document(&generation, "ggm-kern");

    assert_eq!(
        property(kern, "adres", "postcode"),
        json!({"type": "string", "maxLength": 6, "title": "postcode"})
    );
    // Seen from the end side, the association name becomes the key
    assert_eq!(
        property(kern, "adres", "woontOp"),
        json!({"type": "array", "title": "woontOp", "items": {"type": "object", "$ref": "persoon"}})
    );
    let adres = kern.schema("adres").unwrap();
    assert_eq!(adres.required, vec!["huisnummer"]);
    assert_eq!(adres.description, "GGM entity: Adres");
}

#[test]
fn test_slug_collision_renamed() {
    let generation = generate();
    let kern = document(&generation, "ggm-kern");

    let keys: Vec<_> = kern.components.schemas.keys().cloned().collect();
    assert_eq!(keys, vec!["persoon", "adres", "adres-2", "subject"]);
    for (key, schema) in &kern.components.schemas {
        assert_eq!(key, &schema.slug);
    }
    assert_eq!(kern.schema("adres-2").unwrap().title, "ADRES!!");
    assert_eq!(generation.domain("ggm-kern").unwrap().stats.renamed_slugs, 1);
    assert_eq!(kern.register().unwrap().schemas, keys);
}

#[test]
fn test_cross_domain_references() {
    let generation = generate();
    let kern = document(&generation, "ggm-kern");
    let sociaal = document(&generation, "ggm-sociaal-domein");

    // Kern entity referencing a later domain
    assert_eq!(
        property(kern, "persoon", "client"),
        json!({"type": "array", "title": "client", "items": {"type": "object", "$ref": "client"}})
    );
    // Sociaal entity referencing the kern domain
    assert_eq!(
        property(sociaal, "client", "isPersoon"),
        json!({"type": "object", "title": "isPersoon", "$ref": "persoon"})
    );
    assert_eq!(
        property(sociaal, "client", "voorzieningen"),
        json!({
            "type": "array",
            "title": "voorzieningen",
            "items": {"type": "object", "$ref": "voorziening"}
        })
    );
    assert_eq!(
        property(sociaal, "voorziening", "client"),
        json!({"type": "object", "title": "client", "$ref": "client"})
    );
}

#[test]
fn test_unresolved_targets_are_dropped() {
    let generation = generate();
    let sociaal = generation.domain("ggm-sociaal-domein").unwrap();
    let client = sociaal.document.schema("client").unwrap();

    assert!(client.property("brp").is_none());
    assert_eq!(client.description, "GGM entity: Client");
    assert_eq!(sociaal.stats.build.unresolved_associations, 1);
    assert_eq!(sociaal.stats.build.unresolved_parents, 1);
}

#[test]
fn test_required_subset_of_properties() {
    let generation = generate();
    for domain in &generation.domains {
        for schema in domain.document.components.schemas.values() {
            assert!(schema.required_is_consistent(), "{}", schema.slug);
        }
    }
}

#[test]
fn test_envelope() {
    let generation = generate();
    let kern = serde_json::to_value(document(&generation, "ggm-kern")).unwrap();

    assert_eq!(kern["openapi"], json!("3.0.0"));
    assert_eq!(kern["info"]["title"], json!("GGM - 99 Kern"));
    assert_eq!(
        kern["info"]["description"],
        json!(
            "OpenRegister configuration for the Gemeentelijk Gegevensmodel (GGM) domain: 99 Kern. \
             Auto-generated from GGM v2.5.0."
        )
    );
    assert_eq!(kern["info"]["version"], json!("2.5.0"));
    assert_eq!(
        kern["x-openregister"],
        json!({
            "type": "application",
            "sourceType": "github",
            "sourceUrl": "https://github.com/ConductionNL/ggm-openregister",
            "openregister": "^v0.2.10",
            "github": {
                "repo": "ConductionNL/ggm-openregister",
                "branch": "main",
                "path": "99-kern.openregister.json"
            },
            "description": "Gemeentelijk Gegevensmodel - 99 Kern"
        })
    );
    assert_eq!(
        kern["components"]["registers"]["ggm-kern"],
        json!({
            "slug": "ggm-kern",
            "title": "GGM - 99 Kern",
            "version": "2.5.0",
            "description": "Gemeentelijk Gegevensmodel domain: 99 Kern",
            "schemas": ["persoon", "adres", "adres-2", "subject"],
            "source": "internal"
        })
    );
    assert_eq!(kern["components"]["schemas"]["subject"]["searchable"], json!(true));
    assert_eq!(kern["components"]["schemas"]["subject"]["hardValidation"], json!(false));
}

#[test]
fn test_generation_is_deterministic() {
    let first = serde_json::to_string(document(&generate(), "ggm-kern")).unwrap();
    let second = serde_json::to_string(document(&generate(), "ggm-kern")).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_custom_partition_table() {
    let snapshot = snapshot();
    let mut config = GeneratorConfig::default();
    config.domains = vec![DomainPartition::new(368, "Personen", "personen", "personen.json")];

    let generation = Generator::new(&snapshot, &config).run().unwrap();
    let doc = document(&generation, "personen");

    // Subject lives above the partition root and Client in an untracked domain
    let persoon = doc.schema("persoon").unwrap();
    assert_eq!(persoon.description, "Een natuurlijk persoon.");
    assert!(persoon.property("client").is_none());
    assert!(persoon.property("adressen").is_some());
}

#[test]
fn test_overlapping_partitions_rejected() {
    let snapshot = snapshot();
    let mut config = GeneratorConfig::default();
    config.domains.push(DomainPartition::new(368, "Personen", "personen", "personen.json"));

    let err = Generator::new(&snapshot, &config).run().unwrap_err();
    assert!(matches!(err, GeneratorError::OverlappingDomains { .. }));
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn test_writer_outputs_documents_and_checksums() {
    let generation = generate();
    let dir = tempfile::tempdir().unwrap();

    let writer = OutputWriter::new(dir.path(), OutputFormat::Pretty).with_checksums(true);
    let report = writer.write(&generation, "2.5.0").unwrap();

    assert_eq!(report.domains.len(), 12);
    assert_eq!(report.total_schemas, 6);

    let written = std::fs::read_to_string(dir.path().join("99-kern.openregister.json")).unwrap();
    let parsed: DomainDocument = serde_json::from_str(&written).unwrap();
    assert_eq!(&parsed, document(&generation, "ggm-kern"));
    assert!(written.contains("\n  \"info\": {"));

    let checksums = std::fs::read_to_string(dir.path().join("checksums.sha256")).unwrap();
    assert_eq!(checksums.lines().count(), 12);
    let kern = report.domains.iter().find(|d| d.slug == "ggm-kern").unwrap();
    assert!(kern.checksum.verify(written.as_bytes()));
    assert!(checksums.contains(&kern.checksum.manifest_line("99-kern.openregister.json")));
}

#[test]
fn test_dry_run_writes_nothing() {
    let generation = generate();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");

    let report = OutputWriter::new(&target, OutputFormat::Compact)
        .dry_run(true)
        .write(&generation, "2.5.0")
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.total_schemas, 6);
    assert!(!target.exists());
}

#[test]
fn test_report_roundtrip_to_disk() {
    let generation = generate();
    let dir = tempfile::tempdir().unwrap();
    let report = OutputWriter::new(dir.path(), OutputFormat::Compact)
        .write(&generation, "2.5.0")
        .unwrap();

    let path = dir.path().join("report.json");
    report.save(&path).unwrap();
    let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["modelVersion"], json!("2.5.0"));
    assert_eq!(value["indexedEntities"], json!(6));
}

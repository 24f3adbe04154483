//! GGM OpenRegister Generator
//!
//! Transforms the Gemeentelijk Gegevensmodel (GGM), exported from its
//! modelling-tool repository, into OpenRegister configuration documents.
//!
//! ## Features
//!
//! - **One document per domain**: each top-level package becomes a register
//!   with the schemas of all entities beneath it
//! - **Cross-domain references**: relationships resolve to bare schema slugs
//!   through an index built over every domain up front
//! - **Deterministic output**: stable ordering and slug collision suffixes
//! - **Best effort**: unresolvable targets and parents are dropped, not fatal
//!
//! ## Pipeline
//!
//! ```text
//! ModelSnapshot ─┬─> expand_scopes ─> GlobalIndex
//!                │                         │
//!                └─> DomainAssembler ──────┴─> SchemaBuilder
//!                          │                   (map_type, slugify)
//!                          │
//!                          └─> DomainDocument ─> OutputWriter
//! ```

pub mod builder;
pub mod checksum;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod index;
pub mod model;
pub mod output;
pub mod schema;
pub mod slug;
pub mod type_map;
pub mod version;

pub use builder::{BuildStats, Cardinality, SchemaBuilder};
pub use checksum::Checksum;
pub use config::{DomainPartition, GenerationSettings, GeneratorConfig, OutputFormat};
pub use domain::{DomainAssembler, DomainDocument, GeneratedDomain, RegisterObject};
pub use error::{GeneratorError, Result};
pub use generator::{Generation, Generator};
pub use index::{expand_scopes, DomainScope, GlobalIndex, IndexEntry};
pub use model::{ModelSnapshot, ObjectId, PackageId, SnapshotData};
pub use output::{GenerationReport, OutputWriter};
pub use schema::{Property, SchemaDocument};
pub use slug::{slugify, to_property_name};
pub use type_map::{map_type, JsonType, PropertyType, StringFormat};
pub use version::ModelVersion;

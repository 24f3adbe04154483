//! Schema Builder
//!
//! Turns one modeled entity into a [`SchemaDocument`]:
//! 1. attribute properties, in attribute position order
//! 2. relationship properties from association/aggregation edges, which
//!    never replace an attribute property with the same key
//! 3. inheritance, recorded as an `Extends:` note in the description
//!
//! Relationship targets and parents are looked up in the [`GlobalIndex`].
//! Anything that does not resolve is left out without failing the entity.

use std::collections::HashMap;
use std::ops::AddAssign;

use tracing::{debug, warn};

use crate::config::GenerationSettings;
use crate::index::GlobalIndex;
use crate::model::{Attribute, Connector, ModelObject, ModelSnapshot, ObjectId, ObjectKind};
use crate::schema::{Property, SchemaDocument};
use crate::slug::{slugify, strip_html, to_property_name};
use crate::type_map::map_type;

/// Multiplicity of a relationship end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}

impl Cardinality {
    /// Infer the multiplicity from a cardinality string.
    ///
    /// The well-known forms are matched exactly. Anything else counts as
    /// multiple when it contains `*`, or contains `..` without ending in
    /// `..1`; so a bounded range such as `2..4` is also multiple.
    pub fn infer(cardinality: Option<&str>) -> Self {
        let Some(card) = cardinality else {
            return Cardinality::Single;
        };

        match card {
            "0..*" | "1..*" | "*" => Cardinality::Multiple,
            "0..1" | "1" | "1..1" => Cardinality::Single,
            _ if card.contains('*') || (card.contains("..") && !card.ends_with("..1")) => {
                Cardinality::Multiple
            }
            _ => Cardinality::Single,
        }
    }
}

/// Counters for everything the builder left out or adjusted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    /// Relationship targets outside every tracked domain
    pub unresolved_associations: usize,
    /// Generalization parents outside every tracked domain
    pub unresolved_parents: usize,
    /// Relationship properties dropped because the key was already taken
    pub skipped_association_keys: usize,
    /// Attributes without a usable property name
    pub skipped_attributes: usize,
    /// Entities without a usable name
    pub skipped_entities: usize,
}

impl AddAssign for BuildStats {
    fn add_assign(&mut self, other: Self) {
        self.unresolved_associations += other.unresolved_associations;
        self.unresolved_parents += other.unresolved_parents;
        self.skipped_association_keys += other.skipped_association_keys;
        self.skipped_attributes += other.skipped_attributes;
        self.skipped_entities += other.skipped_entities;
    }
}

/// Builds schema documents for the entities of one domain
pub struct SchemaBuilder<'a> {
    snapshot: &'a ModelSnapshot,
    index: &'a GlobalIndex,
    settings: &'a GenerationSettings,
    /// Enumerations defined inside the domain being built
    local_enums: HashMap<ObjectId, &'a [String]>,
    stats: BuildStats,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(
        snapshot: &'a ModelSnapshot,
        index: &'a GlobalIndex,
        settings: &'a GenerationSettings,
        local_enums: HashMap<ObjectId, &'a [String]>,
    ) -> Self {
        Self {
            snapshot,
            index,
            settings,
            local_enums,
            stats: BuildStats::default(),
        }
    }

    /// Counters accumulated over every `build` call
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Build the schema for an entity; `None` when its name yields no slug
    pub fn build(&mut self, entity: &ModelObject) -> Option<SchemaDocument> {
        let slug = slugify(&entity.name);
        if slug.is_empty() {
            debug!(
                object_id = entity.id,
                name = %entity.name,
                "Skipping entity without usable name"
            );
            self.stats.skipped_entities += 1;
            return None;
        }

        let note = strip_html(entity.note.as_deref().unwrap_or_default());
        let description = if note.is_empty() {
            format!("{}: {}", self.settings.description_prefix, entity.name)
        } else {
            note
        };

        let mut schema = SchemaDocument::new(
            slug,
            entity.name.clone(),
            self.settings.version.version_string(),
            description,
        );

        for attr in self.snapshot.attributes_of(entity.id) {
            self.add_attribute(&mut schema, attr);
        }

        for connector in self.snapshot.associations_for(entity.id) {
            self.add_association(&mut schema, entity.id, connector);
        }

        if let Some(extends) = self.extends_note(entity.id) {
            schema.description.push_str(&extends);
        }

        Some(schema)
    }

    fn add_attribute(&mut self, schema: &mut SchemaDocument, attr: &Attribute) {
        let key = to_property_name(&attr.name);
        if key.is_empty() {
            debug!(
                object_id = attr.object_id,
                name = %attr.name,
                "Skipping attribute without usable name"
            );
            self.stats.skipped_attributes += 1;
            return;
        }

        let property = self.map_attribute(attr);
        schema.properties.insert(key.clone(), property);

        if is_required(attr.lower_bound.as_deref()) && !schema.required.contains(&key) {
            schema.required.push(key);
        }
    }

    fn map_attribute(&self, attr: &Attribute) -> Property {
        let notes = strip_html(attr.notes.as_deref().unwrap_or_default());
        let type_name = attr.type_name.as_deref().unwrap_or_default();
        let describe = |property: Property| {
            if notes.is_empty() {
                property
            } else {
                property.with_description(notes.as_str())
            }
        };

        if let Some(classifier) = attr.classifier {
            if let Some(literals) = self.enum_literals(classifier) {
                return describe(Property::enumeration(attr.name.as_str(), literals));
            }

            match self.snapshot.object(classifier) {
                // A data type classifier does not change the mapping of the declared type
                Some(obj) if obj.object_type == ObjectKind::DataType => {
                    return describe(Property::scalar(map_type(type_name), attr.name.as_str()));
                }
                Some(_) => {}
                None => warn!(
                    object_id = attr.object_id,
                    attribute = %attr.name,
                    classifier,
                    "Classifier points at an unknown object"
                ),
            }
        }

        let property = describe(Property::scalar(map_type(type_name), attr.name.as_str()));
        match attr.default.as_deref().map(str::trim) {
            Some(default) if !default.is_empty() => property.with_default(default),
            _ => property,
        }
    }

    /// Literals of an enumeration, preferring the domain's own enumerations
    fn enum_literals(&self, id: ObjectId) -> Option<&'a [String]> {
        if let Some(literals) = self.local_enums.get(&id) {
            return Some(*literals);
        }
        let literals = self.snapshot.enum_literals(id)?;
        debug!(enumeration = id, "Attribute uses an enumeration from another domain");
        Some(literals)
    }

    fn add_association(
        &mut self,
        schema: &mut SchemaDocument,
        entity_id: ObjectId,
        connector: &Connector,
    ) {
        let (target_id, cardinality, role) = if connector.start_object_id == entity_id {
            (
                connector.end_object_id,
                connector.dest_card.as_deref(),
                connector.dest_role.as_deref(),
            )
        } else {
            (
                connector.start_object_id,
                connector.source_card.as_deref(),
                connector.source_role.as_deref(),
            )
        };

        let Some(target) = self.index.resolve(target_id) else {
            debug!(
                schema = %schema.slug,
                connector = connector.id,
                target = target_id,
                "Dropping relationship to entity outside tracked domains"
            );
            self.stats.unresolved_associations += 1;
            return;
        };

        let label = non_blank(role)
            .or_else(|| non_blank(connector.name.as_deref()))
            .unwrap_or(target.schema_slug.as_str());
        let mut key = to_property_name(label);
        if key.is_empty() {
            key = target.schema_slug.clone();
        }

        if schema.properties.contains_key(&key) {
            debug!(
                schema = %schema.slug,
                property = %key,
                "Relationship key already taken, skipping"
            );
            self.stats.skipped_association_keys += 1;
            return;
        }

        let target_slug = target.schema_slug.as_str();
        let property = match Cardinality::infer(cardinality) {
            Cardinality::Multiple => Property::reference_list(key.as_str(), target_slug),
            Cardinality::Single => Property::reference(key.as_str(), target_slug),
        };
        schema.properties.insert(key, property);
    }

    fn extends_note(&mut self, entity_id: ObjectId) -> Option<String> {
        let mut parents = Vec::new();
        for parent_id in self.snapshot.generalization_parents(entity_id) {
            match self.index.resolve(parent_id) {
                Some(parent) => parents.push(parent.schema_slug.as_str()),
                None => {
                    debug!(object_id = entity_id, parent = parent_id, "Dropping unresolved parent");
                    self.stats.unresolved_parents += 1;
                }
            }
        }

        (!parents.is_empty()).then(|| format!(" Extends: {}.", parents.join(", ")))
    }
}

/// An attribute is mandatory when its lower bound is present and not zero
fn is_required(lower_bound: Option<&str>) -> bool {
    matches!(lower_bound, Some(bound) if bound != "0" && !bound.is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

//! Source Model Snapshot
//!
//! Read-only view of the modelling-tool repository: packages, objects,
//! attributes and connectors. The snapshot is loaded once from a JSON export
//! of the repository tables and never mutated afterwards. Lookup indexes
//! (package children, attributes per object, connectors per object,
//! enumeration literals) are built on load so the engine never re-scans.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{GeneratorError, Result};

/// Package identifier in the source repository
pub type PackageId = i64;

/// Object identifier in the source repository
pub type ObjectId = i64;

// =============================================================================
// Repository Rows
// =============================================================================

/// A package; packages form a tree through `parent_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: PackageId,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<PackageId>,
}

/// Kind of a repository object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Class,
    Enumeration,
    DataType,
    /// Diagram notes, boundaries, components and anything else
    #[serde(other)]
    Other,
}

/// A repository object (class, enumeration, data type, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelObject {
    pub id: ObjectId,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    pub object_type: ObjectKind,
    pub package_id: PackageId,
    #[serde(default)]
    pub stereotype: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// An attribute row; also used for enumeration literals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub object_id: ObjectId,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// Referenced enumeration or data type; `0` and blank mean none
    #[serde(default, deserialize_with = "optional_object_id")]
    pub classifier: Option<ObjectId>,
    #[serde(default, deserialize_with = "optional_text")]
    pub lower_bound: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub upper_bound: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub default: Option<String>,
    #[serde(default)]
    pub pos: i64,
}

/// Kind of a connector between two objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorKind {
    Association,
    Aggregation,
    Generalization,
    #[serde(other)]
    Other,
}

impl ConnectorKind {
    /// Association and aggregation edges become relationship properties
    pub fn is_relationship(&self) -> bool {
        matches!(self, ConnectorKind::Association | ConnectorKind::Aggregation)
    }
}

/// A connector (edge) between two objects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub connector_type: ConnectorKind,
    pub start_object_id: ObjectId,
    pub end_object_id: ObjectId,
    #[serde(default, deserialize_with = "optional_text")]
    pub source_card: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub dest_card: Option<String>,
    #[serde(default)]
    pub source_role: Option<String>,
    #[serde(default)]
    pub dest_role: Option<String>,
}

/// Raw table export as handed over by the repository reader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub objects: Vec<ModelObject>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

/// Numeric or textual column value
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    fn into_text(self) -> String {
        match self {
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s,
            Cell::Bool(b) => b.to_string(),
        }
    }
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Cell>::deserialize(deserializer)?.map(Cell::into_text))
}

fn text_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn optional_object_id<'de, D>(deserializer: D) -> std::result::Result<Option<ObjectId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Int(i)) => Some(i),
        Some(Cell::Text(s)) => s.trim().parse::<ObjectId>().ok(),
        _ => None,
    };
    Ok(id.filter(|id| *id != 0))
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable, indexed snapshot of the source model
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    data: SnapshotData,
    package_children: HashMap<PackageId, Vec<PackageId>>,
    objects_by_id: HashMap<ObjectId, usize>,
    attributes_by_object: HashMap<ObjectId, Vec<usize>>,
    connectors_by_object: HashMap<ObjectId, Vec<usize>>,
    enum_literals: HashMap<ObjectId, Vec<String>>,
}

impl ModelSnapshot {
    /// Build the lookup indexes over a raw table export
    pub fn new(data: SnapshotData) -> Self {
        let mut package_children: HashMap<PackageId, Vec<PackageId>> = HashMap::new();
        for package in &data.packages {
            if let Some(parent) = package.parent_id {
                package_children.entry(parent).or_default().push(package.id);
            }
        }

        let objects_by_id = data
            .objects
            .iter()
            .enumerate()
            .map(|(idx, obj)| (obj.id, idx))
            .collect::<HashMap<_, _>>();

        let mut attributes_by_object: HashMap<ObjectId, Vec<usize>> = HashMap::new();
        for (idx, attr) in data.attributes.iter().enumerate() {
            attributes_by_object.entry(attr.object_id).or_default().push(idx);
        }
        // Stable: attributes sharing a position keep their row order
        for indices in attributes_by_object.values_mut() {
            indices.sort_by_key(|&idx| data.attributes[idx].pos);
        }

        let mut connectors_by_object: HashMap<ObjectId, Vec<usize>> = HashMap::new();
        for (idx, connector) in data.connectors.iter().enumerate() {
            connectors_by_object
                .entry(connector.start_object_id)
                .or_default()
                .push(idx);
            if connector.end_object_id != connector.start_object_id {
                connectors_by_object
                    .entry(connector.end_object_id)
                    .or_default()
                    .push(idx);
            }
        }

        let enum_literals = data
            .objects
            .iter()
            .filter(|obj| obj.object_type == ObjectKind::Enumeration)
            .map(|obj| {
                let literals = attributes_by_object
                    .get(&obj.id)
                    .map(|indices| {
                        indices
                            .iter()
                            .map(|&idx| data.attributes[idx].name.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                (obj.id, literals)
            })
            .collect();

        Self {
            data,
            package_children,
            objects_by_id,
            attributes_by_object,
            connectors_by_object,
            enum_literals,
        }
    }

    /// Parse a snapshot from its JSON export
    pub fn from_json_str(content: &str) -> Result<Self> {
        let data: SnapshotData = serde_json::from_str(content)?;
        Ok(Self::new(data))
    }

    /// Load a snapshot from a JSON export on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot_error = |reason: String| GeneratorError::Snapshot {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| snapshot_error(e.to_string()))?;
        let data: SnapshotData =
            serde_json::from_str(&content).map_err(|e| snapshot_error(e.to_string()))?;
        Ok(Self::new(data))
    }

    /// Look up an object by id
    pub fn object(&self, id: ObjectId) -> Option<&ModelObject> {
        self.objects_by_id.get(&id).map(|&idx| &self.data.objects[idx])
    }

    /// Literal names of an enumeration, ordered by position
    pub fn enum_literals(&self, id: ObjectId) -> Option<&[String]> {
        self.enum_literals.get(&id).map(Vec::as_slice)
    }

    /// The root package and every package below it.
    ///
    /// Walks the tree with an explicit work-list, so depth is unbounded and a
    /// malformed parent cycle is visited only once.
    pub fn descendant_packages(&self, root: PackageId) -> Vec<PackageId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(package_id) = stack.pop() {
            if !visited.insert(package_id) {
                continue;
            }
            result.push(package_id);
            if let Some(children) = self.package_children.get(&package_id) {
                // Reversed so children are visited in row order
                stack.extend(children.iter().rev().copied());
            }
        }

        result
    }

    /// Modeled entities in the given packages, in snapshot order
    pub fn entities_in<'a>(
        &'a self,
        packages: &'a HashSet<PackageId>,
        stereotype: &'a str,
    ) -> impl Iterator<Item = &'a ModelObject> + 'a {
        self.data
            .objects
            .iter()
            .filter(move |obj| packages.contains(&obj.package_id))
            .filter(move |obj| is_modeled_entity(obj, stereotype))
    }

    /// Enumerations in the given packages, in snapshot order
    pub fn enumerations_in<'a>(
        &'a self,
        packages: &'a HashSet<PackageId>,
    ) -> impl Iterator<Item = &'a ModelObject> + 'a {
        self.data
            .objects
            .iter()
            .filter(move |obj| packages.contains(&obj.package_id))
            .filter(|obj| obj.object_type == ObjectKind::Enumeration)
    }

    /// Attributes of an object ordered by position
    pub fn attributes_of(&self, id: ObjectId) -> Vec<&Attribute> {
        self.attributes_by_object
            .get(&id)
            .map(|indices| indices.iter().map(|&idx| &self.data.attributes[idx]).collect())
            .unwrap_or_default()
    }

    /// Association and aggregation connectors touching an object, in snapshot order
    pub fn associations_for(&self, id: ObjectId) -> Vec<&Connector> {
        self.connectors_of(id)
            .filter(|c| c.connector_type.is_relationship())
            .collect()
    }

    /// Parents of an object through generalization edges (object is the child)
    pub fn generalization_parents(&self, id: ObjectId) -> Vec<ObjectId> {
        self.connectors_of(id)
            .filter(|c| c.connector_type == ConnectorKind::Generalization)
            .filter(|c| c.start_object_id == id)
            .map(|c| c.end_object_id)
            .collect()
    }

    fn connectors_of(&self, id: ObjectId) -> impl Iterator<Item = &Connector> {
        self.connectors_by_object
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.data.connectors[idx])
    }
}

/// A class carrying the entity stereotype becomes a schema
pub fn is_modeled_entity(obj: &ModelObject, stereotype: &str) -> bool {
    obj.object_type == ObjectKind::Class && obj.stereotype.as_deref() == Some(stereotype)
}

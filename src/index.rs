//! Cross-domain reference index
//!
//! Relationships in the source model freely cross domain boundaries, so
//! every modeled entity of every domain is indexed before any schema is
//! built. The resulting [`GlobalIndex`] maps an object id to the register
//! slug of its domain and its schema slug, and is read-only afterwards.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::DomainPartition;
use crate::error::{GeneratorError, Result};
use crate::model::{ModelSnapshot, ObjectId, PackageId};
use crate::slug::slugify;

/// A partition together with its expanded package subtree
#[derive(Debug, Clone)]
pub struct DomainScope<'a> {
    pub partition: &'a DomainPartition,
    pub packages: HashSet<PackageId>,
}

impl<'a> DomainScope<'a> {
    /// Expand the package subtree of a partition
    pub fn expand(snapshot: &ModelSnapshot, partition: &'a DomainPartition) -> Self {
        Self {
            partition,
            packages: snapshot.descendant_packages(partition.root_id).into_iter().collect(),
        }
    }

    pub fn contains(&self, package_id: PackageId) -> bool {
        self.packages.contains(&package_id)
    }
}

/// Expand every partition once and check that no root lies inside another
/// partition's subtree.
pub fn expand_scopes<'a>(
    snapshot: &ModelSnapshot,
    domains: &'a [DomainPartition],
) -> Result<Vec<DomainScope<'a>>> {
    let scopes: Vec<_> = domains
        .iter()
        .map(|partition| DomainScope::expand(snapshot, partition))
        .collect();

    for outer in &scopes {
        for inner in &scopes {
            if inner.partition.root_id != outer.partition.root_id
                && outer.contains(inner.partition.root_id)
            {
                return Err(GeneratorError::OverlappingDomains {
                    inner: inner.partition.slug.clone(),
                    inner_root: inner.partition.root_id,
                    outer: outer.partition.slug.clone(),
                    outer_root: outer.partition.root_id,
                });
            }
        }
    }

    Ok(scopes)
}

/// Where an entity ends up in the generated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Register slug of the owning domain
    pub domain_slug: String,
    /// Base schema slug (before in-domain collision renaming)
    pub schema_slug: String,
}

/// Global entity index: object id → (domain slug, schema slug)
#[derive(Debug, Clone, Default)]
pub struct GlobalIndex {
    entries: HashMap<ObjectId, IndexEntry>,
}

impl GlobalIndex {
    /// Index every modeled entity of every scope.
    ///
    /// Entities whose name yields an empty slug produce no schema and are
    /// left out, so references to them are dropped like any other
    /// unresolvable target.
    pub fn build(snapshot: &ModelSnapshot, scopes: &[DomainScope<'_>], stereotype: &str) -> Self {
        let mut entries: HashMap<ObjectId, IndexEntry> = HashMap::new();

        for scope in scopes {
            for entity in snapshot.entities_in(&scope.packages, stereotype) {
                let schema_slug = slugify(&entity.name);
                if schema_slug.is_empty() {
                    debug!(
                        object_id = entity.id,
                        name = %entity.name,
                        "Entity has no usable slug, not indexed"
                    );
                    continue;
                }

                if let Some(existing) = entries.get(&entity.id) {
                    warn!(
                        object_id = entity.id,
                        first = %existing.domain_slug,
                        second = %scope.partition.slug,
                        "Entity reachable from two domains, keeping the first"
                    );
                    continue;
                }

                entries.insert(
                    entity.id,
                    IndexEntry {
                        domain_slug: scope.partition.slug.clone(),
                        schema_slug,
                    },
                );
            }
        }

        Self { entries }
    }

    /// Resolve an entity; `None` means it is outside every tracked domain
    pub fn resolve(&self, id: ObjectId) -> Option<&IndexEntry> {
        self.entries.get(&id)
    }

    /// Number of indexed entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of indexed entities owned by a domain
    pub fn count_in_domain(&self, domain_slug: &str) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.domain_slug == domain_slug)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> ModelSnapshot {
        let data = json!({
            "packages": [
                {"id": 1, "name": "Root"},
                {"id": 2, "name": "Kern", "parentId": 1},
                {"id": 3, "name": "Kern sub", "parentId": 2},
                {"id": 4, "name": "Sociaal", "parentId": 1},
                {"id": 5, "name": "Buiten", "parentId": 1}
            ],
            "objects": [
                {"id": 10, "name": "Persoon", "objectType": "Class", "packageId": 3,
                 "stereotype": "Objecttype"},
                {"id": 11, "name": "Client", "objectType": "Class", "packageId": 4,
                 "stereotype": "Objecttype"},
                {"id": 12, "name": "Extern", "objectType": "Class", "packageId": 5,
                 "stereotype": "Objecttype"},
                {"id": 13, "name": "???", "objectType": "Class", "packageId": 4,
                 "stereotype": "Objecttype"},
                {"id": 14, "name": "Plain", "objectType": "Class", "packageId": 4}
            ]
        });
        ModelSnapshot::from_json_str(&data.to_string()).unwrap()
    }

    fn domains() -> Vec<DomainPartition> {
        vec![
            DomainPartition::new(2, "Kern", "ggm-kern", "kern.json"),
            DomainPartition::new(4, "Sociaal", "ggm-sociaal", "sociaal.json"),
        ]
    }

    #[test]
    fn test_index_resolves_across_domains() {
        let snapshot = snapshot();
        let domains = domains();
        let scopes = expand_scopes(&snapshot, &domains).unwrap();
        let index = GlobalIndex::build(&snapshot, &scopes, "Objecttype");

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.resolve(10),
            Some(&IndexEntry {
                domain_slug: "ggm-kern".to_string(),
                schema_slug: "persoon".to_string(),
            })
        );
        assert_eq!(index.resolve(11).unwrap().domain_slug, "ggm-sociaal");
        assert_eq!(index.count_in_domain("ggm-kern"), 1);
    }

    #[test]
    fn test_out_of_scope_entities_are_absent() {
        let snapshot = snapshot();
        let domains = domains();
        let scopes = expand_scopes(&snapshot, &domains).unwrap();
        let index = GlobalIndex::build(&snapshot, &scopes, "Objecttype");

        // Outside every partition, unnamed, and not stereotyped
        assert!(index.resolve(12).is_none());
        assert!(index.resolve(13).is_none());
        assert!(index.resolve(14).is_none());
        assert!(index.resolve(999).is_none());
    }

    #[test]
    fn test_scopes_are_disjoint() {
        let snapshot = snapshot();
        let domains = domains();
        let scopes = expand_scopes(&snapshot, &domains).unwrap();
        assert!(scopes[0].packages.is_disjoint(&scopes[1].packages));
        assert_eq!(scopes[0].packages, HashSet::from([2, 3]));
    }

    #[test]
    fn test_nested_partition_rejected() {
        let snapshot = snapshot();
        let domains = vec![
            DomainPartition::new(2, "Kern", "ggm-kern", "kern.json"),
            DomainPartition::new(3, "Kern sub", "ggm-kern-sub", "kern-sub.json"),
        ];
        match expand_scopes(&snapshot, &domains) {
            Err(GeneratorError::OverlappingDomains { inner, outer, .. }) => {
                assert_eq!(inner, "ggm-kern-sub");
                assert_eq!(outer, "ggm-kern");
            }
            other => panic!("Expected OverlappingDomains, got {:?}", other.map(|s| s.len())),
        }
    }
}

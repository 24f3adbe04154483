//! Generated schema types
//!
//! Shapes of the per-entity schema document and its properties, as consumed
//! by OpenRegister. Serialization skips absent fields so the JSON contains
//! only what was derived from the model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::type_map::{JsonType, PropertyType, StringFormat};

/// A single schema property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: JsonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,
    #[serde(default, rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    /// Bare schema slug of the referenced entity
    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Property {
    fn bare(kind: JsonType) -> Self {
        Self {
            kind,
            format: None,
            max_length: None,
            title: None,
            description: None,
            default: None,
            enum_values: None,
            items: None,
            reference: None,
        }
    }

    /// Scalar property from a mapped attribute type
    pub fn scalar(property_type: PropertyType, title: impl Into<String>) -> Self {
        Self {
            format: property_type.format,
            max_length: property_type.max_length,
            title: Some(title.into()),
            ..Self::bare(property_type.kind)
        }
    }

    /// String property restricted to enumeration literals; an empty literal
    /// list leaves the property unrestricted
    pub fn enumeration(title: impl Into<String>, literals: &[String]) -> Self {
        Self {
            title: Some(title.into()),
            enum_values: (!literals.is_empty()).then(|| literals.to_vec()),
            ..Self::bare(JsonType::String)
        }
    }

    /// To-one relationship
    pub fn reference(title: impl Into<String>, target_slug: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            reference: Some(target_slug.into()),
            ..Self::bare(JsonType::Object)
        }
    }

    /// To-many relationship
    pub fn reference_list(title: impl Into<String>, target_slug: impl Into<String>) -> Self {
        let item = Self {
            reference: Some(target_slug.into()),
            ..Self::bare(JsonType::Object)
        };
        Self {
            title: Some(title.into()),
            items: Some(Box::new(item)),
            ..Self::bare(JsonType::Array)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Schema generated for one modeled entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    /// Unique within the owning domain once collisions are resolved
    pub slug: String,
    pub title: String,
    pub version: String,
    pub description: String,
    /// Property keys of mandatory attributes
    pub required: Vec<String>,
    /// Attribute properties first, then relationship properties
    pub properties: IndexMap<String, Property>,
    pub searchable: bool,
    pub hard_validation: bool,
}

impl SchemaDocument {
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            version: version.into(),
            description: description.into(),
            required: Vec::new(),
            properties: IndexMap::new(),
            searchable: true,
            hard_validation: false,
        }
    }

    /// Get a property by key
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Every required key names an existing property
    pub fn required_is_consistent(&self) -> bool {
        self.required.iter().all(|key| self.properties.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_shapes() {
        assert_eq!(
            serde_json::to_value(Property::reference("adres", "adres")).unwrap(),
            json!({"type": "object", "title": "adres", "$ref": "adres"})
        );
        assert_eq!(
            serde_json::to_value(Property::reference_list("adressen", "adres")).unwrap(),
            json!({
                "type": "array",
                "title": "adressen",
                "items": {"type": "object", "$ref": "adres"}
            })
        );
    }

    #[test]
    fn test_enumeration_shape() {
        let literals = vec!["Ja".to_string(), "Nee".to_string()];
        assert_eq!(
            serde_json::to_value(Property::enumeration("indicatie", &literals)).unwrap(),
            json!({"type": "string", "title": "indicatie", "enum": ["Ja", "Nee"]})
        );
        assert_eq!(
            serde_json::to_value(Property::enumeration("leeg", &[])).unwrap(),
            json!({"type": "string", "title": "leeg"})
        );
    }

    #[test]
    fn test_schema_document_fixed_flags() {
        let schema = SchemaDocument::new("adres", "Adres", "2.5.0", "GGM entity: Adres");
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["searchable"], json!(true));
        assert_eq!(value["hardValidation"], json!(false));
        assert_eq!(value["required"], json!([]));
        assert!(schema.required_is_consistent());
    }
}

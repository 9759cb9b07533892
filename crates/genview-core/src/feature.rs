//! Runtime features handed out by the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A genomic record as the engine exposes it to handlers and panels.
///
/// Read-only from the core's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(alias = "uniqueId")]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<i8>,
    /// Every other attribute (note, description, subfeatures, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Feature {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            feature_type: None,
            name: None,
            ref_name: None,
            start: None,
            end: None,
            strand: None,
            attributes: Map::new(),
        }
    }

    pub fn with_type(mut self, feature_type: impl Into<String>) -> Self {
        self.feature_type = Some(feature_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_type(&self, feature_type: &str) -> bool {
        self.feature_type.as_deref() == Some(feature_type)
    }

    /// The name if present, otherwise the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

//! Object metadata and label selectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity and bookkeeping fields shared by every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    /// Object name, unique per kind and namespace.
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Labels used for ownership, identity, and selection.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Free-form annotations.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Version assigned by the cluster on every write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl ObjectMeta {
    /// Creates metadata for a named object in a namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Returns the value of a label, if present.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Returns whether every selector entry is present with the same value.
    #[must_use]
    pub fn matches_labels(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|actual| actual == v))
    }
}

/// Selects objects by label equality and set-based expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSelector {
    /// Required label values.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    /// Set-based requirements.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

/// One set-based selector requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    /// Label key.
    pub key: String,
    /// Relation between the key and the values.
    pub operator: SelectorOperator,
    /// Values compared against; empty for `Exists`/`DoesNotExist`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Operator of a set-based selector requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorOperator {
    /// Label value is one of the values.
    In,
    /// Label value is none of the values.
    NotIn,
    /// Label key is present.
    Exists,
    /// Label key is absent.
    DoesNotExist,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_labels_requires_every_entry() {
        let mut meta = ObjectMeta::new("api", "dev");
        let _ = meta.labels.insert("app".into(), "api".into());
        let _ = meta.labels.insert("tier".into(), "backend".into());

        let selector = BTreeMap::from([("app".to_string(), "api".to_string())]);
        assert!(meta.matches_labels(&selector));

        let selector = BTreeMap::from([
            ("app".to_string(), "api".to_string()),
            ("tier".to_string(), "frontend".to_string()),
        ]);
        assert!(!meta.matches_labels(&selector));
    }

    #[test]
    fn empty_metadata_fields_are_omitted() {
        let json = serde_json::to_value(ObjectMeta::new("api", "dev")).expect("serialize");
        assert_eq!(json, serde_json::json!({"name": "api", "namespace": "dev"}));
    }
}

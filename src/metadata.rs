//! # Unstructured Metadata Block
//!
//! The `metadata.json` entry of a dataset bundle carries the unstructured
//! key-value metadata: the declared organism, a human-readable title, the
//! declared matrix shape, and any free-form keys the uploader chooses to
//! keep. It is small by construction and always fully materialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unstructured metadata block of a dataset bundle (`metadata.json`).
///
/// Every field is optional at the serde level: a missing key is an expected
/// malformation surfaced as a schema violation, never a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Bundle format version the file was written with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,

    /// Human-readable dataset title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Declared organism name ("Homo sapiens" or "Mus musculus")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,

    /// Declared number of observations (matrix rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_obs: Option<u64>,

    /// Declared number of features (matrix columns)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_var: Option<u64>,

    /// Free-form extra keys, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DatasetMetadata {
    /// Create an empty metadata block stamped with the current format version.
    pub fn new() -> Self {
        Self {
            format_version: Some(crate::schema::CAPMAT_FORMAT_VERSION.to_string()),
            ..Default::default()
        }
    }

    /// Declared shape `(n_obs, n_var)`, when both dimensions are present.
    pub fn declared_shape(&self) -> Option<(u64, u64)> {
        Some((self.n_obs?, self.n_var?))
    }

    /// Look up a required key by name, treating blank strings as absent.
    ///
    /// Only the fixed fields participate in required-key checks; `extra`
    /// keys are free-form and never required.
    pub fn required_key(&self, key: &str) -> Option<&str> {
        let value = match key {
            "title" => self.title.as_deref(),
            "organism" => self.organism.as_deref(),
            "format_version" => self.format_version.as_deref(),
            _ => None,
        }?;
        let trimmed = value.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Parse a metadata block from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the block to pretty-printed JSON for `metadata.json`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

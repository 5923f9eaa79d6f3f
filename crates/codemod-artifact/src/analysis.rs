//! Upstream analysis artifact
//!
//! Produced by the external analyzer: the package being upgraded, the version
//! pair, prioritized file lists, and topic-tagged retrieval guidance. This
//! crate only reads it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Analysis artifact payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    /// Package under upgrade (e.g. `next`)
    #[serde(rename = "package", default, deserialize_with = "null_as_default")]
    pub package_name: String,

    /// Currently installed version
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_version: String,

    /// Version being upgraded to
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_version: String,

    /// File targeting hints
    #[serde(default, deserialize_with = "null_as_default")]
    pub prioritized_files: PrioritizedFiles,

    /// Retrieved documentation references, grouped by topic
    #[serde(rename = "rag_guidance", default, deserialize_with = "null_as_default")]
    pub guidance_entries: Vec<GuidanceEntry>,
}

impl AnalysisArtifact {
    /// Parse the artifact payload
    ///
    /// # Errors
    /// - [`AnalysisError::NotAnObject`] if the top level is not an object
    /// - [`AnalysisError::Json`] for malformed JSON or mistyped fields
    pub fn from_json(payload: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(payload)?;
        if !value.is_object() {
            return Err(AnalysisError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// The two prioritized-file sets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrioritizedFiles {
    /// High-priority subset
    #[serde(default, deserialize_with = "null_as_default")]
    pub risky_first: Vec<String>,

    /// Every file relevant to the package
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_package_files: Vec<String>,
}

impl PrioritizedFiles {
    /// True when neither set carries a path
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.risky_first.is_empty() && self.all_package_files.is_empty()
    }

    /// Union of both sets
    #[must_use]
    pub fn union(&self) -> HashSet<&str> {
        self.risky_first
            .iter()
            .chain(&self.all_package_files)
            .map(String::as_str)
            .collect()
    }
}

/// Topic-tagged guidance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuidanceEntry {
    /// Topic label; `misc` when absent
    #[serde(default = "misc_topic", deserialize_with = "null_as_misc")]
    pub topic: String,

    /// Retrieved references for the topic
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<GuidanceReference>,
}

/// A single retrieved reference
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuidanceReference {
    /// Source URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    /// Text snippet
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,

    /// Remaining retrieval metadata (score, title, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn misc_topic() -> String {
    "misc".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_misc<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(misc_topic))
}

/// Errors while loading an analysis artifact
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Invalid JSON or field types
    #[error("invalid artifacts JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level value is not an object
    #[error("artifacts JSON must be an object")]
    NotAnObject,
}

//! In-memory repository snapshots
//!
//! A [`RepositorySnapshot`] is an ordered set of `path -> text` pairs loaded
//! from the `{files: [{path, content}], label?}` payload. Snapshots are never
//! mutated in place by the engine: apply works on a clone. Fields the engine
//! does not know about, at the top level or on a file entry, are carried
//! through to export unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single file in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Repository-relative path
    pub path: String,
    /// Full text content (possibly empty)
    pub content: String,
    /// Other entry fields, exported as loaded
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl SourceFile {
    /// Create new file entry
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }
}

/// Ordered mapping of file path to text content
///
/// # Invariants
/// - Paths are unique
/// - `index[path]` is the position of `path` in `files`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositorySnapshot {
    files: Vec<SourceFile>,
    label: String,
    extra: Map<String, Value>,
    index: HashMap<String, usize>,
}

#[derive(Serialize)]
struct SnapshotPayload<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    label: &'a str,
    files: &'a [SourceFile],
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl RepositorySnapshot {
    /// Build a snapshot from files
    ///
    /// # Errors
    /// Returns [`SnapshotError::DuplicatePath`] if a path appears twice
    pub fn from_files(
        files: impl IntoIterator<Item = SourceFile>,
        label: impl Into<String>,
    ) -> Result<Self, SnapshotError> {
        let mut snapshot = Self {
            files: Vec::new(),
            label: label.into(),
            extra: Map::new(),
            index: HashMap::new(),
        };
        for file in files {
            if snapshot.index.contains_key(&file.path) {
                return Err(SnapshotError::DuplicatePath(file.path));
            }
            snapshot.index.insert(file.path.clone(), snapshot.files.len());
            snapshot.files.push(file);
        }
        Ok(snapshot)
    }

    /// Parse the snapshot payload
    ///
    /// Entries that are not objects carrying a string `path` and a string (or
    /// null) `content` are skipped.
    ///
    /// # Errors
    /// - [`SnapshotError::Json`] for malformed JSON
    /// - [`SnapshotError::NotAnObject`] if the top level is not an object
    /// - [`SnapshotError::MissingFiles`] if `files` is absent or not a list
    /// - [`SnapshotError::DuplicatePath`] if a path repeats
    pub fn from_json(payload: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(payload)?;
        let Value::Object(mut map) = value else {
            return Err(SnapshotError::NotAnObject);
        };
        let Some(Value::Array(entries)) = map.remove("files") else {
            return Err(SnapshotError::MissingFiles);
        };
        let label = match map.remove("label") {
            Some(Value::String(label)) => label,
            Some(other) => {
                // a non-string label is kept verbatim but not used
                map.insert("label".to_string(), other);
                String::new()
            }
            None => String::new(),
        };

        let mut skipped = 0usize;
        let files: Vec<SourceFile> = entries
            .iter()
            .filter_map(|entry| {
                let file = source_file_from_value(entry);
                if file.is_none() {
                    skipped += 1;
                }
                file
            })
            .collect();
        if skipped > 0 {
            tracing::debug!("Skipped {} malformed file entries", skipped);
        }

        let mut snapshot = Self::from_files(files, label)?;
        snapshot.extra = map;
        Ok(snapshot)
    }

    /// Serialize back to the snapshot payload (pretty JSON)
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        let payload = SnapshotPayload {
            label: &self.label,
            files: &self.files,
            extra: &self.extra,
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Display label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Files in load order
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Paths in load order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    /// Content for a path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .map(|&i| self.files[i].content.as_str())
    }

    /// Replace the content of an existing path
    ///
    /// Returns `false` (and changes nothing) if the path is unknown.
    pub fn set_content(&mut self, path: &str, content: String) -> bool {
        match self.index.get(path) {
            Some(&i) => {
                self.files[i].content = content;
                true
            }
            None => false,
        }
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot holds no files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn source_file_from_value(entry: &Value) -> Option<SourceFile> {
    let obj = entry.as_object()?;
    let path = obj.get("path")?.as_str()?;
    let content = match obj.get("content")? {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        _ => return None,
    };
    let mut file = SourceFile::new(path, content);
    file.extra = obj
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "path" | "content"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Some(file)
}

/// Errors while loading or exporting snapshots
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Payload is not valid JSON
    #[error("invalid repository JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level value is not an object
    #[error("repository JSON must be an object")]
    NotAnObject,

    /// `files` list missing
    #[error("repository JSON must include 'files'")]
    MissingFiles,

    /// Path appears more than once
    #[error("duplicate file path: {0}")]
    DuplicatePath(String),
}

//! Session configuration
//!
//! Every field has a default, so an empty TOML file is a valid config. Unknown
//! keys are rejected so typos do not silently fall back to defaults.

use codemod_artifact::{DiffGenerator, FULL_FINGERPRINT_LEN};
use codemod_retrieval::SUPPLEMENTAL_TOP_K;
use codemod_rules::{
    FileSelector, GuidanceCompactor, RuleError, CODE_EXTENSIONS, CONFIG_FILE_PATTERN,
    DEFAULT_HINT_VOCABULARY,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default export destination
pub const DEFAULT_EXPORT_PATH: &str = "./codemod_repo.json";

/// Candidate paths listed by suggest-changes
pub const DEFAULT_CANDIDATE_CAP: usize = 2000;

/// Change records inlined in the generate-diffs preview
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

/// Shortest fingerprint accepted from configuration
pub const MIN_FINGERPRINT_LEN: usize = 8;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },

    /// Selector pattern does not compile
    #[error(transparent)]
    Selector(#[from] RuleError),
}

/// Codemod session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodemodConfig {
    /// Extensions eligible when the artifact names no files
    pub code_extensions: Vec<String>,
    /// Framework config filename pattern
    pub config_file_pattern: String,
    /// Keywords searched for in guidance snippets
    pub hint_vocabulary: Vec<String>,
    /// Hex characters kept in content fingerprints
    pub fingerprint_len: usize,
    /// Context lines around each diff hunk
    pub context_radius: usize,
    /// Records inlined in the generate-diffs preview
    pub preview_limit: usize,
    /// Paths listed by suggest-changes
    pub candidate_cap: usize,
    /// Matches requested by the supplemental guidance query
    pub supplemental_top_k: usize,
    /// Export destination when none is given
    pub export_path: PathBuf,
    /// Initial dry-run flag
    pub dry_run: bool,
}

impl Default for CodemodConfig {
    fn default() -> Self {
        Self {
            code_extensions: CODE_EXTENSIONS.iter().map(ToString::to_string).collect(),
            config_file_pattern: CONFIG_FILE_PATTERN.to_string(),
            hint_vocabulary: DEFAULT_HINT_VOCABULARY.iter().map(ToString::to_string).collect(),
            fingerprint_len: codemod_artifact::FINGERPRINT_LEN,
            context_radius: codemod_artifact::DEFAULT_CONTEXT_RADIUS,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            supplemental_top_k: SUPPLEMENTAL_TOP_K,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            dry_run: true,
        }
    }
}

impl CodemodConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns error on invalid TOML, unknown keys or out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FINGERPRINT_LEN..=FULL_FINGERPRINT_LEN).contains(&self.fingerprint_len) {
            return Err(ConfigError::Invalid {
                field: "fingerprint_len",
                message: format!(
                    "{} is outside {MIN_FINGERPRINT_LEN}..={FULL_FINGERPRINT_LEN}",
                    self.fingerprint_len
                ),
            });
        }
        if self.code_extensions.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid {
                field: "code_extensions",
                message: "extensions must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// With dry-run flag
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With fingerprint length
    #[inline]
    #[must_use]
    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len;
        self
    }

    /// With preview limit
    #[inline]
    #[must_use]
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    /// With candidate cap
    #[inline]
    #[must_use]
    pub fn with_candidate_cap(mut self, cap: usize) -> Self {
        self.candidate_cap = cap;
        self
    }

    /// With export path
    #[inline]
    #[must_use]
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// File selector for these settings
    ///
    /// # Errors
    /// Returns error if the config file pattern does not compile
    pub fn selector(&self) -> Result<FileSelector, ConfigError> {
        Ok(FileSelector::new(
            self.code_extensions.iter().cloned(),
            &self.config_file_pattern,
        )?)
    }

    /// Guidance compactor for these settings
    #[must_use]
    pub fn compactor(&self) -> GuidanceCompactor {
        GuidanceCompactor::new(self.hint_vocabulary.iter().cloned())
    }

    /// Diff generator for these settings
    #[must_use]
    pub fn diff_generator(&self) -> DiffGenerator {
        DiffGenerator::new()
            .with_fingerprint_len(self.fingerprint_len)
            .with_context_radius(self.context_radius)
    }
}

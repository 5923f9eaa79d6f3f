//! File selection
//!
//! Two tiers, in priority order:
//!
//! 1. When the artifact names prioritized files, only those paths are eligible.
//! 2. Otherwise every source-code file is eligible, so a run never silently
//!    processes zero files for lack of targeting hints.
//!
//! Both tiers also require the path to look like a code file.

use crate::error::RuleError;
use codemod_artifact::{PrioritizedFiles, RepositorySnapshot};
use regex::Regex;

/// Source extensions eligible under the fallback tier
pub const CODE_EXTENSIONS: [&str; 8] = [".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".cts", ".mts"];

/// Framework config filename pattern
pub const CONFIG_FILE_PATTERN: &str = r"next\.config\.m?js$";

/// Decides which snapshot paths the pipeline runs on
#[derive(Debug, Clone)]
pub struct FileSelector {
    code_extensions: Vec<String>,
    config_pattern: Regex,
}

impl Default for FileSelector {
    fn default() -> Self {
        Self {
            code_extensions: CODE_EXTENSIONS.iter().map(ToString::to_string).collect(),
            config_pattern: crate::builtin::config_path_regex().clone(),
        }
    }
}

impl FileSelector {
    /// Create selector with custom extensions and config pattern
    ///
    /// # Errors
    /// [`RuleError::InvalidSelectorPattern`] when `config_pattern` does not compile
    pub fn new<I, S>(code_extensions: I, config_pattern: &str) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config_pattern =
            Regex::new(config_pattern).map_err(|e| RuleError::InvalidSelectorPattern {
                pattern: config_pattern.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            code_extensions: code_extensions.into_iter().map(Into::into).collect(),
            config_pattern,
        })
    }

    /// Whether the path has a code extension or is a framework config file
    #[must_use]
    pub fn is_code_file(&self, path: &str) -> bool {
        self.code_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
            || self.config_pattern.is_match(path)
    }

    /// Eligible paths in snapshot order
    #[must_use]
    pub fn select<'s>(
        &self,
        snapshot: &'s RepositorySnapshot,
        prioritized: &PrioritizedFiles,
    ) -> Vec<&'s str> {
        if prioritized.is_empty() {
            return snapshot.paths().filter(|p| self.is_code_file(p)).collect();
        }
        let wanted = prioritized.union();
        snapshot
            .paths()
            .filter(|p| wanted.contains(p) && self.is_code_file(p))
            .collect()
    }

    /// Eligible paths in snapshot order, at most `limit`
    #[must_use]
    pub fn candidates<'s>(
        &self,
        snapshot: &'s RepositorySnapshot,
        prioritized: &PrioritizedFiles,
        limit: usize,
    ) -> Vec<&'s str> {
        let mut selected = self.select(snapshot, prioritized);
        selected.truncate(limit);
        selected
    }
}

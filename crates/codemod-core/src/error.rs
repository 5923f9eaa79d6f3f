//! Error types for codemod sessions
//!
//! Three kinds of failure reach callers:
//! - invalid input (malformed payloads): the operation is aborted and the
//!   session is left as it was
//! - unmet preconditions (operations out of order, dry-run still on)
//! - I/O during export
//!
//! Rule failures never surface here; they become notes on the affected file.

use crate::config::ConfigError;
use crate::state::SessionState;
use codemod_artifact::{AnalysisError, SnapshotError};
use codemod_rules::RuleError;
use std::path::PathBuf;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum CodemodError {
    /// Repository payload rejected
    #[error("{0}")]
    Snapshot(#[from] SnapshotError),

    /// Analysis artifact payload rejected
    #[error("{0}")]
    Artifact(#[from] AnalysisError),

    /// Custom rule payload rejected
    #[error("{0}")]
    Rule(#[from] RuleError),

    /// Operation invoked out of order
    #[error("{0}")]
    Precondition(#[from] PreconditionError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Export could not be written
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodemodError {
    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "invalid_repository",
            Self::Artifact(_) => "invalid_artifact",
            Self::Rule(_) => "invalid_rule",
            Self::Precondition(p) => p.code(),
            Self::Config(_) => "invalid_config",
            Self::Io { .. } => "io",
        }
    }

    /// Whether the error names an unmet precondition
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Unmet operation preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// No repository snapshot loaded
    #[error("no repository loaded; load a repository first")]
    RepositoryNotLoaded,

    /// No analysis artifact loaded
    #[error("no analysis artifact loaded; load an artifact first")]
    ArtifactNotLoaded,

    /// Apply attempted while dry-run is on
    #[error("dry_run is true; set dry-run to false to apply")]
    DryRunEnabled,

    /// Apply attempted without a diff batch
    #[error("no diffs; run generate-diffs first")]
    NoDiffs,

    /// State machine rejected the move
    #[error("illegal session transition: {from:?} -> {to:?}")]
    IllegalTransition { from: SessionState, to: SessionState },
}

impl PreconditionError {
    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RepositoryNotLoaded => "repository_not_loaded",
            Self::ArtifactNotLoaded => "artifact_not_loaded",
            Self::DryRunEnabled => "dry_run_enabled",
            Self::NoDiffs => "no_diffs",
            Self::IllegalTransition { .. } => "illegal_transition",
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, CodemodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_distinguish_apply_preconditions() {
        let dry: CodemodError = PreconditionError::DryRunEnabled.into();
        let none: CodemodError = PreconditionError::NoDiffs.into();
        assert_eq!(dry.code(), "dry_run_enabled");
        assert_eq!(none.code(), "no_diffs");
        assert!(dry.is_precondition());
        assert!(dry.to_string().contains("dry_run"));
        assert!(none.to_string().contains("generate-diffs"));
    }

    #[test]
    fn input_errors_keep_their_message() {
        let err: CodemodError = SnapshotError::MissingFiles.into();
        assert_eq!(err.code(), "invalid_repository");
        assert_eq!(err.to_string(), "repository JSON must include 'files'");
        assert!(!err.is_precondition());
    }
}

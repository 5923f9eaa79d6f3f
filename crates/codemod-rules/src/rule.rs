//! Rule capability trait
//!
//! Provides the [`Rule`] trait: an applicability predicate plus a transform
//! over `(path, content, context)`.

use crate::context::RuleContext;
use std::fmt::Debug;

/// A codemod rule
///
/// # Contract
/// - `applicable` and `transform` are pure: same inputs, same outputs
/// - `transform` returns the complete new content, never a delta
/// - "no match" is not an error: return the content unchanged with zero changes
/// - applying a rule to its own output is a no-op
pub trait Rule: Send + Sync + Debug {
    /// Stable rule name
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Whether the rule should run on this file
    fn applicable(&self, path: &str, content: &str, ctx: &RuleContext) -> bool;

    /// Rewrite the content
    fn transform(&self, path: &str, content: &str, ctx: &RuleContext) -> RuleOutcome;
}

/// Result of one rule on one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Complete new content
    pub content: String,
    /// Number of changes made
    pub changes: u32,
    /// Advisory notes
    pub notes: Vec<String>,
    /// Set when the rule could not run; `notes` carries the cause
    pub failed: bool,
}

impl RuleOutcome {
    /// Content left as is
    #[inline]
    #[must_use]
    pub fn unchanged(content: &str) -> Self {
        Self {
            content: content.to_string(),
            changes: 0,
            notes: Vec::new(),
            failed: false,
        }
    }

    /// One change with a note
    #[inline]
    #[must_use]
    pub fn changed(content: String, note: impl Into<String>) -> Self {
        Self {
            content,
            changes: 1,
            notes: vec![note.into()],
            failed: false,
        }
    }

    /// Rule failed locally; content left as is
    #[inline]
    #[must_use]
    pub fn failed(content: &str, note: impl Into<String>) -> Self {
        Self {
            content: content.to_string(),
            changes: 0,
            notes: vec![note.into()],
            failed: true,
        }
    }

    /// Whether anything was counted
    #[inline]
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.changes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors() {
        let same = RuleOutcome::unchanged("x");
        assert!(!same.is_change());
        assert!(same.notes.is_empty());

        let changed = RuleOutcome::changed("y".into(), "did it");
        assert!(changed.is_change());
        assert_eq!(changed.notes, vec!["did it"]);

        let failed = RuleOutcome::failed("x", "bad pattern");
        assert!(failed.failed);
        assert!(!failed.is_change());
        assert_eq!(failed.content, "x");
    }
}

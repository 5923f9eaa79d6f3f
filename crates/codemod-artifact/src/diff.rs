//! Change records and unified diffs
//!
//! [`DiffGenerator`] turns a `(path, before, after)` triple into a
//! [`ChangeRecord`]: fingerprints of both sides plus a unified diff labeled
//! `a/<path>` / `b/<path>`.

use crate::hash::{Fingerprint, FINGERPRINT_LEN, FULL_FINGERPRINT_LEN};
use serde::{Deserialize, Serialize};
use similar::TextDiff;

/// Default number of context lines around each hunk
pub const DEFAULT_CONTEXT_RADIUS: usize = 3;

/// One file's entry in a diff batch
///
/// # Invariants
/// - `changes > 0`
/// - `before_hash != after_hash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// File path
    pub file: String,
    /// Fingerprint of the original content
    pub before_hash: Fingerprint,
    /// Fingerprint of the transformed content
    pub after_hash: Fingerprint,
    /// Total change count reported by the rules
    pub changes: u32,
    /// Advisory notes in application order
    pub notes: Vec<String>,
    /// Unified diff text
    pub patch: String,
}

/// Builds change records
#[derive(Debug, Clone, Copy)]
pub struct DiffGenerator {
    fingerprint_len: usize,
    context_radius: usize,
}

impl Default for DiffGenerator {
    fn default() -> Self {
        Self {
            fingerprint_len: FINGERPRINT_LEN,
            context_radius: DEFAULT_CONTEXT_RADIUS,
        }
    }
}

impl DiffGenerator {
    /// Create generator with default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With fingerprint length
    #[inline]
    #[must_use]
    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len;
        self
    }

    /// With hunk context radius
    #[inline]
    #[must_use]
    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    /// Fingerprint text with the configured length
    #[inline]
    #[must_use]
    pub fn fingerprint(&self, text: &str) -> Fingerprint {
        Fingerprint::with_len(text, self.fingerprint_len)
    }

    /// Unified diff between two texts
    #[must_use]
    pub fn unified_diff(&self, path: &str, before: &str, after: &str) -> String {
        unified_diff(path, before, after, self.context_radius)
    }

    /// Build a record, or `None` when nothing actually changed
    ///
    /// A file is only recorded if the rules counted at least one change and
    /// the content differs; either condition alone is not enough. Whether a
    /// file changed is decided on the content itself. When the truncated
    /// fingerprints of two different texts collide, both sides are recorded
    /// with the full digest instead.
    #[must_use]
    pub fn record(
        &self,
        path: &str,
        before: &str,
        after: &str,
        changes: u32,
        notes: Vec<String>,
    ) -> Option<ChangeRecord> {
        if changes == 0 || before == after {
            if changes > 0 {
                tracing::debug!("Rules reported {} changes on {} with identical output", changes, path);
            }
            return None;
        }
        let mut before_hash = self.fingerprint(before);
        let mut after_hash = self.fingerprint(after);
        if before_hash == after_hash {
            // the content differs, so only the truncation collided
            tracing::debug!("Fingerprint collision on {}; recording full digests", path);
            before_hash = Fingerprint::with_len(before, FULL_FINGERPRINT_LEN);
            after_hash = Fingerprint::with_len(after, FULL_FINGERPRINT_LEN);
        }
        Some(ChangeRecord {
            file: path.to_string(),
            before_hash,
            after_hash,
            changes,
            notes,
            patch: self.unified_diff(path, before, after),
        })
    }
}

/// Line-based unified diff labeled `a/<path>` and `b/<path>`
#[must_use]
pub fn unified_diff(path: &str, before: &str, after: &str, context_radius: usize) -> String {
    let diff = TextDiff::from_lines(before, after);
    diff.unified_diff()
        .context_radius(context_radius)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

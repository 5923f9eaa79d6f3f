//! Codemod Artifact System
//!
//! Data model shared by every stage of the upgrade codemod workflow.
//!
//! # Core Concepts
//!
//! - [`RepositorySnapshot`]: ordered `path -> content` pairs, copied before any apply
//! - [`AnalysisArtifact`]: upstream analysis (package, versions, targeting hints, guidance)
//! - [`ContentHash`] / [`Fingerprint`]: SHA-256 and its truncated form
//! - [`ChangeRecord`]: one diff-batch entry, built by [`DiffGenerator`]
//!
//! # Example
//!
//! ```rust,ignore
//! use codemod_artifact::{DiffGenerator, RepositorySnapshot};
//!
//! let snapshot = RepositorySnapshot::from_json(payload)?;
//! let record = DiffGenerator::new().record("a.ts", before, after, 1, notes);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod analysis;
mod diff;
mod hash;
mod snapshot;

pub use analysis::{AnalysisArtifact, AnalysisError, GuidanceEntry, GuidanceReference, PrioritizedFiles};
pub use diff::{unified_diff, ChangeRecord, DiffGenerator, DEFAULT_CONTEXT_RADIUS};
pub use hash::{ContentHash, Fingerprint, FINGERPRINT_LEN, FULL_FINGERPRINT_LEN};
pub use snapshot::{RepositorySnapshot, SnapshotError, SourceFile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn snapshot_to_change_record() {
        let snap = RepositorySnapshot::from_json(
            r#"{"files":[{"path":"app/page.tsx","content":"import x from 'a';\n"}]}"#,
        )
        .unwrap();
        let before = snap.get("app/page.tsx").unwrap();
        let after = "import x from 'b';\n";

        let record = DiffGenerator::new()
            .record("app/page.tsx", before, after, 1, vec!["moved".into()])
            .unwrap();

        assert_eq!(record.before_hash, Fingerprint::of(before));
        assert!(record.patch.contains("-import x from 'a';"));
        assert!(record.patch.contains("+import x from 'b';"));
    }
}

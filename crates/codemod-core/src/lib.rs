//! Codemod Core - upgrade session controller
//!
//! Ties the rule engine to a session with a defined lifecycle:
//! - Loads a repository snapshot and an analysis artifact
//! - Harvests guidance (artifact references plus an optional live query)
//! - Previews changes as a diff batch without touching any snapshot
//! - Commits changes into a copy, only when dry-run is off
//! - Exports the result as a snapshot payload
//!
//! # Example
//!
//! ```rust,ignore
//! use codemod_core::{CodemodSession, ControlSurface};
//!
//! let mut session = CodemodSession::new();
//! session.load_repository(&repo_json)?;
//! session.load_artifact(&artifact_json)?;
//! let summary = session.generate_diffs()?;
//! println!("{} files would change", summary.diff_count);
//!
//! session.set_dry_run(false);
//! let report = session.apply()?;
//! session.export(None)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod control;
pub mod error;
pub mod session;
pub mod state;

pub use config::{
    CodemodConfig, ConfigError, DEFAULT_CANDIDATE_CAP, DEFAULT_EXPORT_PATH, DEFAULT_PREVIEW_LIMIT,
    MIN_FINGERPRINT_LEN,
};
pub use control::{is_ok, parse_flag, ControlSurface, TRUTHY};
pub use error::{CodemodError, PreconditionError, Result};
pub use session::{
    ApplyReport, ArtifactSummary, CodemodSession, DiffSummary, ExportReport, RepositorySummary,
    SessionId, Suggestion,
};
pub use state::{validate_transition, SessionState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a codemod session
    pub use crate::{
        ApplyReport, CodemodConfig, CodemodError, CodemodSession, ControlSurface, DiffSummary,
        SessionState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

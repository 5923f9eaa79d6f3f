//! Session state machine
//!
//! ```text
//! Empty ──load both──▶ Loaded ──generate──▶ Previewed ──apply──▶ Applied
//!                        ▲                      │  ▲                 │
//!                        └────── reload ────────┘  └─── generate ────┘
//! ```
//!
//! Export never changes state.

use crate::error::PreconditionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a codemod session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Repository or artifact (or both) missing
    Empty,
    /// Both inputs present, no diff batch
    Loaded,
    /// Diff batch cached
    Previewed,
    /// Modified snapshot committed
    Applied,
}

impl SessionState {
    /// States reachable in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [SessionState] {
        use SessionState::{Applied, Empty, Loaded, Previewed};
        match self {
            Empty => &[Empty, Loaded],
            Loaded => &[Loaded, Previewed],
            Previewed => &[Loaded, Previewed, Applied],
            Applied => &[Loaded, Previewed, Applied],
        }
    }

    /// Whether a one-step move to `to` is legal
    #[inline]
    #[must_use]
    pub fn can_transition(self, to: SessionState) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Whether both inputs are present
    #[inline]
    #[must_use]
    pub fn is_loaded(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Loaded => "loaded",
            Self::Previewed => "previewed",
            Self::Applied => "applied",
        };
        f.write_str(name)
    }
}

/// Validate a state transition
///
/// # Errors
/// Returns [`PreconditionError::IllegalTransition`] if `to` is not reachable from `from`
pub fn validate_transition(from: SessionState, to: SessionState) -> Result<(), PreconditionError> {
    if from.can_transition(to) {
        Ok(())
    } else {
        Err(PreconditionError::IllegalTransition { from, to })
    }
}

//! Workflow state: the read-only projection the presentation layer renders.
//!
//! ```text
//!            FileSelected(rejected)
//!   Idle ──────────────────────────────► Failed
//!    │  FileSelected(accepted)             ▲
//!    ▼                                     │ engine error / timeout
//!  Validating ──► Loading ─────────────────┤
//!                    │ engine ok
//!                    ▼
//!                  Ready
//! ```
//!
//! Any phase except `Loading` accepts a new selection. `Validating` never
//! survives a transition; it exists so a slower validator has a place to
//! suspend.

use crate::engine::DocumentHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Loading,
    Ready,
    Failed,
}

impl Phase {
    /// Whether the upload control takes a new selection in this phase.
    pub fn accepts_selection(self) -> bool {
        !matches!(self, Phase::Validating | Phase::Loading)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Identifies one accepted upload; completions for any other ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The upload currently holding the single upload slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlight {
    pub ticket: LoadTicket,
    pub name: String,
}

/// Session-long workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    /// Set exactly while `phase == Loading`.
    pub in_flight: Option<InFlight>,
    /// The most recently loaded document, if any.
    pub document: Option<DocumentHandle>,
}

impl WorkflowState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn upload_enabled(&self) -> bool {
        self.phase.accepts_selection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle_and_empty() {
        let s = WorkflowState::default();
        assert_eq!(s.phase, Phase::Idle);
        assert!(s.error_message.is_none());
        assert!(s.success_message.is_none());
        assert!(s.upload_enabled());
    }

    #[test]
    fn only_loading_and_validating_block_selection() {
        assert!(Phase::Idle.accepts_selection());
        assert!(Phase::Ready.accepts_selection());
        assert!(Phase::Failed.accepts_selection());
        assert!(!Phase::Loading.accepts_selection());
        assert!(!Phase::Validating.accepts_selection());
    }

    #[test]
    fn phase_serialises_snake_case() {
        let json = serde_json::to_string(&Phase::Loading).unwrap();
        assert_eq!(json, "\"loading\"");
    }
}

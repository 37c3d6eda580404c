//! Observer trait for intake workflow events.
//!
//! Inject an [`Arc<dyn IntakeObserver>`] via
//! [`crate::controller::IntakeController::with_observer`] to hear about phase
//! changes and load results as they happen. The terminal front end uses this
//! to drive its spinner; tests use it to count events.
//!
//! # Example
//!
//! ```rust
//! use pdfedit_intake::{IntakeObserver, Phase};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl IntakeObserver for Counter {
//!     fn on_phase_change(&self, _from: Phase, _to: Phase) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::engine::DocumentHandle;
use crate::state::Phase;
use std::sync::Arc;

/// Called by the controller as the workflow moves.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Callbacks run on the controller's task, between
/// events, never in the middle of a transition.
pub trait IntakeObserver: Send + Sync {
    /// Called for every phase change, including the instantaneous
    /// `Idle -> Validating`.
    fn on_phase_change(&self, from: Phase, to: Phase) {
        let _ = (from, to);
    }

    /// Called when an accepted file is handed to the engine.
    fn on_load_start(&self, name: &str, size_bytes: u64) {
        let _ = (name, size_bytes);
    }

    /// Called when the engine reports success.
    fn on_load_complete(&self, document: &DocumentHandle) {
        let _ = document;
    }

    /// Called when a file selection is refused because a load is in flight.
    fn on_selection_ignored(&self, name: &str) {
        let _ = name;
    }

    /// Called whenever an error message is raised (rejection, engine error,
    /// timeout).
    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op observer, the default when none is configured.
pub struct NoopObserver;

impl IntakeObserver for NoopObserver {}

/// Convenience alias for the type the controller stores.
pub type SharedObserver = Arc<dyn IntakeObserver>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_observer_does_not_panic() {
        let o: SharedObserver = Arc::new(NoopObserver);
        o.on_phase_change(Phase::Idle, Phase::Validating);
        o.on_load_start("a.pdf", 10);
        o.on_load_complete(&DocumentHandle {
            name: "a.pdf".into(),
            size_bytes: 10,
            pdf_version: None,
        });
        o.on_selection_ignored("b.pdf");
        o.on_error("boom");
    }
}

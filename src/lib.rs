//! # pdfedit-intake
//!
//! The upload intake workflow of a PDF editor: take the file a user picked,
//! validate it, hand it to a document engine, and keep a single
//! [`WorkflowState`] that the interface renders.
//!
//! ## Workflow Overview
//!
//! ```text
//! file picker
//!  │  UiEvent::FileSelected
//!  ├─ 1. Validate  declared MIME type == application/pdf, size <= 50 MiB
//!  ├─ 2. Load      DocumentEngine::load, raced against the load timeout
//!  └─ 3. Settle    Ready + "Successfully loaded {name}", or Failed + message
//! ```
//!
//! Only one file is in flight at a time: while the workflow is `Loading`, new
//! selections are ignored. Every error is a dismissible message; none is
//! fatal to the session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfedit_intake::{CandidateFile, IntakeConfig, IntakeController, PlaceholderEngine, UiEvent};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut controller = IntakeController::new(Arc::new(PlaceholderEngine), IntakeConfig::default());
//!     let file = CandidateFile::from_path("document.pdf")?;
//!     controller.dispatch(UiEvent::FileSelected(Some(file)));
//!     let state = controller.settle().await;
//!     println!("{:?}", state.success_message);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfedit` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod file;
pub mod machine;
pub mod observer;
pub mod state;
pub mod validate;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{IntakeConfig, IntakeConfigBuilder, MAX_FILE_SIZE_BYTES, PDF_MIME_TYPE};
pub use controller::IntakeController;
pub use engine::{DocumentEngine, DocumentHandle, HeaderCheckEngine, LoadFuture, PlaceholderEngine};
pub use error::{EngineError, IntakeError, Rejection};
pub use file::{CandidateFile, FileSource};
pub use machine::{Effect, IntakeEvent, IntakeMachine, Outcome, Transition, UiEvent};
pub use observer::{IntakeObserver, NoopObserver, SharedObserver};
pub use state::{LoadTicket, Phase, WorkflowState};
pub use validate::{validate, validate_with, ValidationResult};
pub use view::{Alert, AlertKind, ViewModel, Workspace};

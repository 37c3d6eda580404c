//! Error types for the pdfedit-intake library.
//!
//! Three error types reflect three distinct failure sources:
//!
//! * [`Rejection`] — the validator refused the candidate file (wrong declared
//!   type, too large). Recoverable: the user simply selects another file.
//!
//! * [`EngineError`] — the document engine could not load an accepted file.
//!   Also recoverable; the workflow returns to an interactive state.
//!
//! * [`IntakeError`] — everything a caller of the library can get back as
//!   `Err`: the two above, a load timeout, unreadable input, bad config.
//!
//! The `Display` text of [`Rejection`] is the exact message shown in the UI,
//! so changing it is a breaking change for the presentation contract.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// One mebibyte, the unit the size-limit message is rendered in.
pub const MIB: u64 = 1024 * 1024;

/// Why the validator refused a candidate file.
///
/// Only the first failing rule is reported; rejections never accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum Rejection {
    /// Declared MIME type is not `application/pdf`.
    #[error("Please upload a valid PDF file.")]
    InvalidType { declared: String },

    /// File is larger than the configured limit.
    #[error("File size exceeds {}MB limit.", .limit_bytes / MIB)]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
}

impl Rejection {
    /// The message shown in the error alert.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// A failure reported by a [`crate::engine::DocumentEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum EngineError {
    /// Content does not start with the `%PDF` magic bytes.
    #[error("not a PDF document (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The file has no content at all.
    #[error("file is empty")]
    Empty,

    /// The candidate only carries metadata; there is nothing to read.
    #[error("no file content available")]
    NoContent,

    /// Reading the file content failed.
    #[error("could not read file: {detail}")]
    Unreadable { detail: String },

    /// Unexpected engine-side failure (e.g. a worker task panicked).
    #[error("internal engine error: {0}")]
    Internal(String),
}

/// All errors returned by the pdfedit-intake library.
#[derive(Debug, Error)]
pub enum IntakeError {
    // ── Workflow errors ───────────────────────────────────────────────────
    /// The validator rejected the file.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The document engine failed to load `name`.
    #[error("Could not load {name}: {source}")]
    Engine {
        name: String,
        #[source]
        source: EngineError,
    },

    /// The engine did not finish within the configured load timeout.
    #[error("Loading timed out after {after:?}.")]
    LoadTimeout { after: Duration },

    // ── Input errors ──────────────────────────────────────────────────────
    /// A file selected from disk could not be inspected.
    #[error("Cannot open '{path}': {detail}")]
    Unreadable { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_are_exact() {
        let invalid = Rejection::InvalidType {
            declared: "image/png".into(),
        };
        assert_eq!(invalid.user_message(), "Please upload a valid PDF file.");

        let large = Rejection::TooLarge {
            size_bytes: 60_000_000,
            limit_bytes: 50 * MIB,
        };
        assert_eq!(large.user_message(), "File size exceeds 50MB limit.");
    }

    #[test]
    fn too_large_renders_configured_limit() {
        let e = Rejection::TooLarge {
            size_bytes: 11 * MIB,
            limit_bytes: 10 * MIB,
        };
        assert_eq!(e.to_string(), "File size exceeds 10MB limit.");
    }

    #[test]
    fn rejected_is_transparent() {
        let e: IntakeError = Rejection::InvalidType {
            declared: "text/plain".into(),
        }
        .into();
        assert_eq!(e.to_string(), "Please upload a valid PDF file.");
    }

    #[test]
    fn engine_error_display() {
        let e = IntakeError::Engine {
            name: "report.pdf".into(),
            source: EngineError::NotAPdf {
                magic: b"GIF8".to_vec(),
            },
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Could not load report.pdf:"), "got: {msg}");
        assert!(msg.contains("not a PDF"), "got: {msg}");
    }

    #[test]
    fn load_timeout_display() {
        let e = IntakeError::LoadTimeout {
            after: Duration::from_secs(60),
        };
        assert_eq!(e.to_string(), "Loading timed out after 60s.");
        let e = IntakeError::LoadTimeout {
            after: Duration::from_millis(250),
        };
        assert_eq!(e.to_string(), "Loading timed out after 250ms.");
    }
}

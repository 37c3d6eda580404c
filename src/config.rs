//! Configuration for the upload intake workflow.
//!
//! All intake behaviour is controlled through [`IntakeConfig`], built via its
//! [`IntakeConfigBuilder`]. The defaults reproduce the editor's published
//! upload contract: `application/pdf` only, at most 50 MiB, `.pdf` picker
//! filter.

use crate::error::{IntakeError, MIB};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The only MIME type the validator accepts.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Default upload size limit: 50 MiB (50 × 1024 × 1024 bytes).
pub const MAX_FILE_SIZE_BYTES: u64 = 50 * MIB;

/// Extension filter advertised to the file picker.
pub const ACCEPT_FILTER: &str = ".pdf";

/// Configuration for the intake workflow.
///
/// Built via [`IntakeConfig::builder()`] or using [`IntakeConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfedit_intake::IntakeConfig;
/// use std::time::Duration;
///
/// let config = IntakeConfig::builder()
///     .load_timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert_eq!(config.max_file_size_bytes, 52_428_800);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Largest accepted upload in bytes. Default: 52 428 800 (50 MiB).
    ///
    /// Must be a whole number of MiB; the `TooLarge` message and the upload
    /// hint render it in MiB.
    pub max_file_size_bytes: u64,

    /// How long an accepted file may stay in `Loading`. Default: 60 s.
    ///
    /// `None` waits for the engine indefinitely. On expiry the workflow moves
    /// to `Failed` with a timeout message.
    pub load_timeout: Option<Duration>,

    /// Advisory extension filter for the file picker. Default: `.pdf`.
    ///
    /// Never used for validation; only the declared MIME type and size are.
    pub accept_filter: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            load_timeout: Some(Duration::from_secs(60)),
            accept_filter: ACCEPT_FILTER.to_string(),
        }
    }
}

impl IntakeConfig {
    /// Create a new builder for `IntakeConfig`.
    pub fn builder() -> IntakeConfigBuilder {
        IntakeConfigBuilder {
            config: Self::default(),
        }
    }

    /// Upload hint shown under the picker, e.g. `"PDF files only (max 50MB)"`.
    pub fn upload_hint(&self) -> String {
        format!("PDF files only (max {}MB)", self.max_file_size_bytes / MIB)
    }
}

/// Builder for [`IntakeConfig`].
#[derive(Debug)]
pub struct IntakeConfigBuilder {
    config: IntakeConfig,
}

impl IntakeConfigBuilder {
    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_size_bytes = bytes;
        self
    }

    pub fn max_file_size_mib(mut self, mib: u64) -> Self {
        self.config.max_file_size_bytes = mib.saturating_mul(MIB);
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.config.load_timeout = Some(timeout);
        self
    }

    /// Set the load timeout in seconds; `0` disables it.
    pub fn load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.load_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn no_load_timeout(mut self) -> Self {
        self.config.load_timeout = None;
        self
    }

    pub fn accept_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.accept_filter = filter.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<IntakeConfig, IntakeError> {
        let c = &self.config;
        if c.max_file_size_bytes == 0 || c.max_file_size_bytes % MIB != 0 {
            return Err(IntakeError::InvalidConfig(format!(
                "Maximum file size must be a non-zero multiple of 1 MiB (got {} bytes)",
                c.max_file_size_bytes
            )));
        }
        if c.load_timeout.is_some_and(|t| t.is_zero()) {
            return Err(IntakeError::InvalidConfig(
                "Load timeout must be non-zero (use no_load_timeout to disable)".into(),
            ));
        }
        Ok(self.config)
    }
}

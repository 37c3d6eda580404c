//! The validator: classify a candidate file as accepted or rejected.
//!
//! Validation is an ordered list of pure checks. Each check either passes
//! (`None`) or names a [`Rejection`]; the first rejection wins and later
//! checks are not evaluated. Nothing here reads file content or has side
//! effects, so the same candidate always gets the same answer.
//!
//! | # | Check | Rejection |
//! |---|-------|-----------|
//! | 1 | declared MIME type is `application/pdf` | `InvalidType` |
//! | 2 | `size_bytes <= max_file_size_bytes`      | `TooLarge` |

use crate::config::{IntakeConfig, PDF_MIME_TYPE};
use crate::error::Rejection;
use crate::file::CandidateFile;

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    Rejected(Rejection),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }
}

type Check = fn(&CandidateFile, &IntakeConfig) -> Option<Rejection>;

/// Checks in evaluation order.
const CHECKS: &[Check] = &[check_type, check_size];

fn check_type(file: &CandidateFile, _config: &IntakeConfig) -> Option<Rejection> {
    (file.mime_type != PDF_MIME_TYPE).then(|| Rejection::InvalidType {
        declared: file.mime_type.clone(),
    })
}

fn check_size(file: &CandidateFile, config: &IntakeConfig) -> Option<Rejection> {
    (file.size_bytes > config.max_file_size_bytes).then(|| Rejection::TooLarge {
        size_bytes: file.size_bytes,
        limit_bytes: config.max_file_size_bytes,
    })
}

/// Validate against the default limits.
pub fn validate(file: &CandidateFile) -> ValidationResult {
    validate_with(file, &IntakeConfig::default())
}

/// Validate against `config`.
pub fn validate_with(file: &CandidateFile, config: &IntakeConfig) -> ValidationResult {
    CHECKS
        .iter()
        .find_map(|check| check(file, config))
        .map_or(ValidationResult::Accepted, ValidationResult::Rejected)
}

//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not in the
//! template logic itself. Logic errors are `DomainError` from `crate::domain`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A template document could not be serialized.
    #[error("Failed to encode {format} document: {reason}")]
    EncodingFailed { format: String, reason: String },

    /// A document could not be parsed.
    #[error("Failed to parse {format} document{}: {reason}", source_suffix(.path))]
    DecodingFailed {
        format: String,
        path: Option<PathBuf>,
        reason: String,
    },

    /// The content generation service failed or answered unusably.
    #[error("Content generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// One or more output files could not be written.
    #[error("{} file(s) could not be written", .failures.len())]
    WriteFailures { failures: Vec<WriteFailure> },

    /// Shared state access failed (lock poisoned).
    #[error("Internal store lock poisoned")]
    StoreLockError,
}

fn source_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" '{}'", p.display()))
        .unwrap_or_default()
}

/// A single file the materializer failed to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::DecodingFailed { .. } => vec![
                "Check the document for syntax errors".into(),
                "The root of a document must be a mapping".into(),
            ],
            Self::GenerationFailed { .. } => vec![
                "Check that the generation server is running (--endpoint or VLLM_SERVER_URL)".into(),
                "Verify the API key and model name".into(),
                "Increase --timeout for slow models".into(),
            ],
            Self::WriteFailures { failures } => {
                let mut hints: Vec<String> = failures
                    .iter()
                    .take(3)
                    .map(|f| format!("Could not write {}", f))
                    .collect();
                hints.push("Check permissions on the output directory (-o)".into());
                hints
            }
            Self::StoreLockError => vec!["Try again in a moment".into()],
            Self::EncodingFailed { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::WriteFailures { .. } => ErrorCategory::Io,
            Self::DecodingFailed { .. } => ErrorCategory::Validation,
            Self::GenerationFailed { .. } => ErrorCategory::External,
            Self::EncodingFailed { .. } | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}

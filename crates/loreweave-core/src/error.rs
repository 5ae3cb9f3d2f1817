//! Unified error handling for Loreweave Core.
//!
//! Domain and application errors meet here so callers handle a single type
//! that still knows its suggestions and category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Loreweave Core operations.
#[derive(Debug, Error, Clone)]
pub enum LoreError {
    /// Errors from the domain layer (bad source, bad formats, cycles).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (I/O, codecs, generation).
    #[error("{0}")]
    Application(#[from] ApplicationError),
}

impl LoreError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Schema => ErrorCategory::Schema,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Schema,
    NotFound,
    Io,
    External,
    Internal,
}

/// Convenient result type alias.
pub type LoreResult<T> = Result<T, LoreError>;

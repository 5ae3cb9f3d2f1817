// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (services collect and report them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    #[error("{}", parse_message(.message, .line, .column, .model.as_deref()))]
    Parse {
        message: String,
        line: usize,
        column: usize,
        model: Option<String>,
    },

    #[error("Failed to read model source '{path}': {reason}")]
    SourceUnreadable { path: String, reason: String },

    // ========================================================================
    // Format Errors
    // ========================================================================
    #[error("Unsupported format '{format}' (supported: {})", .supported.join(", "))]
    UnsupportedFormat {
        format: String,
        supported: Vec<&'static str>,
    },

    // ========================================================================
    // Inheritance Errors
    // ========================================================================
    #[error("Inheritance cycle detected: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    #[error("Model '{name}' is not defined in the source")]
    UnknownModel { name: String },
}

fn parse_message(message: &str, line: &usize, column: &usize, model: Option<&str>) -> String {
    match model {
        Some(model) => format!("Parse error at {line}:{column} in model '{model}': {message}"),
        None => format!("Parse error at {line}:{column}: {message}"),
    }
}

impl DomainError {
    /// Shorthand for a parse error outside any model.
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
            model: None,
        }
    }

    /// Attach the enclosing model name to a parse error.
    pub fn in_model(self, name: &str) -> Self {
        match self {
            Self::Parse {
                message,
                line,
                column,
                model: None,
            } => Self::Parse {
                message,
                line,
                column,
                model: Some(name.to_string()),
            },
            other => other,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Parse { line, .. } => vec![
                format!("Check the model source around line {}", line),
                "Class headers must look like `class Name(Base):`".into(),
                "Every string and bracket must be closed".into(),
            ],
            Self::SourceUnreadable { path, .. } => vec![
                format!("Check that '{}' exists and is readable", path),
            ],
            Self::UnsupportedFormat { supported, .. } => vec![
                format!("Use one of: {}", supported.join(", ")),
            ],
            Self::InheritanceCycle { chain } => vec![
                format!("Break the cycle: {}", chain.join(" -> ")),
                "A model must not inherit from itself, directly or indirectly".into(),
            ],
            Self::UnknownModel { name } => vec![
                format!("No class named '{}' was found", name),
                "Try: loreweave inspect <INPUT> to list the models".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse { .. } | Self::UnsupportedFormat { .. } => ErrorCategory::Validation,
            Self::InheritanceCycle { .. } => ErrorCategory::Schema,
            Self::SourceUnreadable { .. } | Self::UnknownModel { .. } => ErrorCategory::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Schema,
    NotFound,
}

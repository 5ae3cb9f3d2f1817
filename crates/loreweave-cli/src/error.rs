//! CLI-level errors.
//!
//! Core failures pass through untouched; the CLI only adds its own config,
//! I/O and batch-conversion failures, then decides how each one is shown
//! and which exit status it produces.

use std::error::Error;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use loreweave_core::error::LoreError;

pub use loreweave_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be read, parsed or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Core(#[from] LoreError),

    /// A batch conversion finished with per-file failures.
    #[error("{failed} of {total} document(s) could not be converted")]
    ConversionIncomplete { failed: usize, total: usize },

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Hints printed under the error message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Print the config location with 'loreweave config path'".into(),
                "Use 'loreweave init --force' to recreate a default config".into(),
            ],
            Self::Core(core_err) => core_err.suggestions(),
            Self::ConversionIncomplete { .. } => vec![
                "The files listed above were not converted".into(),
                "Each document must be valid YAML with a mapping at the root".into(),
            ],
            Self::IoError { message, .. } => vec![
                format!("Could not complete: {}", message),
                "Make sure the target directory exists and is writable".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Schema => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Io | CoreCategory::External | CoreCategory::Internal => {
                    ErrorCategory::Internal
                }
            },
            Self::ConversionIncomplete { .. } => ErrorCategory::UserError,
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Process exit status; see [`ErrorCategory::exit_code`].
    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }

    /// Chain of underlying causes, outermost first, excluding `self`.
    fn causes(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        std::iter::successors(self.source(), |&err| err.source())
    }

    /// Terminal rendering with ANSI styling.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut out = format!(
            "\n{} {}\n  {}\n",
            "✗".red().bold(),
            "Error:".red().bold(),
            self.to_string().red()
        );
        if verbose {
            for cause in self.causes() {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    "caused by".dimmed(),
                    cause.to_string().dimmed()
                );
            }
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(out, "\n{}", "Suggestions:".yellow().bold());
            for hint in &suggestions {
                let _ = writeln!(out, "  {hint}");
            }
        }
        if !verbose {
            let hint = "Run again with -v / --verbose for the cause chain.";
            let _ = writeln!(out, "\n{}", hint.dimmed());
        }
        out
    }

    /// Same layout as [`Self::format_colored`] without escape codes, for pipes
    /// and `--no-color`.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = format!("\nError: {self}\n");
        if verbose {
            for cause in self.causes() {
                let _ = writeln!(out, "  Caused by: {cause}");
            }
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for hint in &suggestions {
                let _ = writeln!(out, "  {hint}");
            }
        }
        if !verbose {
            out.push_str("\nRun again with -v / --verbose for the cause chain.\n");
        }
        out
    }

    /// Record the failure in the log before it is printed.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(category = ?self.category(), "{self}");
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(category = ?self.category(), "{self}");
            }
        }
        for cause in self.causes() {
            tracing::debug!("caused by: {cause}");
        }
    }
}

/// How a failure is presented and which status the process exits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

impl ErrorCategory {
    /// `2` bad input or schema, `3` missing input, `4` config, `1` everything else.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::UserError => 2,
            Self::NotFound => 3,
            Self::Configuration => 4,
            Self::Internal => 1,
        }
    }
}

/// Wrap an `io::Error` as [`CliError::IoError`] with a message built on
/// failure only.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

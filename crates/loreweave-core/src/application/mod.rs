//! Application layer for Loreweave.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (TemplateService, ContentService, ConvertService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! template logic itself. Extraction and synthesis live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ContentService, ConvertOptions, ConvertReport, ConvertService, MaterializeReport,
    ModelSummary, TemplateService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{ContentGenerator, DocumentCodec, Filesystem, GenerationRequest};

pub use error::{ApplicationError, WriteFailure};

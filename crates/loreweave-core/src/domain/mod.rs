// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Loreweave.
//!
//! Pure logic over in-memory values: source text goes in, template
//! documents and paths come out. Reading and writing files, encoding
//! documents and calling a generation service all happen behind ports in
//! the application layer.
//!
//! ## Pipeline
//!
//! ```text
//! source ──extract──▶ SchemaSet ──flatten──▶ fields ──synthesize──▶ TemplateMap
//!                                                                     │
//!                                              OutputLayout ◀─────────┘
//! ```
//!
//! - **No I/O**: no filesystem, network, or process access
//! - **No async**: everything is synchronous
//! - **Deterministic**: ordered maps throughout, so equal input gives equal output

pub mod document;
pub mod error;
pub mod extractor;
pub mod inheritance;
pub mod layout;
pub mod schema;
pub mod synthesis;

pub use document::{TemplateMap, TemplateValue};
pub use error::{DomainError, ErrorCategory};
pub use extractor::{Extraction, SchemaExtractor, SkippedField};
pub use inheritance::{InheritanceResolver, MAX_INHERITANCE_DEPTH};
pub use layout::{ConvertFormat, OutputLayout, TemplateFormat, parse_formats};
pub use schema::{DefaultValue, FieldSchema, Literal, ModelSchema, SchemaSet, TypeDescriptor};
pub use synthesis::{DESCRIPTION_KEY, ProcessingMode, TemplateSynthesizer, placeholder};

//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate templates" or "fill a template".

pub mod content_service;
pub mod convert_service;
pub mod template_service;

pub use content_service::ContentService;
pub use convert_service::{ConvertFailure, ConvertOptions, ConvertReport, ConvertService};
pub use template_service::{MaterializeReport, ModeTemplates, ModelSummary, TemplateService};

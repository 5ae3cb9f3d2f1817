//! Loreweave Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Loreweave
//! template synthesizer, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          loreweave-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (TemplateService, ContentService, ...)  │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, DocumentCodec, Generator)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     loreweave-adapters (Infrastructure) │
//! │ (LocalFilesystem, SerdeCodec, OpenAi..) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (SchemaExtractor, Resolver, Synthesizer)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loreweave_core::prelude::*;
//!
//! # fn run(filesystem: Box<dyn Filesystem>, codec: Box<dyn DocumentCodec>) -> LoreResult<()> {
//! let service = TemplateService::new(filesystem, codec);
//! let layout = OutputLayout::for_source("lore/templates", "lorecore.py".as_ref());
//! let report = service.materialize("lorecore.py".as_ref(), &layout, &TemplateFormat::ALL)?;
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ContentService, ConvertOptions, ConvertService, MaterializeReport, TemplateService,
        ports::{ContentGenerator, DocumentCodec, Filesystem, GenerationRequest},
    };
    pub use crate::domain::{
        ConvertFormat, OutputLayout, ProcessingMode, SchemaExtractor, TemplateFormat,
        TemplateMap, TemplateValue,
    };
    pub use crate::error::{LoreError, LoreResult};
}

//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `loreweave-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `DocumentCodec`: YAML/JSON encoding of template documents
//!   - `ContentGenerator`: The content-fill collaborator
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{ContentGenerator, DocumentCodec, Filesystem, GenerationRequest};

#[cfg(test)]
pub use output::MockContentGenerator;

//! Infrastructure adapters for Loreweave.
//!
//! This crate implements the ports defined in `loreweave-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod codec;
pub mod filesystem;
pub mod generator;

// Re-export commonly used adapters
pub use codec::SerdeCodec;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use generator::{CannedGenerator, GeneratorConfig, OpenAiGenerator};

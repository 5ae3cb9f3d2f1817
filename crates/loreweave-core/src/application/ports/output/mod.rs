//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `loreweave-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{TemplateFormat, TemplateMap};
use crate::error::LoreResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `loreweave_adapters::filesystem::LocalFilesystem` (production)
/// - `loreweave_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> LoreResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> LoreResult<()>;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> LoreResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// All regular files below `root`, recursively, sorted by path.
    fn list_files(&self, root: &Path) -> LoreResult<Vec<PathBuf>>;
}

/// Port for serializing template documents.
///
/// Encoding must be deterministic: the same document always yields the
/// same bytes, keys in insertion order.
pub trait DocumentCodec: Send + Sync {
    fn encode(&self, document: &TemplateMap, format: TemplateFormat) -> LoreResult<String>;

    fn decode(&self, text: &str, format: TemplateFormat) -> LoreResult<TemplateMap>;
}

/// One content-fill request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Instructions, with the template embedded.
    pub system: String,
    /// The user's free-text prompt.
    pub prompt: String,
}

/// Port for the external text-generation service.
///
/// Implemented by:
/// - `loreweave_adapters::generator::OpenAiGenerator` (OpenAI-compatible HTTP API)
/// - `loreweave_adapters::generator::CannedGenerator` (fixed responses, testing)
#[cfg_attr(test, mockall::automock)]
pub trait ContentGenerator: Send + Sync {
    /// Send one request and return the raw completion text.
    fn generate(&self, request: &GenerationRequest) -> LoreResult<String>;
}

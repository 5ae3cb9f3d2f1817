//! Filesystem adapters: `LocalFilesystem` for real runs, `MemoryFilesystem`
//! for tests and dry runs.

mod local;
mod memory;

pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;

//! Infrastructure adapters for backforge.
//!
//! This crate implements the ports defined in
//! `backforge_core::application::ports`. It contains all I/O.

pub mod catalog;
pub mod filesystem;
pub mod renderer;

// Re-export commonly used adapters
pub use catalog::{BuiltinCatalog, OverlayCatalog, TEMPLATES_DIR_ENV, default_catalog};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::SimpleRenderer;

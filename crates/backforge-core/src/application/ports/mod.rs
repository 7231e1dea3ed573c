//! Application ports (traits) for external dependencies.
//!
//! - **Driven (output) ports**: called by the application, implemented by
//!   infrastructure
//!   - `Filesystem`: file operations
//!   - `TemplateCatalog`: template lookup
//!   - `TemplateRenderer`: template rendering
//!
//! - **Driving (input) ports**: the services themselves, called by the CLI

pub mod output;

#[cfg(test)]
pub use output::MockFilesystem;
pub use output::{Filesystem, TemplateCatalog, TemplateRenderer};

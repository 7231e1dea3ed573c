//! Scaffolding domain.
//!
//! Pure model of a generated backend project: the options it is made of, the
//! capability tables behind those options, the blueprint derived from them
//! and the templates that turn a blueprint into files.
//!
//! ## Boundaries
//!
//! - **No I/O**: files are produced as a `ProjectStructure` and written by
//!   the application layer through its `Filesystem` port
//! - **No logging**: nothing here imports `tracing`
//! - **Synchronous and deterministic** apart from the `YEAR` variable

pub mod capabilities;
pub mod entities;
pub mod error;
pub mod naming;
pub mod value_objects;

pub use entities::{
    Blueprint, ComponentKind, ComponentName, ComponentSpec, FileToWrite, FsEntry, Inclusion,
    Manifest, MiddlewareUnit, Permissions, ProjectConfig, ProjectConfigBuilder, ProjectFile,
    ProjectStructure, RelativePath, RenderContext, TemplateFile, TemplateSource,
};
pub use entities::manifests;
pub use error::{DomainError, ErrorCategory};
pub use value_objects::{AuthStrategy, Database, Feature, Framework, Language, LockBackend, Queue};

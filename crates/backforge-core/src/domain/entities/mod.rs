pub mod blueprint;
pub mod common;
pub mod component;
pub mod manifests;
pub mod project_config;
pub mod project_structure;
pub mod template;

pub use blueprint::{Blueprint, MiddlewareUnit};
pub use common::{Permissions, RelativePath};
pub use component::{ComponentKind, ComponentName, ComponentSpec};
pub use manifests::{Manifest, ProjectFile};
pub use project_config::{ProjectConfig, ProjectConfigBuilder};
pub use project_structure::{FileToWrite, FsEntry, ProjectStructure};
pub use template::{Inclusion, RenderContext, TemplateFile, TemplateSource};

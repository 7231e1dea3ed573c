//! Driven (output) ports, implemented by `backforge-adapters`.

use std::path::{Path, PathBuf};

use crate::domain::{ComponentKind, ProjectStructure, RenderContext, TemplateFile, TemplateSource};
use crate::error::ForgeResult;

/// Filesystem operations.
///
/// Implemented by:
/// - `backforge_adapters::LocalFilesystem` (production)
/// - `backforge_adapters::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()>;

    fn write_file(&self, path: &Path, content: &str) -> ForgeResult<()>;

    fn read_to_string(&self, path: &Path) -> ForgeResult<String>;

    fn set_permissions(&self, path: &Path, executable: bool) -> ForgeResult<()>;

    fn remove_file(&self, path: &Path) -> ForgeResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()>;

    /// Every file below `root`, recursively, as full paths.
    fn list_files(&self, root: &Path) -> ForgeResult<Vec<PathBuf>>;
}

/// Where template text comes from.
///
/// Implemented by:
/// - `backforge_adapters::BuiltinCatalog` (compiled-in templates)
/// - `backforge_adapters::OverlayCatalog` (a directory layered over another catalog)
pub trait TemplateCatalog: Send + Sync {
    /// Every project file template; callers filter by `TemplateFile::applies_to`.
    fn project_templates(&self) -> ForgeResult<Vec<TemplateFile>>;

    /// Body of the file generated by `backforge add <kind>`.
    fn component_template(&self, kind: ComponentKind) -> ForgeResult<TemplateSource>;
}

/// Turns templates into concrete files.
pub trait TemplateRenderer: Send + Sync {
    /// Render `templates` into a structure rooted at `output_root`. Files whose
    /// rendered body is blank are left out.
    fn render(
        &self,
        templates: &[TemplateFile],
        context: &RenderContext,
        output_root: &Path,
    ) -> ForgeResult<ProjectStructure>;

    fn render_text(&self, body: &str, context: &RenderContext) -> ForgeResult<String>;
}

//! Scaffold service: generates a new project.
//!
//! 1. Validate the project config and derive its blueprint
//! 2. Render every applicable template and add the manifests
//! 3. Write to the filesystem, removing the partial tree on failure

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateCatalog, TemplateRenderer},
    },
    domain::{
        Blueprint, Permissions, ProjectConfig, ProjectStructure, RelativePath, RenderContext,
        TemplateFile, manifests,
    },
    error::{ForgeError, ForgeResult},
};

/// What to do when the output directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    CreateNew,
    /// Delete the existing directory first.
    Overwrite,
}

/// Summary of a generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub root: PathBuf,
    pub files: Vec<String>,
    pub bytes: usize,
    pub middlewares: Vec<&'static str>,
    pub routes: usize,
}

impl ScaffoldReport {
    fn new(structure: &ProjectStructure, blueprint: &Blueprint) -> Self {
        Self {
            root: structure.root().to_path_buf(),
            files: structure.files().map(|f| f.path.to_slash_string()).collect(),
            bytes: structure.total_bytes(),
            middlewares: blueprint.middlewares().iter().map(|m| m.name).collect(),
            routes: blueprint.routes().routes().len(),
        }
    }
}

pub struct ScaffoldService {
    catalog: Box<dyn TemplateCatalog>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl ScaffoldService {
    pub fn new(
        catalog: Box<dyn TemplateCatalog>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            catalog,
            renderer,
            filesystem,
        }
    }

    /// Render the project without writing anything (dry run).
    #[instrument(skip_all, fields(project = %config.name(), output = %output.display()))]
    pub fn plan(&self, config: &ProjectConfig, output: &Path) -> ForgeResult<ProjectStructure> {
        config.validate()?;
        let blueprint = Blueprint::derive(config);
        let ctx = RenderContext::for_project(config);

        let templates: Vec<TemplateFile> = self
            .catalog
            .project_templates()?
            .into_iter()
            .filter(|t| t.applies_to(config))
            .collect();
        debug!(templates = templates.len(), "templates selected");

        let mut structure = self.renderer.render(&templates, &ctx, output)?;
        for manifest in manifests::manifests(config, &blueprint, &ctx, crate::VERSION)? {
            let path = RelativePath::try_new(&manifest.path)?;
            structure.add_file(path, manifest.content, Permissions::ReadWrite);
        }

        structure.validate()?;
        debug!(
            files = structure.entry_count(),
            bytes = structure.total_bytes(),
            "project planned"
        );
        Ok(structure)
    }

    /// Generate the project described by `config` into `output`.
    #[instrument(skip_all, fields(project = %config.name(), output = %output.display()))]
    pub fn scaffold(
        &self,
        config: &ProjectConfig,
        output: &Path,
        mode: WriteMode,
    ) -> ForgeResult<ScaffoldReport> {
        info!(%config, "scaffolding project");

        let structure = self.plan(config, output)?;

        if self.filesystem.exists(output) {
            match mode {
                WriteMode::CreateNew => {
                    return Err(ApplicationError::ProjectExists {
                        path: output.to_path_buf(),
                    }
                    .into());
                }
                WriteMode::Overwrite => {
                    warn!("removing existing directory before writing");
                    self.filesystem.remove_dir_all(output)?;
                }
            }
        }

        self.write_structure(&structure)?;

        let report = ScaffoldReport::new(&structure, &Blueprint::derive(config));
        info!(files = report.files.len(), "scaffold completed");
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn write_structure(&self, structure: &ProjectStructure) -> ForgeResult<()> {
        match self.write_all(structure) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "write failed, attempting rollback");
                self.rollback(structure.root(), e)
            }
        }
    }

    fn write_all(&self, structure: &ProjectStructure) -> ForgeResult<()> {
        let root = structure.root();
        self.filesystem.create_dir_all(root)?;

        for dir in structure.directories() {
            self.filesystem.create_dir_all(&root.join(dir))?;
        }

        for file in structure.files() {
            let path = root.join(file.path.as_path());
            self.filesystem.write_file(&path, &file.content)?;
            if file.permissions.is_executable() {
                self.filesystem.set_permissions(&path, true)?;
            }
        }
        Ok(())
    }

    /// Best-effort cleanup; always returns an error.
    fn rollback(&self, root: &Path, cause: ForgeError) -> ForgeResult<()> {
        match self.filesystem.remove_dir_all(root) {
            Ok(()) => {
                info!(path = %root.display(), "rollback successful");
                Err(cause)
            }
            Err(e) => {
                warn!(error = %e, path = %root.display(), "rollback failed");
                Err(ApplicationError::RollbackFailed {
                    path: root.to_path_buf(),
                    reason: format!("{cause}; cleanup: {e}"),
                }
                .into())
            }
        }
    }
}

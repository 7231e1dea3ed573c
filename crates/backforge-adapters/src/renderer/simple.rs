//! Section-aware variable substitution renderer.

use std::path::Path;

use backforge_core::{
    application::ports::TemplateRenderer,
    domain::{Permissions, ProjectStructure, RelativePath, RenderContext, TemplateFile},
    error::ForgeResult,
};
use tracing::{debug, instrument};

/// Renders with [`RenderContext::render`]; output paths are rendered too.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(templates = templates.len()))]
    fn render(
        &self,
        templates: &[TemplateFile],
        context: &RenderContext,
        output_root: &Path,
    ) -> ForgeResult<ProjectStructure> {
        let mut structure = ProjectStructure::new(output_root);

        for template in templates {
            let path = RelativePath::try_new(context.render(&template.path))?;
            let content = context.render(template.body.as_str());

            // Sections can empty a file entirely; those are not written.
            if content.trim().is_empty() {
                debug!(path = %path, "skipping empty file");
                continue;
            }

            let permissions = if template.executable {
                Permissions::Executable
            } else {
                Permissions::ReadWrite
            };
            structure.add_file(path, content, permissions);
        }

        Ok(structure)
    }

    fn render_text(&self, body: &str, context: &RenderContext) -> ForgeResult<String> {
        Ok(context.render(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backforge_core::domain::DomainError;
    use backforge_core::error::ForgeError;

    fn ctx() -> RenderContext {
        RenderContext::new("shop-api")
            .with_variable("EXT", "ts")
            .with_flag("docker", false)
    }

    #[test]
    fn renders_paths_and_bodies() {
        let templates = vec![
            TemplateFile::new("src/server.{{EXT}}", "// {{PROJECT_NAME}}\n"),
            TemplateFile::new("run.sh", "#!/bin/sh\n").executable(),
        ];
        let structure = SimpleRenderer.render(&templates, &ctx(), Path::new("/out")).unwrap();

        let server = structure.file("src/server.ts").unwrap();
        assert_eq!(server.content, "// shop-api\n");
        assert!(structure.file("run.sh").unwrap().permissions.is_executable());
    }

    #[test]
    fn blank_output_is_skipped() {
        let templates = vec![TemplateFile::new("Dockerfile", "{{#docker}}\nFROM node\n{{/docker}}\n")];
        let structure = SimpleRenderer.render(&templates, &ctx(), Path::new("/out")).unwrap();
        assert_eq!(structure.entry_count(), 0);
    }

    #[test]
    fn sectioned_file_is_kept_when_flag_is_on() {
        let templates = vec![TemplateFile::new("Dockerfile", "{{#docker}}\nFROM node\n{{/docker}}\n")];
        let ctx = ctx().with_flag("docker", true);
        let structure = SimpleRenderer.render(&templates, &ctx, Path::new("/out")).unwrap();
        assert_eq!(structure.file("Dockerfile").unwrap().content, "FROM node\n");
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let templates = vec![TemplateFile::new("../evil.ts", "x")];
        let err = SimpleRenderer
            .render(&templates, &ctx(), Path::new("/out"))
            .unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Domain(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }
}

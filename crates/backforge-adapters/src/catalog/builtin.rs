//! Templates compiled into the binary.

use backforge_core::{
    application::ports::TemplateCatalog,
    domain::{ComponentKind, Feature, Inclusion, TemplateFile, TemplateSource},
    error::ForgeResult,
};

macro_rules! template {
    ($path:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $path))
    };
}

/// The project and component templates shipped with backforge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self
    }
}

fn project_templates() -> Vec<TemplateFile> {
    use Inclusion::{AnyAuth, AnyDatabase, AnyLock, AnyQueue};

    let feature = Inclusion::Feature;

    vec![
        TemplateFile::new(".gitignore", template!("project/gitignore.tmpl")),
        TemplateFile::new("README.md", template!("project/README.md.tmpl")),
        TemplateFile::new("src/server.{{EXT}}", template!("project/src/server.tmpl")),
        TemplateFile::new("src/app.{{EXT}}", template!("project/src/app.tmpl")),
        TemplateFile::new("src/config/env.{{EXT}}", template!("project/src/config/env.tmpl")),
        // Router runtime
        TemplateFile::new(
            "src/routes/registry.{{EXT}}",
            template!("project/src/routes/registry.tmpl"),
        ),
        TemplateFile::new("src/routes/index.{{EXT}}", template!("project/src/routes/index.tmpl")),
        // Middleware
        TemplateFile::new(
            "src/middleware/index.{{EXT}}",
            template!("project/src/middleware/index.tmpl"),
        ),
        TemplateFile::new(
            "src/middleware/request-logger.{{EXT}}",
            template!("project/src/middleware/request-logger.tmpl"),
        )
        .when(feature(Feature::RequestLogging)),
        TemplateFile::new(
            "src/middleware/cors.{{EXT}}",
            template!("project/src/middleware/cors.tmpl"),
        )
        .when(feature(Feature::Cors)),
        TemplateFile::new(
            "src/middleware/rate-limit.{{EXT}}",
            template!("project/src/middleware/rate-limit.tmpl"),
        )
        .when(feature(Feature::RateLimit)),
        TemplateFile::new(
            "src/middleware/authenticate.{{EXT}}",
            template!("project/src/middleware/authenticate.tmpl"),
        )
        .when(AnyAuth),
        TemplateFile::new(
            "src/middleware/role-check.{{EXT}}",
            template!("project/src/middleware/role-check.tmpl"),
        )
        .when(AnyAuth),
        // Controllers and services
        TemplateFile::new(
            "src/controllers/index.{{EXT}}",
            template!("project/src/controllers/index.tmpl"),
        ),
        TemplateFile::new(
            "src/controllers/health.controller.{{EXT}}",
            template!("project/src/controllers/health.controller.tmpl"),
        ),
        TemplateFile::new(
            "src/controllers/account.controller.{{EXT}}",
            template!("project/src/controllers/account.controller.tmpl"),
        )
        .when(AnyAuth),
        TemplateFile::new(
            "src/services/index.{{EXT}}",
            template!("project/src/services/index.tmpl"),
        ),
        // Backends
        TemplateFile::new("src/db/client.{{EXT}}", template!("project/src/db/client.tmpl"))
            .when(AnyDatabase),
        TemplateFile::new("src/queue/index.{{EXT}}", template!("project/src/queue/index.tmpl"))
            .when(AnyQueue),
        TemplateFile::new("src/lock/index.{{EXT}}", template!("project/src/lock/index.tmpl"))
            .when(AnyLock),
        // Docker
        TemplateFile::new("Dockerfile", template!("project/Dockerfile.tmpl"))
            .when(feature(Feature::Docker)),
        TemplateFile::new(".dockerignore", template!("project/dockerignore.tmpl"))
            .when(feature(Feature::Docker)),
    ]
}

impl TemplateCatalog for BuiltinCatalog {
    fn project_templates(&self) -> ForgeResult<Vec<TemplateFile>> {
        Ok(project_templates())
    }

    fn component_template(&self, kind: ComponentKind) -> ForgeResult<TemplateSource> {
        let body = match kind {
            ComponentKind::Route => template!("components/route.tmpl"),
            ComponentKind::Service => template!("components/service.tmpl"),
            ComponentKind::Middleware => template!("components/middleware.tmpl"),
        };
        Ok(TemplateSource::Static(body))
    }
}

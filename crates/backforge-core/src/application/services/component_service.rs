//! Adding a route, service or middleware to an existing project.
//!
//! Everything that can fail is computed before the first write: the rendered
//! component, the spliced index file and, for routes, the extended route
//! table. A rejected add leaves the project untouched, and a failed write
//! undoes the writes before it.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::application::{
    ApplicationError,
    ports::{Filesystem, TemplateCatalog, TemplateRenderer},
    services::project_loader::{load_project, load_routes, routes_text},
    splice::{self, CONTROLLER_ANCHOR, MIDDLEWARE_ANCHOR, SERVICE_ANCHOR},
};
use crate::domain::{ComponentKind, ComponentSpec, RenderContext, manifests::ROUTES_FILE};
use crate::error::{ForgeError, ForgeResult};
use crate::routing::RouterConfig;

/// Files touched by [`ComponentService::add`], relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentReport {
    pub created: Vec<String>,
    pub modified: Vec<String>,
    /// `METHOD /path` for each route appended to the route table.
    pub routes_added: Vec<String>,
}

/// One file written by an add and the text it replaces.
#[derive(Debug)]
struct PendingWrite {
    path: PathBuf,
    text: String,
    /// `None` for a new file.
    previous: Option<String>,
}

/// Lines that wire a component into its kind's index file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    import: Option<String>,
    anchor: &'static str,
    line: String,
}

impl Registration {
    fn for_spec(spec: &ComponentSpec) -> Self {
        let export = spec.export_name();
        let from = spec.import_specifier();
        match spec.kind {
            ComponentKind::Middleware => Self {
                import: Some(format!("import {{ {export} }} from '{from}';")),
                anchor: MIDDLEWARE_ANCHOR,
                line: format!("registerMiddleware('{}', {export});", spec.name.camel()),
            },
            ComponentKind::Route => Self {
                import: Some(format!("import {{ {export} }} from '{from}';")),
                anchor: CONTROLLER_ANCHOR,
                line: format!("registerController('{}', {export});", spec.name.camel()),
            },
            ComponentKind::Service => Self {
                import: None,
                anchor: SERVICE_ANCHOR,
                line: format!("export * from '{from}';"),
            },
        }
    }

    /// Apply to `source`; `None` when nothing changes.
    fn splice(&self, source: &str, file: &Path) -> ForgeResult<Option<String>> {
        let registered = splice::insert_after_anchor(source, self.anchor, &self.line)
            .ok_or_else(|| ApplicationError::SpliceAnchorMissing {
                file: file.to_path_buf(),
                anchor: self.anchor.to_string(),
            })?;
        let mut changed = registered.is_changed();
        let mut text = registered.into_text(source);

        if let Some(import) = &self.import {
            let imported = splice::insert_import(&text, import);
            changed |= imported.is_changed();
            text = imported.into_text(&text);
        }

        Ok(changed.then_some(text))
    }
}

pub struct ComponentService {
    catalog: Box<dyn TemplateCatalog>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl ComponentService {
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

    #[instrument(skip_all, fields(root = %root.display(), kind = %spec.kind, name = %spec.name))]
    pub fn add(&self, root: &Path, spec: &ComponentSpec) -> ForgeResult<ComponentReport> {
        let fs = self.filesystem.as_ref();
        let config = load_project(fs, root)?;
        let language = config.language();

        let relative = spec.file_path(language);
        let target = root.join(&relative);
        if fs.exists(&target) {
            return Err(ApplicationError::ComponentExists { path: target }.into());
        }

        let ctx = spec.render_context(RenderContext::for_project(&config));
        let template = self.catalog.component_template(spec.kind)?;
        let body = self.renderer.render_text(template.as_str(), &ctx)?;

        let table = match spec.kind {
            ComponentKind::Route => Some(self.extend_routes(root, spec)?),
            _ => None,
        };

        let index_relative = spec.kind.index_path(language);
        let index = root.join(&index_relative);
        let index_source = fs.read_to_string(&index)?;
        let spliced = Registration::for_spec(spec).splice(&index_source, &index)?;
        debug!(index = %index_relative, changed = spliced.is_some(), "index spliced");

        // Nothing has been written up to here.
        let mut report = ComponentReport::default();
        let mut writes = vec![PendingWrite {
            path: target.clone(),
            text: body,
            previous: None,
        }];
        report.created.push(relative);

        if let Some(text) = spliced {
            writes.push(PendingWrite {
                path: index,
                text,
                previous: Some(index_source),
            });
            report.modified.push(index_relative);
        }

        if let Some((table, added)) = table {
            let path = root.join(ROUTES_FILE);
            let previous = fs.read_to_string(&path)?;
            writes.push(PendingWrite {
                path,
                text: routes_text(&table)?,
                previous: Some(previous),
            });
            report.modified.push(ROUTES_FILE.to_string());
            report.routes_added = added;
        }

        if let Some(parent) = target.parent() {
            fs.create_dir_all(parent)?;
        }
        self.commit(root, &writes)?;

        info!(
            created = report.created.len(),
            modified = report.modified.len(),
            "component added"
        );
        Ok(report)
    }

    fn commit(&self, root: &Path, writes: &[PendingWrite]) -> ForgeResult<()> {
        let fs = self.filesystem.as_ref();
        for (done, pending) in writes.iter().enumerate() {
            if let Err(cause) = fs.write_file(&pending.path, &pending.text) {
                warn!(path = %pending.path.display(), error = %cause, "write failed, undoing add");
                return self.undo(root, &writes[..=done], cause);
            }
        }
        Ok(())
    }

    /// Puts back every file in `written`, newest first. The last entry is the
    /// write that failed and is only touched when it changed on disk.
    fn undo(&self, root: &Path, written: &[PendingWrite], cause: ForgeError) -> ForgeResult<()> {
        let fs = self.filesystem.as_ref();
        let mut failures = Vec::new();

        for pending in written.iter().rev() {
            let restored = match &pending.previous {
                Some(text) if fs.read_to_string(&pending.path).ok().as_ref() == Some(text) => Ok(()),
                Some(text) => fs.write_file(&pending.path, text),
                None if fs.exists(&pending.path) => fs.remove_file(&pending.path),
                None => Ok(()),
            };
            if let Err(e) = restored {
                warn!(path = %pending.path.display(), error = %e, "undo failed");
                failures.push(format!("{}: {e}", pending.path.display()));
            }
        }

        if failures.is_empty() {
            info!(files = written.len(), "add undone");
            return Err(cause);
        }
        Err(ApplicationError::RollbackFailed {
            path: root.to_path_buf(),
            reason: format!("{cause}; cleanup: {}", failures.join("; ")),
        }
        .into())
    }

    fn extend_routes(&self, root: &Path, spec: &ComponentSpec) -> ForgeResult<(RouterConfig, Vec<String>)> {
        let mut table = load_routes(self.filesystem.as_ref(), root)?;
        let mut added = Vec::new();

        for route in spec.default_routes() {
            if table.declares(route.method(), route.path()) {
                return Err(ApplicationError::DuplicateRoute {
                    method: route.method().to_string(),
                    path: route.path().to_string(),
                }
                .into());
            }
            added.push(format!("{} {}", route.method(), route.path()));
            table = table.with_route(route);
        }
        Ok((table, added))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ComponentName;

    fn spec(kind: ComponentKind, name: &str) -> ComponentSpec {
        ComponentSpec::new(kind, ComponentName::parse(name).unwrap())
    }

    const MIDDLEWARE_INDEX: &str = "\
import { registerMiddleware } from '../routes/registry.js';
import { cors } from './cors.js';

// backforge:middleware
registerMiddleware('cors', cors);
";

    #[test]
    fn registration_lines_per_kind() {
        let mw = Registration::for_spec(&spec(ComponentKind::Middleware, "audit-trail"));
        assert_eq!(mw.import.as_deref(), Some("import { auditTrail } from './audit-trail.js';"));
        assert_eq!(mw.line, "registerMiddleware('auditTrail', auditTrail);");

        let route = Registration::for_spec(&spec(ComponentKind::Route, "orders"));
        assert_eq!(
            route.import.as_deref(),
            Some("import { ordersController } from './orders.controller.js';")
        );
        assert_eq!(route.line, "registerController('orders', ordersController);");
        assert_eq!(route.anchor, CONTROLLER_ANCHOR);

        let svc = Registration::for_spec(&spec(ComponentKind::Service, "billing"));
        assert_eq!(svc.import, None);
        assert_eq!(svc.line, "export * from './billing.service.js';");
    }

    #[test]
    fn splice_adds_import_and_registration() {
        let reg = Registration::for_spec(&spec(ComponentKind::Middleware, "audit"));
        let out = reg
            .splice(MIDDLEWARE_INDEX, Path::new("src/middleware/index.ts"))
            .unwrap()
            .unwrap();
        assert!(out.contains("import { audit } from './audit.js';\n\n// backforge:middleware"));
        assert!(out.ends_with("registerMiddleware('cors', cors);\nregisterMiddleware('audit', audit);\n"));

        assert_eq!(reg.splice(&out, Path::new("index.ts")).unwrap(), None);
    }

    #[test]
    fn splice_without_anchor_fails() {
        let reg = Registration::for_spec(&spec(ComponentKind::Service, "billing"));
        let err = reg.splice("export {};\n", Path::new("src/services/index.ts")).unwrap_err();
        assert!(err.to_string().contains(SERVICE_ANCHOR));
    }
}

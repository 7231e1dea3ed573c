//! Static checks of a generated project, for `backforge validate`.
//!
//! Three passes, all collected rather than stopping at the first problem:
//! relative imports under `src/` must resolve, `routes.json` must parse, and
//! the route table must validate against what the sources register.

use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::application::{
    ports::Filesystem,
    scan,
    services::project_loader::{load_project, load_routes},
};
use crate::error::{ForgeError, ForgeResult};
use crate::routing::{RouteIssue, StaticCatalog, validate};

const SOURCE_EXTENSIONS: [&str; 2] = ["ts", "js"];

/// One problem found in a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    UnresolvedImport { file: String, specifier: String },
    RouteTable(String),
    Route(RouteIssue),
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedImport { file, specifier } => {
                write!(f, "{file}: cannot resolve import '{specifier}'")
            }
            Self::RouteTable(reason) => write!(f, "routes.json: {reason}"),
            Self::Route(issue) => write!(f, "{issue}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub files_scanned: usize,
    pub routes: usize,
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

pub struct AuditService {
    filesystem: Box<dyn Filesystem>,
}

impl AuditService {
    pub fn new(filesystem: Box<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn audit(&self, root: &Path) -> ForgeResult<AuditReport> {
        load_project(self.filesystem.as_ref(), root)?;

        let sources = self.sources(root)?;
        let mut report = AuditReport {
            files_scanned: sources.len(),
            ..AuditReport::default()
        };
        let mut catalog = StaticCatalog::new();

        for (path, text) in &sources {
            self.check_imports(root, path, text, &mut report);
            self.collect_registrations(path, text, &mut catalog);
        }
        debug!(
            middlewares = catalog.middleware_names().count(),
            controllers = catalog.controller_names().count(),
            "registrations collected"
        );

        match load_routes(self.filesystem.as_ref(), root) {
            Ok(table) => {
                report.routes = table.routes().len();
                let validation = validate(&table, &catalog, &catalog);
                report
                    .issues
                    .extend(validation.into_issues().into_iter().map(AuditIssue::Route));
            }
            Err(ForgeError::Application(e)) => {
                warn!(error = %e, "route table unusable");
                report.issues.push(AuditIssue::RouteTable(e.to_string()));
            }
            Err(e) => return Err(e),
        }

        info!(
            files = report.files_scanned,
            issues = report.issues.len(),
            "audit finished"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn sources(&self, root: &Path) -> ForgeResult<Vec<(PathBuf, String)>> {
        let mut files: Vec<PathBuf> = self
            .filesystem
            .list_files(&root.join("src"))?
            .into_iter()
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
            })
            .collect();
        files.sort();

        files
            .into_iter()
            .map(|p| {
                let text = self.filesystem.read_to_string(&p)?;
                Ok((p, text))
            })
            .collect()
    }

    fn check_imports(&self, root: &Path, file: &Path, text: &str, report: &mut AuditReport) {
        for specifier in scan::relative_imports(text) {
            if self.resolve(file, &specifier).is_none() {
                report.issues.push(AuditIssue::UnresolvedImport {
                    file: display_relative(root, file),
                    specifier,
                });
            }
        }
    }

    fn collect_registrations(&self, file: &Path, text: &str, catalog: &mut StaticCatalog) {
        for name in scan::registered_middlewares(text) {
            catalog.add_middleware(name);
        }
        if scan::registers_role_check(text) {
            catalog.set_role_check(true);
        }

        for registration in scan::registered_controllers(text) {
            let methods = match scan::import_binding(text, &registration.identifier) {
                Some(binding) => self
                    .resolve(file, &binding.specifier)
                    .and_then(|path| self.filesystem.read_to_string(&path).ok())
                    .map(|source| scan::object_members(&source, &binding.imported))
                    .unwrap_or_default(),
                None => scan::object_members(text, &registration.identifier),
            };
            catalog.add_controller(registration.name, methods);
        }
    }

    /// The file a relative specifier from `from` refers to, if it exists.
    fn resolve(&self, from: &Path, specifier: &str) -> Option<PathBuf> {
        let dir = from.parent().unwrap_or(Path::new(""));
        let base = normalize(&dir.join(specifier));
        candidates(&base)
            .into_iter()
            .find(|candidate| self.filesystem.exists(candidate))
    }
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = vec![base.to_path_buf()];
    for ext in SOURCE_EXTENSIONS {
        let mut with_ext = OsString::from(base.as_os_str());
        with_ext.push(".");
        with_ext.push(ext);
        out.push(PathBuf::from(with_ext));
    }
    for ext in SOURCE_EXTENSIONS {
        out.push(base.join(format!("index.{ext}")));
    }
    // NodeNext: `./x.js` in TypeScript sources means `./x.ts`.
    if base.extension().is_some_and(|e| e == "js") {
        out.push(base.with_extension("ts"));
    }
    out
}

/// Lexically resolve `.` and `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_parent_segments() {
        assert_eq!(
            normalize(Path::new("/p/src/controllers/../routes/./registry.js")),
            PathBuf::from("/p/src/routes/registry.js")
        );
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn candidates_cover_extensions_index_and_js_to_ts() {
        let found = candidates(Path::new("/p/src/a.js"));
        assert!(found.contains(&PathBuf::from("/p/src/a.js")));
        assert!(found.contains(&PathBuf::from("/p/src/a.ts")));

        let bare = candidates(Path::new("/p/src/lib"));
        assert!(bare.contains(&PathBuf::from("/p/src/lib.ts")));
        assert!(bare.contains(&PathBuf::from("/p/src/lib/index.js")));
    }

    #[test]
    fn issues_render_one_line_each() {
        let issue = AuditIssue::UnresolvedImport {
            file: "src/app.ts".into(),
            specifier: "./missing.js".into(),
        };
        assert_eq!(issue.to_string(), "src/app.ts: cannot resolve import './missing.js'");
        assert_eq!(
            AuditIssue::RouteTable("expected value".into()).to_string(),
            "routes.json: expected value"
        );
    }

    #[test]
    fn relative_display_uses_forward_slashes() {
        assert_eq!(
            display_relative(Path::new("/p"), Path::new("/p/src/routes/index.ts")),
            "src/routes/index.ts"
        );
    }
}

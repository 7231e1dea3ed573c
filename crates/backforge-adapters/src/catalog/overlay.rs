//! Directory overlay over another catalog.
//!
//! # Directory layout expected
//!
//! ```text
//! my-templates/
//! ├── overlay.toml                     ← optional
//! ├── files/
//! │   ├── src/server.{{EXT}}.tmpl      ← replaces the built-in server file
//! │   └── src/jobs/cleanup.ts.tmpl     ← new file
//! └── components/
//!     └── route.tmpl                   ← used by `backforge add route`
//! ```
//!
//! Paths under `files/` are output paths with an optional `.tmpl` suffix.
//! A file whose path equals a base template's path replaces it and keeps its
//! inclusion rule unless `overlay.toml` gives a new one.
//!
//! # `overlay.toml` format
//!
//! ```toml
//! executable = ["scripts/migrate.sh"]
//!
//! [when]
//! "src/jobs/cleanup.ts" = "queue,language:ts"
//! ```

use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use backforge_core::{
    application::ports::TemplateCatalog,
    domain::{ComponentKind, DomainError, Inclusion, TemplateFile, TemplateSource},
    error::ForgeResult,
};

use super::BuiltinCatalog;

/// Environment variable naming an overlay directory.
pub const TEMPLATES_DIR_ENV: &str = "BACKFORGE_TEMPLATES_DIR";

const MANIFEST_FILE: &str = "overlay.toml";
const TEMPLATE_SUFFIX: &str = ".tmpl";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OverlayManifest {
    /// Output path → inclusion rule.
    when: BTreeMap<String, String>,
    executable: Vec<String>,
}

struct OverlayFile {
    path: String,
    body: String,
    when: Option<Inclusion>,
    executable: bool,
}

pub struct OverlayCatalog {
    dir: PathBuf,
    base: Box<dyn TemplateCatalog>,
}

impl OverlayCatalog {
    pub fn new(dir: impl Into<PathBuf>, base: Box<dyn TemplateCatalog>) -> Self {
        Self {
            dir: dir.into(),
            base,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn manifest(&self) -> ForgeResult<OverlayManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(OverlayManifest::default());
        }
        let raw = read(&path)?;
        let manifest = toml::from_str(&raw).map_err(|e| {
            DomainError::InvalidTemplate(format!("failed to parse '{}': {e}", path.display()))
        })?;
        Ok(manifest)
    }

    fn overlay_files(&self) -> ForgeResult<Vec<OverlayFile>> {
        let files_dir = self.dir.join("files");
        if !files_dir.is_dir() {
            return Ok(Vec::new());
        }
        let manifest = self.manifest()?;

        let mut out = Vec::new();
        for entry in WalkDir::new(&files_dir).min_depth(1).sort_by_file_name() {
            let entry = entry
                .map_err(|e| DomainError::InvalidTemplate(format!("directory walk error: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(&files_dir).map_err(|_| {
                DomainError::InvalidTemplate(format!(
                    "failed to relativise '{}' against '{}'",
                    entry.path().display(),
                    files_dir.display()
                ))
            })?;
            let slashed = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let path = slashed
                .strip_suffix(TEMPLATE_SUFFIX)
                .unwrap_or(&slashed)
                .to_string();

            let when = manifest
                .when
                .get(&path)
                .map(|rule| rule.parse::<Inclusion>())
                .transpose()?;

            out.push(OverlayFile {
                executable: manifest.executable.contains(&path),
                body: read(entry.path())?,
                when,
                path,
            });
        }

        for declared in manifest.when.keys() {
            if !out.iter().any(|f| &f.path == declared) {
                warn!(path = %declared, "{MANIFEST_FILE} names a file that does not exist");
            }
        }
        Ok(out)
    }
}

impl TemplateCatalog for OverlayCatalog {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn project_templates(&self) -> ForgeResult<Vec<TemplateFile>> {
        let mut templates = self.base.project_templates()?;

        for file in self.overlay_files()? {
            match templates.iter_mut().find(|t| t.path == file.path) {
                Some(existing) => {
                    debug!(path = %file.path, "overlay replaces template");
                    existing.body = TemplateSource::Owned(file.body);
                    if let Some(when) = file.when {
                        existing.when = when;
                    }
                    existing.executable |= file.executable;
                }
                None => {
                    debug!(path = %file.path, "overlay adds template");
                    let mut template = TemplateFile::new(file.path, file.body)
                        .when(file.when.unwrap_or_default());
                    template.executable = file.executable;
                    templates.push(template);
                }
            }
        }
        Ok(templates)
    }

    fn component_template(&self, kind: ComponentKind) -> ForgeResult<TemplateSource> {
        let path = self
            .dir
            .join("components")
            .join(format!("{}{TEMPLATE_SUFFIX}", kind.as_str()));
        if path.is_file() {
            debug!(path = %path.display(), "using overlay component template");
            return Ok(TemplateSource::Owned(read(&path)?));
        }
        self.base.component_template(kind)
    }
}

/// The built-in catalog, overlaid by `$BACKFORGE_TEMPLATES_DIR` when set.
pub fn default_catalog() -> Box<dyn TemplateCatalog> {
    match env::var_os(TEMPLATES_DIR_ENV) {
        Some(dir) if Path::new(&dir).is_dir() => {
            info!(dir = %Path::new(&dir).display(), "using template overlay");
            Box::new(OverlayCatalog::new(dir, Box::new(BuiltinCatalog)))
        }
        Some(dir) => {
            warn!(
                dir = %Path::new(&dir).display(),
                "{TEMPLATES_DIR_ENV} is not a directory, using built-in templates"
            );
            Box::new(BuiltinCatalog)
        }
        None => Box::new(BuiltinCatalog),
    }
}

fn read(path: &Path) -> ForgeResult<String> {
    fs::read_to_string(path).map_err(|e| {
        DomainError::InvalidTemplate(format!("failed to read '{}': {e}", path.display())).into()
    })
}

#[cfg(test)]
mod tests {
    use backforge_core::domain::{AuthStrategy, Feature, ProjectConfig};
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn overlay(dir: &TempDir) -> OverlayCatalog {
        OverlayCatalog::new(dir.path(), Box::new(BuiltinCatalog))
    }

    #[test]
    fn empty_directory_serves_the_base() {
        let dir = TempDir::new().unwrap();
        let builtin = BuiltinCatalog.project_templates().unwrap();
        assert_eq!(overlay(&dir).project_templates().unwrap(), builtin);
    }

    #[test]
    fn replacement_keeps_the_base_rule() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "files/Dockerfile.tmpl", "FROM node:22-alpine\n");

        let templates = overlay(&dir).project_templates().unwrap();
        let docker = templates.iter().find(|t| t.path == "Dockerfile").unwrap();
        assert_eq!(docker.body.as_str(), "FROM node:22-alpine\n");
        assert_eq!(docker.when, Inclusion::Feature(Feature::Docker));
        assert_eq!(
            templates.len(),
            BuiltinCatalog.project_templates().unwrap().len()
        );
    }

    #[test]
    fn new_files_follow_the_manifest() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "files/scripts/migrate.sh.tmpl", "#!/bin/sh\n");
        write(dir.path(), "files/src/auth/keys.ts", "export const keys = [];\n");
        write(
            dir.path(),
            "overlay.toml",
            "executable = [\"scripts/migrate.sh\"]\n\n[when]\n\"src/auth/keys.ts\" = \"auth,language:ts\"\n",
        );

        let templates = overlay(&dir).project_templates().unwrap();
        let script = templates.iter().find(|t| t.path == "scripts/migrate.sh").unwrap();
        assert!(script.executable);
        assert_eq!(script.when, Inclusion::Always);

        let keys = templates.iter().find(|t| t.path == "src/auth/keys.ts").unwrap();
        let plain = ProjectConfig::builder().name("a").build().unwrap();
        let with_auth = ProjectConfig::builder()
            .name("a")
            .auth(AuthStrategy::Jwt)
            .build()
            .unwrap();
        assert!(!keys.applies_to(&plain));
        assert!(keys.applies_to(&with_auth));
    }

    #[test]
    fn bad_rule_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "files/a.txt", "a\n");
        write(dir.path(), "overlay.toml", "[when]\n\"a.txt\" = \"planet:mars\"\n");

        assert!(overlay(&dir).project_templates().is_err());
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "files/a.txt", "a\n");
        write(dir.path(), "overlay.toml", "when = 3\n");

        let err = overlay(&dir).project_templates().unwrap_err();
        assert!(err.to_string().contains("overlay.toml"));
    }

    #[test]
    fn component_templates_fall_back_to_the_base() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "components/service.tmpl", "export const {{COMPONENT_EXPORT}} = {};\n");

        let catalog = overlay(&dir);
        assert_eq!(
            catalog.component_template(ComponentKind::Service).unwrap().as_str(),
            "export const {{COMPONENT_EXPORT}} = {};\n"
        );
        assert_eq!(
            catalog.component_template(ComponentKind::Route).unwrap(),
            BuiltinCatalog.component_template(ComponentKind::Route).unwrap()
        );
    }
}

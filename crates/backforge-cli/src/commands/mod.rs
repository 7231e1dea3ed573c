//! Command handlers. Each translates arguments into core calls and prints
//! the result; no business logic lives here.

use tracing::{info, warn};

use backforge_adapters::{BuiltinCatalog, OverlayCatalog, default_catalog};
use backforge_core::application::ports::TemplateCatalog;

use crate::config::AppConfig;

pub mod add;
pub mod completions;
pub mod config;
pub mod init;
pub mod new;
pub mod routes;
pub mod validate;

/// `templates.dir` from the config, else `$BACKFORGE_TEMPLATES_DIR`, else
/// the built-in templates.
pub(crate) fn template_catalog(config: &AppConfig) -> Box<dyn TemplateCatalog> {
    match &config.templates.dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "using template overlay from config");
            Box::new(OverlayCatalog::new(dir, Box::new(BuiltinCatalog::new())))
        }
        Some(dir) => {
            warn!(
                dir = %dir.display(),
                "templates.dir is not a directory, using built-in templates"
            );
            Box::new(BuiltinCatalog::new())
        }
        None => default_catalog(),
    }
}

//! Application layer errors.
//!
//! Failures in orchestration: filesystem access, project discovery and
//! source splicing. Business rule violations are `DomainError`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    #[error("filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    #[error("project already exists at {path}")]
    ProjectExists { path: PathBuf },

    #[error("rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    #[error("template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    #[error("no template for {what}")]
    TemplateMissing { what: String },

    #[error("no backforge project found at {path}")]
    ProjectNotFound { path: PathBuf },

    #[error("could not determine project settings at {path}: {reason}")]
    ProjectConfigMissing { path: PathBuf, reason: String },

    #[error("{path} already exists")]
    ComponentExists { path: PathBuf },

    #[error("{file}: anchor '{anchor}' not found")]
    SpliceAnchorMissing { file: PathBuf, anchor: String },

    #[error("routes.json is not valid: {reason}")]
    RouteTableInvalid { reason: String },

    #[error("route {method} {path} is already declared")]
    DuplicateRoute { method: String, path: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::ProjectExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Choose a different project name".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![format!(
                "Remove the partially generated directory by hand: {}",
                path.display()
            )],
            Self::TemplateMissing { .. } => vec![
                "Check BACKFORGE_TEMPLATES_DIR if you use a template overlay".into(),
            ],
            Self::ProjectNotFound { .. } | Self::ProjectConfigMissing { .. } => vec![
                "Run the command from a project created with backforge new".into(),
                "Or point at it with --project <DIR>".into(),
            ],
            Self::ComponentExists { .. } => vec![
                "Pick another name or delete the existing file first".into(),
            ],
            Self::SpliceAnchorMissing { anchor, .. } => vec![
                format!("Restore the '{anchor}' comment line, new registrations go below it"),
            ],
            Self::RouteTableInvalid { .. } => vec![
                "Fix the JSON syntax in src/routes/routes.json".into(),
            ],
            Self::DuplicateRoute { .. } => vec![
                "Use --path to mount the new routes somewhere else".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. }
            | Self::RollbackFailed { .. }
            | Self::RenderingFailed { .. } => ErrorCategory::Internal,
            Self::TemplateMissing { .. } | Self::ProjectNotFound { .. } => ErrorCategory::NotFound,
            Self::ProjectConfigMissing { .. } => ErrorCategory::Configuration,
            Self::ProjectExists { .. }
            | Self::ComponentExists { .. }
            | Self::SpliceAnchorMissing { .. }
            | Self::RouteTableInvalid { .. }
            | Self::DuplicateRoute { .. }
            | Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}

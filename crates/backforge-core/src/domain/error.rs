//! Domain error taxonomy.

use thiserror::Error;

/// Errors raised by the scaffolding domain.
///
/// All variants are cloneable and carry owned data so they can be attached to
/// reports and re-rendered by the CLI.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ── Validation ───────────────────────────────────────────────────────────
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("invalid component name '{name}': {reason}")]
    InvalidComponentName { name: String, reason: String },

    #[error("unknown {kind} '{value}'")]
    UnknownOption { kind: &'static str, value: String },

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("duplicate path in project structure: {path}")]
    DuplicatePath { path: String },

    #[error("absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("invalid inclusion rule '{rule}': {reason}")]
    InvalidInclusion { rule: String, reason: String },

    // ── Compatibility ────────────────────────────────────────────────────────
    #[error("{option} '{value}' cannot be used here: {reason}")]
    IncompatibleOptions {
        option: &'static str,
        value: String,
        reason: String,
    },

    // ── Manifests ────────────────────────────────────────────────────────────
    #[error("could not encode {what}: {reason}")]
    Encoding { what: &'static str, reason: String },

    #[error("could not read {what}: {reason}")]
    Decoding { what: &'static str, reason: String },
}

impl DomainError {
    /// User-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidProjectName { .. } => vec![
                "Use letters, digits, '-' and '_' only".into(),
                "Example: backforge new orders-api".into(),
            ],
            Self::InvalidComponentName { .. } => vec![
                "Component names start with a letter and use letters, digits, '-' or '_'".into(),
                "Example: backforge add route user-profile".into(),
            ],
            Self::UnknownOption { kind, .. } => vec![
                format!("Run with --help to see the accepted {kind} values"),
            ],
            Self::IncompatibleOptions { option, reason, .. } => vec![
                format!("Change the {option} setting: {reason}"),
            ],
            Self::InvalidInclusion { .. } => vec![
                "Inclusion rules look like 'auth', 'database:postgres' or 'feature:docker,language:ts'"
                    .into(),
            ],
            Self::Decoding { what, .. } => vec![
                format!("Check that {what} is valid JSON"),
                "Regenerate it with backforge if it was edited by hand".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidProjectName { .. }
            | Self::InvalidComponentName { .. }
            | Self::UnknownOption { .. }
            | Self::InvalidInclusion { .. }
            | Self::Decoding { .. } => ErrorCategory::Validation,
            Self::IncompatibleOptions { .. } => ErrorCategory::Compatibility,
            Self::InvalidTemplate(_)
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::Encoding { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}

//! Unified error handling for backforge core.
//!
//! Wraps domain, routing and application errors behind one type with
//! user-actionable suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::routing::RouterError;

#[derive(Debug, Error, Clone)]
pub enum ForgeError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Routing(#[from] RouterError),

    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl ForgeError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Routing(RouterError::InvalidRouteTable(report)) => {
                let mut out = report.errors();
                out.push("Register the missing names or fix src/routes/routes.json".into());
                out
            }
            Self::Routing(_) => vec![
                "Handlers are written as 'controller.method'".into(),
                "Run backforge validate to check the whole route table".into(),
            ],
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Run backforge config path to find the active config file".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in backforge".into(),
                "Re-run with -vvv and include the output when reporting it".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Compatibility => ErrorCategory::Compatibility,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Routing(_) => ErrorCategory::Validation,
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
    Internal,
}

pub type ForgeResult<T> = Result<T, ForgeError>;

/// Attach a message to a foreign error, turning it into `ForgeError::Internal`.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> ForgeResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> ForgeResult<T> {
        self.map_err(|e| ForgeError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouterConfig, StaticCatalog, validate};

    #[test]
    fn domain_categories_map_through() {
        let err: ForgeError = DomainError::UnknownOption {
            kind: "framework",
            value: "koa".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.to_string(), "unknown framework 'koa'");
    }

    #[test]
    fn invalid_route_table_suggests_every_issue() {
        let config: RouterConfig = serde_json::from_str(
            r#"{ "defaultMiddlewares": ["auth"], "routes": [
                { "method": "GET", "path": "/a", "handler": "a.x" } ] }"#,
        )
        .unwrap();
        let report = validate(&config, &StaticCatalog::new(), &StaticCatalog::new());
        let err = ForgeError::from(RouterError::InvalidRouteTable(report));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.suggestions().len(), 3);
    }

    #[test]
    fn context_wraps_as_internal() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let err = res.context("reading templates").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("reading templates: boom"));
    }
}

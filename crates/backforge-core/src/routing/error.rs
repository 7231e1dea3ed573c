//! Routing errors.
//!
//! [`RouteIssue`] is a single unresolved reference found in a route table.
//! The validator collects issues into a [`ValidationReport`]; the chain
//! builder raises the first one it meets as [`RouterError::Unresolved`].

use std::fmt;

use thiserror::Error;

use crate::routing::model::{HttpMethod, MiddlewareName, RouteDefinition};
use crate::routing::registry::HandlerResolution;

/// One unresolvable reference, tagged with the route it belongs to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteIssue {
    #[error("{method} {path}: middleware '{name}' is not registered")]
    UnregisteredMiddleware {
        name: MiddlewareName,
        method: HttpMethod,
        path: String,
    },

    #[error("{method} {path}: controller '{name}' is not registered")]
    UnregisteredController {
        name: String,
        method: HttpMethod,
        path: String,
    },

    #[error("{method} {path}: controller '{controller}' has no method '{name}'")]
    UnregisteredMethod {
        controller: String,
        name: String,
        method: HttpMethod,
        path: String,
    },
}

impl RouteIssue {
    pub(crate) fn missing_middleware(route: &RouteDefinition, name: &MiddlewareName) -> Self {
        Self::UnregisteredMiddleware {
            name: name.clone(),
            method: route.method(),
            path: route.path().to_string(),
        }
    }

    /// Issue for a handler lookup, or `None` when it resolved.
    pub(crate) fn for_handler(route: &RouteDefinition, resolution: HandlerResolution) -> Option<Self> {
        let handler = route.handler();
        match resolution {
            HandlerResolution::Resolved => None,
            HandlerResolution::MissingController => Some(Self::UnregisteredController {
                name: handler.controller().to_string(),
                method: route.method(),
                path: route.path().to_string(),
            }),
            HandlerResolution::MissingMethod => Some(Self::UnregisteredMethod {
                controller: handler.controller().to_string(),
                name: handler.method().to_string(),
                method: route.method(),
                path: route.path().to_string(),
            }),
        }
    }

    /// Path of the route the issue was found on.
    pub fn route_path(&self) -> &str {
        match self {
            Self::UnregisteredMiddleware { path, .. }
            | Self::UnregisteredController { path, .. }
            | Self::UnregisteredMethod { path, .. } => path,
        }
    }
}

/// Every issue found in one validation pass, in route table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<RouteIssue>,
}

impl ValidationReport {
    pub(crate) fn from_issues(issues: Vec<RouteIssue>) -> Self {
        Self { issues }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[RouteIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<RouteIssue> {
        self.issues
    }

    /// One human-readable line per issue.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {issue}")?;
        }
        Ok(())
    }
}

/// Errors raised by the routing model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("invalid handler reference '{value}': expected 'controller.method'")]
    InvalidHandlerRef { value: String },

    #[error("unknown HTTP method '{value}'")]
    UnknownMethod { value: String },

    #[error("invalid route declaration: {reason}")]
    InvalidDeclaration { reason: String },

    /// Raised immediately by the chain builder.
    #[error(transparent)]
    Unresolved(#[from] RouteIssue),

    /// Raised by apply; nothing was registered.
    #[error("route table has {n} unresolved reference(s):\n{report}", n = .0.len(), report = .0)]
    InvalidRouteTable(ValidationReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::model::HandlerRef;

    fn route() -> RouteDefinition {
        RouteDefinition::new(HttpMethod::Post, "/admin", HandlerRef::new("admin", "stats"))
    }

    #[test]
    fn issue_messages_name_the_route() {
        let issue = RouteIssue::missing_middleware(&route(), &MiddlewareName::from("auth"));
        assert_eq!(
            issue.to_string(),
            "POST /admin: middleware 'auth' is not registered"
        );
    }

    #[test]
    fn handler_resolution_maps_to_issue_kind() {
        assert!(RouteIssue::for_handler(&route(), HandlerResolution::Resolved).is_none());
        assert!(matches!(
            RouteIssue::for_handler(&route(), HandlerResolution::MissingController),
            Some(RouteIssue::UnregisteredController { .. })
        ));
        assert!(matches!(
            RouteIssue::for_handler(&route(), HandlerResolution::MissingMethod),
            Some(RouteIssue::UnregisteredMethod { .. })
        ));
    }

    #[test]
    fn invalid_table_error_lists_every_issue() {
        let report = ValidationReport::from_issues(vec![
            RouteIssue::missing_middleware(&route(), &MiddlewareName::from("a")),
            RouteIssue::missing_middleware(&route(), &MiddlewareName::from("b")),
        ]);
        let message = RouterError::InvalidRouteTable(report).to_string();
        assert!(message.starts_with("route table has 2 unresolved reference(s)"));
        assert!(message.contains("'a'"));
        assert!(message.contains("'b'"));
    }
}

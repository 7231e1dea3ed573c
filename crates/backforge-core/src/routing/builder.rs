//! Fluent construction of a [`RouterConfig`].
//!
//! ```
//! use backforge_core::routing::RouteBuilder;
//!
//! let config = RouteBuilder::new()
//!     .default_middleware("logging")
//!     .get("/health", "health.check")
//!     .without(["logging"])
//!     .post("/admin", "admin.stats")
//!     .with(["auth"])
//!     .roles(["admin"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.routes().len(), 2);
//! ```

use crate::routing::error::RouterError;
use crate::routing::model::{HandlerRef, HttpMethod, MiddlewareName, RouteDefinition, RouterConfig};

/// Declares a route table one route at a time.
///
/// Modifiers (`with`, `without`, `roles`, `exclude_roles`) apply to the most
/// recently declared route. Errors are kept until [`build`](Self::build) so
/// the chain never breaks; the first one wins.
#[derive(Debug, Default)]
pub struct RouteBuilder {
    default_middlewares: Vec<MiddlewareName>,
    default_roles: Vec<String>,
    routes: Vec<RouteDefinition>,
    error: Option<RouterError>,
}

impl RouteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_middleware(mut self, name: impl Into<MiddlewareName>) -> Self {
        let name = name.into();
        if !self.default_middlewares.contains(&name) {
            self.default_middlewares.push(name);
        }
        self
    }

    pub fn default_role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        if !self.default_roles.contains(&role) {
            self.default_roles.push(role);
        }
        self
    }

    pub fn route(mut self, method: HttpMethod, path: &str, handler: &str) -> Self {
        if !path.starts_with('/') {
            return self.fail(RouterError::InvalidDeclaration {
                reason: format!("path '{path}' must start with '/'"),
            });
        }
        match HandlerRef::parse(handler) {
            Ok(handler) => self.routes.push(RouteDefinition::new(method, path, handler)),
            Err(e) => return self.fail(e),
        }
        self
    }

    pub fn get(self, path: &str, handler: &str) -> Self {
        self.route(HttpMethod::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: &str) -> Self {
        self.route(HttpMethod::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: &str) -> Self {
        self.route(HttpMethod::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: &str) -> Self {
        self.route(HttpMethod::Delete, path, handler)
    }

    pub fn patch(self, path: &str, handler: &str) -> Self {
        self.route(HttpMethod::Patch, path, handler)
    }

    /// Extra middleware for the last route, run after the defaults.
    pub fn with<I, N>(self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MiddlewareName>,
    {
        self.modify_last("with", |route| route.with_middlewares(names))
    }

    /// Defaults the last route opts out of.
    pub fn without<I, N>(self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MiddlewareName>,
    {
        self.modify_last("without", |route| route.without_defaults(names))
    }

    pub fn roles<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify_last("roles", |route| route.with_roles(roles))
    }

    pub fn exclude_roles<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify_last("exclude_roles", |route| route.excluding_roles(roles))
    }

    pub fn build(self) -> Result<RouterConfig, RouterError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(RouterConfig::new(
                self.default_middlewares,
                self.default_roles,
                self.routes,
            )),
        }
    }

    fn modify_last(mut self, modifier: &str, f: impl FnOnce(RouteDefinition) -> RouteDefinition) -> Self {
        match self.routes.pop() {
            Some(route) => {
                self.routes.push(f(route));
                self
            }
            None => self.fail(RouterError::InvalidDeclaration {
                reason: format!("'{modifier}' used before any route was declared"),
            }),
        }
    }

    fn fail(mut self, error: RouterError) -> Self {
        self.error.get_or_insert(error);
        self
    }
}

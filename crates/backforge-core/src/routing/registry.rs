//! Middleware and controller registries.
//!
//! Registries are explicit context objects owned by the hosting application.
//! They are filled once at startup and only read afterwards; there is no
//! removal API.
//!
//! Validation does not need callables, only names, so it is written against
//! the [`MiddlewareCatalog`] / [`ControllerCatalog`] traits. The live
//! registries implement them, and so does [`StaticCatalog`], which holds
//! nothing but names discovered by scanning source files.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::routing::model::{HandlerRef, MiddlewareName};
use crate::routing::request::{Flow, RequestContext, Response};

// ── Capability traits ─────────────────────────────────────────────────────────

/// A unit of pre-handler request processing.
pub trait Middleware: Send + Sync {
    fn invoke(&self, request: &mut RequestContext) -> Flow;
}

impl<F> Middleware for F
where
    F: Fn(&mut RequestContext) -> Flow + Send + Sync,
{
    fn invoke(&self, request: &mut RequestContext) -> Flow {
        self(request)
    }
}

/// Terminal request processing for a route.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &RequestContext) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&RequestContext) -> Response + Send + Sync,
{
    fn handle(&self, request: &RequestContext) -> Response {
        self(request)
    }
}

/// Builds the role-check middleware for one route's active role set.
pub trait RoleCheckFactory: Send + Sync {
    fn build(&self, roles: &[String]) -> Arc<dyn Middleware>;
}

impl<F> RoleCheckFactory for F
where
    F: Fn(&[String]) -> Arc<dyn Middleware> + Send + Sync,
{
    fn build(&self, roles: &[String]) -> Arc<dyn Middleware> {
        self(roles)
    }
}

/// Lets the caller through when its principal holds any of `roles`.
///
/// No principal → 401, principal without a matching role → 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireAnyRole {
    roles: Vec<String>,
}

impl RequireAnyRole {
    pub fn new(roles: &[String]) -> Self {
        Self {
            roles: roles.to_vec(),
        }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

impl Middleware for RequireAnyRole {
    fn invoke(&self, request: &mut RequestContext) -> Flow {
        match request.principal() {
            None => Flow::Respond(Response::unauthorized()),
            Some(p) if p.has_any_role(&self.roles) => Flow::Next,
            Some(_) => Flow::Respond(Response::forbidden()),
        }
    }
}

/// Default role-check factory producing [`RequireAnyRole`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleGuard;

impl RoleCheckFactory for RoleGuard {
    fn build(&self, roles: &[String]) -> Arc<dyn Middleware> {
        Arc::new(RequireAnyRole::new(roles))
    }
}

// ── Lookup traits ─────────────────────────────────────────────────────────────

/// Name-level view of a middleware registry.
pub trait MiddlewareCatalog {
    fn contains_middleware(&self, name: &MiddlewareName) -> bool;

    fn has_role_check(&self) -> bool;
}

/// Outcome of looking a [`HandlerRef`] up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResolution {
    Resolved,
    MissingController,
    MissingMethod,
}

/// Name-level view of a controller registry.
pub trait ControllerCatalog {
    fn locate(&self, handler: &HandlerRef) -> HandlerResolution;
}

// ── MiddlewareRegistry ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<MiddlewareName, Arc<dyn Middleware>>,
    role_check: Option<Arc<dyn RoleCheckFactory>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `name`. A later registration under the
    /// same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<MiddlewareName>, middleware: impl Middleware + 'static) {
        self.entries.insert(name.into(), Arc::new(middleware));
    }

    pub fn with(mut self, name: impl Into<MiddlewareName>, middleware: impl Middleware + 'static) -> Self {
        self.insert(name, middleware);
        self
    }

    pub fn set_role_check(&mut self, factory: impl RoleCheckFactory + 'static) {
        self.role_check = Some(Arc::new(factory));
    }

    pub fn with_role_check(mut self, factory: impl RoleCheckFactory + 'static) -> Self {
        self.set_role_check(factory);
        self
    }

    pub fn get(&self, name: &MiddlewareName) -> Option<&Arc<dyn Middleware>> {
        self.entries.get(name)
    }

    pub fn role_check(&self) -> Option<&Arc<dyn RoleCheckFactory>> {
        self.role_check.as_ref()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&MiddlewareName> {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MiddlewareCatalog for MiddlewareRegistry {
    fn contains_middleware(&self, name: &MiddlewareName) -> bool {
        self.entries.contains_key(name)
    }

    fn has_role_check(&self) -> bool {
        self.role_check.is_some()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("names", &self.names())
            .field("role_check", &self.role_check.is_some())
            .finish()
    }
}

// ── Controllers ───────────────────────────────────────────────────────────────

/// A named group of handlers.
#[derive(Clone, Default)]
pub struct Controller {
    methods: HashMap<String, Arc<dyn Handler>>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.methods.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("methods", &self.method_names())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Controller>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, controller: Controller) {
        self.controllers.insert(name.into(), controller);
    }

    pub fn with(mut self, name: impl Into<String>, controller: Controller) -> Self {
        self.insert(name, controller);
        self
    }

    pub fn handler(&self, handler: &HandlerRef) -> Option<&Arc<dyn Handler>> {
        self.controllers
            .get(handler.controller())
            .and_then(|c| c.get(handler.method()))
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl ControllerCatalog for ControllerRegistry {
    fn locate(&self, handler: &HandlerRef) -> HandlerResolution {
        match self.controllers.get(handler.controller()) {
            None => HandlerResolution::MissingController,
            Some(c) if c.get(handler.method()).is_some() => HandlerResolution::Resolved,
            Some(_) => HandlerResolution::MissingMethod,
        }
    }
}

// ── StaticCatalog ─────────────────────────────────────────────────────────────

/// Names only: what a project *declares* it registers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    middlewares: BTreeSet<MiddlewareName>,
    role_check: bool,
    controllers: BTreeMap<String, BTreeSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_middleware(&mut self, name: impl Into<MiddlewareName>) {
        self.middlewares.insert(name.into());
    }

    pub fn set_role_check(&mut self, present: bool) {
        self.role_check = present;
    }

    pub fn add_controller<I, S>(&mut self, name: impl Into<String>, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controllers
            .entry(name.into())
            .or_default()
            .extend(methods.into_iter().map(Into::into));
    }

    pub fn with_middleware(mut self, name: impl Into<MiddlewareName>) -> Self {
        self.add_middleware(name);
        self
    }

    pub fn with_role_check(mut self) -> Self {
        self.role_check = true;
        self
    }

    pub fn with_controller<I, S>(mut self, name: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_controller(name, methods);
        self
    }

    pub fn middleware_names(&self) -> impl Iterator<Item = &MiddlewareName> {
        self.middlewares.iter()
    }

    pub fn controller_names(&self) -> impl Iterator<Item = &str> {
        self.controllers.keys().map(String::as_str)
    }
}

impl MiddlewareCatalog for StaticCatalog {
    fn contains_middleware(&self, name: &MiddlewareName) -> bool {
        self.middlewares.contains(name)
    }

    fn has_role_check(&self) -> bool {
        self.role_check
    }
}

impl ControllerCatalog for StaticCatalog {
    fn locate(&self, handler: &HandlerRef) -> HandlerResolution {
        match self.controllers.get(handler.controller()) {
            None => HandlerResolution::MissingController,
            Some(methods) if methods.contains(handler.method()) => HandlerResolution::Resolved,
            Some(_) => HandlerResolution::MissingMethod,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::model::HttpMethod;
    use crate::routing::request::Principal;

    fn pass(_: &mut RequestContext) -> Flow {
        Flow::Next
    }

    #[test]
    fn registry_resolves_registered_names() {
        let registry = MiddlewareRegistry::new().with("logging", pass);
        assert!(registry.contains_middleware(&"logging".into()));
        assert!(!registry.contains_middleware(&"auth".into()));
        assert!(!registry.has_role_check());
    }

    #[test]
    fn controller_registry_distinguishes_missing_controller_and_method() {
        let controllers = ControllerRegistry::new().with(
            "users",
            Controller::new().method("list", |_: &RequestContext| Response::ok("[]")),
        );

        assert_eq!(
            controllers.locate(&HandlerRef::new("users", "list")),
            HandlerResolution::Resolved
        );
        assert_eq!(
            controllers.locate(&HandlerRef::new("users", "remove")),
            HandlerResolution::MissingMethod
        );
        assert_eq!(
            controllers.locate(&HandlerRef::new("orders", "list")),
            HandlerResolution::MissingController
        );
    }

    #[test]
    fn require_any_role_checks_principal() {
        let guard = RoleGuard.build(&["admin".to_string()]);

        let mut anonymous = RequestContext::new(HttpMethod::Get, "/");
        assert_eq!(
            guard.invoke(&mut anonymous),
            Flow::Respond(Response::unauthorized())
        );

        let mut editor = RequestContext::new(HttpMethod::Get, "/");
        editor.set_principal(Principal::new("u1", ["editor"]));
        assert_eq!(guard.invoke(&mut editor), Flow::Respond(Response::forbidden()));

        let mut admin = RequestContext::new(HttpMethod::Get, "/");
        admin.set_principal(Principal::new("u2", ["editor", "admin"]));
        assert_eq!(guard.invoke(&mut admin), Flow::Next);
    }

    #[test]
    fn static_catalog_merges_controller_methods() {
        let catalog = StaticCatalog::new()
            .with_controller("users", ["list"])
            .with_controller("users", ["get"]);

        assert_eq!(
            catalog.locate(&HandlerRef::new("users", "get")),
            HandlerResolution::Resolved
        );
        assert_eq!(
            catalog.locate(&HandlerRef::new("users", "list")),
            HandlerResolution::Resolved
        );
    }
}

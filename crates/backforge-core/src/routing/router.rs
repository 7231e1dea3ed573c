//! The [`DeclarativeRouter`] facade.

use std::sync::Arc;

use crate::routing::chain::{ChainPlan, build_chain, compose};
use crate::routing::error::{RouterError, ValidationReport};
use crate::routing::model::{RouteDefinition, RouterConfig};
use crate::routing::mount::{RoutingSurface, apply};
use crate::routing::registry::{
    Controller, ControllerRegistry, Middleware, MiddlewareRegistry, RoleCheckFactory,
};
use crate::routing::validator::validate;

/// A route table together with the registries it is resolved against.
///
/// Registration methods consume and return the router so a host can declare
/// everything in one expression before calling [`validate`](Self::validate)
/// or [`apply_to`](Self::apply_to).
#[derive(Debug, Clone)]
pub struct DeclarativeRouter {
    config: RouterConfig,
    middlewares: MiddlewareRegistry,
    controllers: ControllerRegistry,
}

impl DeclarativeRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            middlewares: MiddlewareRegistry::new(),
            controllers: ControllerRegistry::new(),
        }
    }

    pub fn register_middleware(mut self, name: &str, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.insert(name, middleware);
        self
    }

    pub fn register_role_check(mut self, factory: impl RoleCheckFactory + 'static) -> Self {
        self.middlewares.set_role_check(factory);
        self
    }

    pub fn register_controller(mut self, name: &str, controller: Controller) -> Self {
        self.controllers.insert(name, controller);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn middlewares(&self) -> &MiddlewareRegistry {
        &self.middlewares
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn validate(&self) -> ValidationReport {
        validate(&self.config, &self.middlewares, &self.controllers)
    }

    /// Name-level chain for `route`.
    pub fn plan_for(&self, route: &RouteDefinition) -> ChainPlan {
        compose(&self.config, route)
    }

    /// Resolved chain for `route`.
    pub fn chain_for(&self, route: &RouteDefinition) -> Result<Vec<Arc<dyn Middleware>>, RouterError> {
        build_chain(&self.config, route, &self.middlewares)
    }

    pub fn apply_to<S: RoutingSurface>(&self, surface: S) -> Result<S, RouterError> {
        apply(&self.config, &self.middlewares, &self.controllers, surface)
    }
}

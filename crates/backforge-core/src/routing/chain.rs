//! Chain builder.
//!
//! [`compose`] is the name-level part (defaults, disable filter, extras,
//! role overlay). [`resolve`] turns a plan into callables and fails on the
//! first name it cannot find; a chain never silently loses an entry.

use std::fmt;
use std::sync::Arc;

use crate::routing::error::{RouteIssue, RouterError};
use crate::routing::model::{MiddlewareName, ROLE_CHECK, RouteDefinition, RouterConfig};
use crate::routing::registry::{Middleware, MiddlewareRegistry};

/// Ordered middleware names and the active role set for one route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainPlan {
    pub middlewares: Vec<MiddlewareName>,
    pub roles: Vec<String>,
}

impl ChainPlan {
    /// A role-check entry is appended after the named middleware.
    pub fn needs_role_check(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Names as they will run, with the role check rendered as
    /// `roleCheck(a, b)`.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.middlewares.iter().map(ToString::to_string).collect();
        if self.needs_role_check() {
            labels.push(format!("{ROLE_CHECK}({})", self.roles.join(", ")));
        }
        labels
    }
}

impl fmt::Display for ChainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.labels().join(", "))
    }
}

/// Compute the chain plan for `route` under `config`'s defaults.
pub fn compose(config: &RouterConfig, route: &RouteDefinition) -> ChainPlan {
    let mut middlewares = config.default_middlewares().to_vec();
    let mut roles = config.default_roles().to_vec();

    if !route.disabled_defaults().is_empty() {
        middlewares.retain(|name| !route.disabled_defaults().contains(name));
    }

    if !route.enabled_extra().is_empty() {
        middlewares.extend(route.enabled_extra().iter().cloned());
    }

    if !route.exclude_roles().is_empty() {
        roles.retain(|role| !route.exclude_roles().contains(role));
    }

    // Applied after the exclusion, so an explicit role list always wins.
    if !route.roles().is_empty() {
        roles = route.roles().to_vec();
    }

    ChainPlan { middlewares, roles }
}

/// Resolve a plan against the registry, in order.
pub fn resolve(
    plan: &ChainPlan,
    route: &RouteDefinition,
    registry: &MiddlewareRegistry,
) -> Result<Vec<Arc<dyn Middleware>>, RouterError> {
    let mut chain = Vec::with_capacity(plan.middlewares.len() + 1);

    for name in &plan.middlewares {
        let middleware = registry
            .get(name)
            .ok_or_else(|| RouteIssue::missing_middleware(route, name))?;
        chain.push(Arc::clone(middleware));
    }

    if plan.needs_role_check() {
        let factory = registry
            .role_check()
            .ok_or_else(|| RouteIssue::missing_middleware(route, &MiddlewareName::from(ROLE_CHECK)))?;
        chain.push(factory.build(&plan.roles));
    }

    Ok(chain)
}

/// [`compose`] followed by [`resolve`].
pub fn build_chain(
    config: &RouterConfig,
    route: &RouteDefinition,
    registry: &MiddlewareRegistry,
) -> Result<Vec<Arc<dyn Middleware>>, RouterError> {
    resolve(&compose(config, route), route, registry)
}

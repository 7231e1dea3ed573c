//! Computed middleware chains of a project's route table.

use std::path::Path;

use tracing::instrument;

use crate::application::{ports::Filesystem, services::project_loader::load_routes};
use crate::error::ForgeResult;
use crate::routing::{ChainPlan, HandlerRef, HttpMethod, RouterConfig, compose};

/// One row of `backforge routes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRoute {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerRef,
    pub chain: ChainPlan,
    /// Declares both `roles` and `excludeRoles`; only `roles` takes effect.
    pub ambiguous_roles: bool,
}

pub fn plan_table(table: &RouterConfig) -> Vec<PlannedRoute> {
    table
        .routes()
        .iter()
        .map(|route| PlannedRoute {
            method: route.method(),
            path: route.path().to_string(),
            handler: route.handler().clone(),
            chain: compose(table, route),
            ambiguous_roles: route.has_ambiguous_roles(),
        })
        .collect()
}

pub struct RoutePlanService {
    filesystem: Box<dyn Filesystem>,
}

impl RoutePlanService {
    pub fn new(filesystem: Box<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn plan(&self, root: &Path) -> ForgeResult<Vec<PlannedRoute>> {
        let table = load_routes(self.filesystem.as_ref(), root)?;
        Ok(plan_table(&table))
    }
}

//! Everything derivable from a `ProjectConfig` before any template is read.
//!
//! A blueprint answers: which middleware units exist (and which are
//! defaults), what the initial route table looks like, which npm packages
//! and environment variables the project needs and which containers
//! `docker-compose.yml` should start.

use std::collections::BTreeMap;

use crate::domain::{
    capabilities::{
        self, AUTHENTICATE, ComposeService, Contribution, EnvVar, MiddlewareDef,
    },
    entities::project_config::ProjectConfig,
    value_objects::{Feature, Language},
};
use crate::routing::{HandlerRef, HttpMethod, MiddlewareName, RouteDefinition, RouterConfig};

/// A generated middleware file and its registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiddlewareUnit {
    pub name: &'static str,
    pub stem: &'static str,
    /// Part of the default chain of every route.
    pub default: bool,
}

impl MiddlewareUnit {
    fn from_def(def: MiddlewareDef, default: bool) -> Self {
        Self {
            name: def.name,
            stem: def.stem,
            default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Blueprint {
    middlewares: Vec<MiddlewareUnit>,
    role_check: bool,
    routes: RouterConfig,
    dependencies: BTreeMap<String, String>,
    dev_dependencies: BTreeMap<String, String>,
    env: Vec<EnvVar>,
    services: Vec<&'static ComposeService>,
}

impl Blueprint {
    pub fn derive(config: &ProjectConfig) -> Self {
        let middlewares = middleware_units(config);
        let role_check = config.auth().is_some();
        let routes = initial_routes(config, &middlewares);

        let mut blueprint = Self {
            middlewares,
            role_check,
            routes,
            dependencies: BTreeMap::new(),
            dev_dependencies: BTreeMap::new(),
            env: Vec::new(),
            services: Vec::new(),
        };

        for contribution in contributions(config) {
            blueprint.absorb(contribution, config.language());
        }
        blueprint
    }

    fn absorb(&mut self, contribution: Contribution, language: Language) {
        for package in contribution.packages {
            self.dependencies
                .insert(package.name.to_string(), package.version.to_string());
        }
        if language == Language::TypeScript {
            for package in contribution.types {
                self.dev_dependencies
                    .insert(package.name.to_string(), package.version.to_string());
            }
        }
        for var in contribution.env {
            if !self.env.iter().any(|e| e.key == var.key) {
                self.env.push(*var);
            }
        }
        if let Some(service) = contribution.service
            && !self.services.iter().any(|s| s.name == service.name)
        {
            self.services.push(service);
        }
    }

    pub fn middlewares(&self) -> &[MiddlewareUnit] {
        &self.middlewares
    }

    pub fn default_middlewares(&self) -> impl Iterator<Item = &MiddlewareUnit> {
        self.middlewares.iter().filter(|m| m.default)
    }

    /// Whether a role-check factory is generated and registered.
    pub fn has_role_check(&self) -> bool {
        self.role_check
    }

    pub fn routes(&self) -> &RouterConfig {
        &self.routes
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    pub fn dev_dependencies(&self) -> &BTreeMap<String, String> {
        &self.dev_dependencies
    }

    pub fn env(&self) -> &[EnvVar] {
        &self.env
    }

    pub fn services(&self) -> &[&'static ComposeService] {
        &self.services
    }

    /// Controllers referenced by the initial route table.
    pub fn controllers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for route in self.routes.routes() {
            let name = route.handler().controller();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

fn middleware_units(config: &ProjectConfig) -> Vec<MiddlewareUnit> {
    let mut units: Vec<MiddlewareUnit> = capabilities::FEATURE_REGISTRY
        .iter()
        .filter(|def| config.has_feature(def.feature))
        .filter_map(|def| def.middleware)
        .map(|def| MiddlewareUnit::from_def(def, true))
        .collect();

    if config.auth().is_some() {
        units.push(MiddlewareUnit::from_def(AUTHENTICATE, false));
    }
    units
}

fn initial_routes(config: &ProjectConfig, units: &[MiddlewareUnit]) -> RouterConfig {
    let defaults: Vec<MiddlewareName> = units
        .iter()
        .filter(|u| u.default)
        .map(|u| MiddlewareName::new(u.name))
        .collect();

    let mut health = RouteDefinition::new(
        HttpMethod::Get,
        "/health",
        HandlerRef::new("health", "check"),
    );
    if config.has_feature(Feature::RequestLogging)
        && let Some(logger) = capabilities::find_feature(Feature::RequestLogging)
            .and_then(|d| d.middleware)
    {
        health = health.without_defaults([logger.name]);
    }

    let mut table = RouterConfig::new(defaults, Vec::new(), Vec::new()).with_route(health);

    if config.auth().is_some() {
        table = table
            .with_route(
                RouteDefinition::new(HttpMethod::Get, "/me", HandlerRef::new("account", "me"))
                    .with_middlewares([AUTHENTICATE.name]),
            )
            .with_route(
                RouteDefinition::new(
                    HttpMethod::Get,
                    "/admin/stats",
                    HandlerRef::new("account", "stats"),
                )
                .with_middlewares([AUTHENTICATE.name])
                .with_roles(["admin"]),
            );
    }
    table
}

fn contributions(config: &ProjectConfig) -> Vec<Contribution> {
    let mut all = vec![capabilities::base_contribution(config.language())];

    if let Some(def) = capabilities::find_framework(config.framework()) {
        all.push(def.contribution);
    }
    if let Some(def) = capabilities::find_database(config.database()) {
        all.push(def.contribution);
    }
    if let Some(def) = capabilities::find_auth(config.auth()) {
        all.push(def.contribution);
    }
    if let Some(def) = capabilities::find_queue(config.queue()) {
        all.push(def.contribution);
    }
    if let Some(def) = capabilities::find_lock(config.lock()) {
        all.push(def.contribution);
    }
    for feature in config.features() {
        if let Some(def) = capabilities::find_feature(*feature) {
            all.push(def.contribution_for(config.framework()));
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        AuthStrategy, Database, Framework, LockBackend, Queue,
    };
    use crate::routing::ROLE_CHECK;

    fn names(bp: &Blueprint) -> Vec<&'static str> {
        bp.middlewares().iter().map(|m| m.name).collect()
    }

    #[test]
    fn default_project_has_logger_and_cors() {
        let config = ProjectConfig::builder().name("svc").build().unwrap();
        let bp = Blueprint::derive(&config);

        assert_eq!(names(&bp), ["requestLogger", "cors"]);
        assert!(!bp.has_role_check());
        assert_eq!(bp.routes().routes().len(), 1);
        assert_eq!(bp.routes().routes()[0].disabled_defaults(), ["requestLogger"]);
        assert_eq!(bp.controllers(), ["health"]);
        assert!(bp.dependencies().contains_key("express"));
        assert!(bp.dependencies().contains_key("cors"));
        assert!(bp.dev_dependencies().contains_key("typescript"));
        assert!(bp.services().is_empty());
    }

    #[test]
    fn auth_adds_authenticate_and_role_protected_route() {
        let config = ProjectConfig::builder()
            .name("svc")
            .auth(AuthStrategy::Jwt)
            .build()
            .unwrap();
        let bp = Blueprint::derive(&config);

        assert!(bp.has_role_check());
        assert_eq!(names(&bp), ["requestLogger", "cors", "authenticate"]);
        assert_eq!(bp.default_middlewares().count(), 2);

        let admin = &bp.routes().routes()[2];
        assert_eq!(admin.path(), "/admin/stats");
        assert_eq!(admin.roles(), ["admin"]);
        assert_eq!(admin.enabled_extra(), ["authenticate"]);
        assert_ne!(admin.enabled_extra()[0].as_str(), ROLE_CHECK);
        assert_eq!(bp.controllers(), ["health", "account"]);
        assert!(bp.env().iter().any(|e| e.key == "JWT_SECRET"));
    }

    #[test]
    fn redis_service_is_shared_between_queue_and_lock() {
        let config = ProjectConfig::builder()
            .name("svc")
            .queue(Queue::BullMq)
            .lock(LockBackend::Redis)
            .database(Database::Postgres)
            .build()
            .unwrap();
        let bp = Blueprint::derive(&config);

        let services: Vec<_> = bp.services().iter().map(|s| s.name).collect();
        assert_eq!(services, ["postgres", "redis"]);
        let redis_urls = bp.env().iter().filter(|e| e.key == "REDIS_URL").count();
        assert_eq!(redis_urls, 1);
    }

    #[test]
    fn javascript_projects_have_no_type_packages() {
        let config = ProjectConfig::builder()
            .name("svc")
            .language(Language::JavaScript)
            .database(Database::Postgres)
            .build()
            .unwrap();
        let bp = Blueprint::derive(&config);
        assert!(bp.dev_dependencies().is_empty());
        assert!(bp.dependencies().contains_key("pg"));
    }

    #[test]
    fn hono_rate_limit_uses_hono_package() {
        let config = ProjectConfig::builder()
            .name("svc")
            .framework(Framework::Hono)
            .feature(Feature::RateLimit)
            .build()
            .unwrap();
        let bp = Blueprint::derive(&config);
        assert!(bp.dependencies().contains_key("hono-rate-limiter"));
        assert!(!bp.dependencies().contains_key("cors"));
        assert_eq!(names(&bp), ["requestLogger", "cors", "rateLimit"]);
    }

    #[test]
    fn without_logging_health_keeps_all_defaults() {
        let config = ProjectConfig::builder()
            .name("svc")
            .without_default_features()
            .build()
            .unwrap();
        let bp = Blueprint::derive(&config);
        assert!(bp.middlewares().is_empty());
        assert!(bp.routes().routes()[0].disabled_defaults().is_empty());
    }
}

//! Static validation of a route table against name catalogs.

use crate::routing::chain::compose;
use crate::routing::error::{RouteIssue, ValidationReport};
use crate::routing::model::{MiddlewareName, ROLE_CHECK, RouterConfig};
use crate::routing::registry::{ControllerCatalog, MiddlewareCatalog};

/// Collect every unresolvable reference in `config`.
///
/// Routes are checked in table order and nothing stops early. A route's
/// middleware candidates are the defaults plus its extras *before* its
/// disable list is applied, so a default a route opts out of must still be
/// registered.
pub fn validate<M, C>(config: &RouterConfig, middlewares: &M, controllers: &C) -> ValidationReport
where
    M: MiddlewareCatalog + ?Sized,
    C: ControllerCatalog + ?Sized,
{
    let mut issues = Vec::new();

    for route in config.routes() {
        if let Some(issue) = RouteIssue::for_handler(route, controllers.locate(route.handler())) {
            issues.push(issue);
        }

        let mut seen: Vec<&MiddlewareName> = Vec::new();
        let candidates = config
            .default_middlewares()
            .iter()
            .chain(route.enabled_extra());
        for name in candidates {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            if !middlewares.contains_middleware(name) {
                issues.push(RouteIssue::missing_middleware(route, name));
            }
        }

        if compose(config, route).needs_role_check() && !middlewares.has_role_check() {
            issues.push(RouteIssue::missing_middleware(
                route,
                &MiddlewareName::from(ROLE_CHECK),
            ));
        }
    }

    ValidationReport::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::model::{HandlerRef, HttpMethod, RouteDefinition};
    use crate::routing::registry::StaticCatalog;

    fn get(path: &str, handler: &str) -> RouteDefinition {
        RouteDefinition::new(HttpMethod::Get, path, HandlerRef::parse(handler).unwrap())
    }

    fn controllers() -> StaticCatalog {
        StaticCatalog::new().with_controller("pages", ["home", "about", "contact"])
    }

    #[test]
    fn clean_table_is_valid() {
        let config = RouterConfig::new(
            vec!["logging".into()],
            Vec::new(),
            vec![get("/", "pages.home"), get("/about", "pages.about")],
        );
        let catalog = controllers().with_middleware("logging");

        let report = validate(&config, &catalog, &catalog);
        assert!(report.is_valid());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn issues_are_batched_across_routes() {
        let config = RouterConfig::new(
            Vec::new(),
            Vec::new(),
            vec![
                get("/", "pages.home").with_middlewares(["one"]),
                get("/about", "pages.about").with_middlewares(["two"]),
                get("/contact", "pages.contact").with_middlewares(["three"]),
            ],
        );
        let catalog = controllers();

        let report = validate(&config, &catalog, &catalog);
        assert!(!report.is_valid());
        assert_eq!(report.len(), 3);
        let paths: Vec<_> = report.issues().iter().map(RouteIssue::route_path).collect();
        assert_eq!(paths, ["/", "/about", "/contact"]);
    }

    #[test]
    fn disabled_default_must_still_exist() {
        let config = RouterConfig::new(
            vec!["logging".into()],
            Vec::new(),
            vec![get("/", "pages.home").without_defaults(["logging"])],
        );
        let catalog = controllers();

        let report = validate(&config, &catalog, &catalog);
        assert_eq!(report.len(), 1);
        assert!(matches!(
            &report.issues()[0],
            RouteIssue::UnregisteredMiddleware { name, .. } if name == "logging"
        ));
    }

    #[test]
    fn handler_issues_name_controller_or_method() {
        let config = RouterConfig::new(
            Vec::new(),
            Vec::new(),
            vec![get("/a", "missing.list"), get("/b", "pages.missing")],
        );
        let catalog = controllers();

        let errors = validate(&config, &catalog, &catalog).errors();
        assert_eq!(
            errors,
            [
                "GET /a: controller 'missing' is not registered",
                "GET /b: controller 'pages' has no method 'missing'",
            ]
        );
    }

    #[test]
    fn repeated_name_is_reported_once_per_route() {
        let config = RouterConfig::new(
            vec!["auth".into()],
            Vec::new(),
            vec![get("/", "pages.home").with_middlewares(["auth"])],
        );
        let catalog = controllers();

        assert_eq!(validate(&config, &catalog, &catalog).len(), 1);
    }

    #[test]
    fn active_roles_require_role_check_factory() {
        let config = RouterConfig::new(
            Vec::new(),
            Vec::new(),
            vec![
                get("/", "pages.home"),
                get("/about", "pages.about").with_roles(["admin"]),
            ],
        );

        let without = controllers();
        let report = validate(&config, &without, &without);
        assert_eq!(report.errors(), ["GET /about: middleware 'roleCheck' is not registered"]);

        let with = controllers().with_role_check();
        assert!(validate(&config, &with, &with).is_valid());
    }
}

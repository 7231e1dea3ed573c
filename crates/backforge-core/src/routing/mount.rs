//! Mounting a validated route table onto a routing surface.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::chain::build_chain;
use crate::routing::error::{RouteIssue, RouterError};
use crate::routing::model::{HttpMethod, RouterConfig};
use crate::routing::registry::{ControllerCatalog, ControllerRegistry, Handler, Middleware, MiddlewareRegistry};
use crate::routing::request::{Flow, RequestContext, Response};
use crate::routing::validator::validate;

/// Verb casing a surface expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodCase {
    #[default]
    Upper,
    Lower,
}

impl MethodCase {
    pub fn apply(self, method: HttpMethod) -> &'static str {
        match self {
            Self::Upper => method.as_str(),
            Self::Lower => method.as_lower(),
        }
    }
}

/// One route ready to serve: the resolved chain plus its handler.
#[derive(Clone)]
pub struct MountedRoute {
    pub method: HttpMethod,
    /// `method` in the surface's casing.
    pub verb: &'static str,
    pub path: String,
    pub chain: Vec<Arc<dyn Middleware>>,
    pub handler: Arc<dyn Handler>,
}

impl MountedRoute {
    /// Run the chain in order, then the handler. A middleware answering
    /// with a response ends the run there.
    pub fn run(&self, request: &mut RequestContext) -> Response {
        for middleware in &self.chain {
            if let Flow::Respond(response) = middleware.invoke(request) {
                return response;
            }
        }
        self.handler.handle(request)
    }
}

impl fmt::Debug for MountedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedRoute")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}

/// Whatever native routing primitive routes get registered on.
#[cfg_attr(test, mockall::automock)]
pub trait RoutingSurface {
    fn method_case(&self) -> MethodCase {
        MethodCase::Upper
    }

    fn register(&mut self, route: MountedRoute);
}

/// Validate `config`, then register every route on `surface` in table order.
///
/// An invalid table is refused as a whole: the error carries every issue and
/// the surface has seen no `register` call. Chains are built exactly once
/// per route and all of them are built before the first registration.
pub fn apply<S>(
    config: &RouterConfig,
    middlewares: &MiddlewareRegistry,
    controllers: &ControllerRegistry,
    mut surface: S,
) -> Result<S, RouterError>
where
    S: RoutingSurface,
{
    let report = validate(config, middlewares, controllers);
    if !report.is_valid() {
        return Err(RouterError::InvalidRouteTable(report));
    }

    let case = surface.method_case();
    let mut mounted = Vec::with_capacity(config.routes().len());
    for route in config.routes() {
        let chain = build_chain(config, route, middlewares)?;
        let handler = match controllers.handler(route.handler()) {
            Some(handler) => Arc::clone(handler),
            None => {
                let resolution = controllers.locate(route.handler());
                return Err(RouteIssue::for_handler(route, resolution)
                    .map(RouterError::Unresolved)
                    .unwrap_or_else(|| RouterError::InvalidDeclaration {
                        reason: format!("handler '{}' did not resolve", route.handler()),
                    }));
            }
        };

        mounted.push(MountedRoute {
            method: route.method(),
            verb: case.apply(route.method()),
            path: route.path().to_string(),
            chain,
            handler,
        });
    }

    for route in mounted {
        surface.register(route);
    }
    Ok(surface)
}

// ── MethodTable ───────────────────────────────────────────────────────────────

/// In-process routing surface: a dispatch table keyed by verb and path.
///
/// Path patterns support `:name` segments (captured into request params) and
/// a trailing `*`. The first registered route that matches wins.
#[derive(Debug, Default)]
pub struct MethodTable {
    routes: Vec<MountedRoute>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[MountedRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// `(verb, path)` pairs in registration order.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.routes
            .iter()
            .map(|r| (r.verb, r.path.as_str()))
            .collect()
    }

    /// Route the request and run it. Unmatched requests get a 404.
    pub fn dispatch(&self, mut request: RequestContext) -> Response {
        let verb = request.method().as_str();
        for route in &self.routes {
            if route.verb != verb {
                continue;
            }
            if let Some(params) = match_path(&route.path, request.path()) {
                request.set_params(params);
                return route.run(&mut request);
            }
        }
        Response::not_found()
    }
}

impl RoutingSurface for MethodTable {
    fn register(&mut self, route: MountedRoute) {
        self.routes.push(route);
    }
}

fn match_path(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    let mut wanted = pattern.trim_matches('/').split('/').filter(|s| !s.is_empty());
    let mut actual = path.trim_matches('/').split('/').filter(|s| !s.is_empty());

    loop {
        match (wanted.next(), actual.next()) {
            (None, None) => return Some(params),
            (Some("*"), _) => return Some(params),
            (Some(p), Some(a)) if p.starts_with(':') => {
                params.insert(p[1..].to_string(), a.to_string());
            }
            (Some(p), Some(a)) if p == a => {}
            _ => return None,
        }
    }
}

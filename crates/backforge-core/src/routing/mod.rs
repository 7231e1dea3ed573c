//! Declarative route / middleware composition.
//!
//! A [`RouterConfig`] declares global default middleware and roles plus an
//! ordered table of routes. For each route the chain builder computes the
//! middleware that run before its handler:
//!
//! 1. start from the defaults,
//! 2. drop the route's disabled defaults,
//! 3. append the route's extras,
//! 4. drop excluded roles, then let explicit route roles replace the set,
//! 5. when roles remain, append a role check built by the registered factory.
//!
//! [`validate`] reports every unresolvable name in one pass and [`apply`]
//! refuses to mount anything unless validation is clean.
//!
//! Nothing in this module logs or touches the filesystem.

pub mod builder;
pub mod chain;
pub mod error;
pub mod model;
pub mod mount;
pub mod registry;
pub mod request;
pub mod router;
pub mod validator;

pub use builder::RouteBuilder;
pub use chain::{ChainPlan, build_chain, compose, resolve};
pub use error::{RouteIssue, RouterError, ValidationReport};
pub use model::{HandlerRef, HttpMethod, MiddlewareName, ROLE_CHECK, RouteDefinition, RouterConfig};
pub use mount::{MethodCase, MethodTable, MountedRoute, RoutingSurface, apply};
pub use registry::{
    Controller, ControllerCatalog, ControllerRegistry, Handler, HandlerResolution, Middleware,
    MiddlewareCatalog, MiddlewareRegistry, RequireAnyRole, RoleCheckFactory, RoleGuard,
    StaticCatalog,
};
pub use request::{Flow, Principal, RequestContext, Response};
pub use router::DeclarativeRouter;
pub use validator::validate;

//! backforge core: declarative routing plus Node backend scaffolding.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          backforge-cli (CLI)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  Scaffold, Component, Audit, RoutePlan  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     Ports (Filesystem, Templates)       │
//! │  implemented by backforge-adapters      │
//! └──────────────────┬──────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   Domain (ProjectConfig, Blueprint)     │
//! │   Routing (RouterConfig, chains)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Routing
//!
//! ```
//! use backforge_core::routing::{
//!     Controller, DeclarativeRouter, Flow, HttpMethod, MethodTable, RequestContext, Response,
//!     RouteBuilder,
//! };
//!
//! let config = RouteBuilder::new()
//!     .default_middleware("requestLogger")
//!     .get("/health", "health.check")
//!     .without(["requestLogger"])
//!     .build()
//!     .unwrap();
//!
//! let router = DeclarativeRouter::new(config)
//!     .register_middleware("requestLogger", |_: &mut RequestContext| Flow::Next)
//!     .register_controller(
//!         "health",
//!         Controller::new().method("check", |_: &RequestContext| Response::ok("up")),
//!     );
//!
//! let table = router.apply_to(MethodTable::new()).unwrap();
//! let response = table.dispatch(RequestContext::new(HttpMethod::Get, "/health"));
//! assert_eq!(response, Response::ok("up"));
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod routing;

/// Common imports for callers of the core crate.
pub mod prelude {
    pub use crate::application::{
        AuditReport, AuditService, ComponentReport, ComponentService, RoutePlanService,
        ScaffoldReport, ScaffoldService, WriteMode,
        ports::{Filesystem, TemplateCatalog, TemplateRenderer},
    };
    pub use crate::domain::{
        AuthStrategy, ComponentKind, ComponentName, ComponentSpec, Database, Feature, Framework,
        Language, LockBackend, ProjectConfig, ProjectStructure, Queue, RenderContext,
        TemplateFile,
    };
    pub use crate::error::{ForgeError, ForgeResult};
    pub use crate::routing::{DeclarativeRouter, RouteBuilder, RouterConfig};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

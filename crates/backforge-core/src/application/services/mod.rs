//! Application services - orchestrate use cases.
//!
//! Each service coordinates the domain layer and the ports for one command:
//! generate a project, add a component, audit a project, show its chains.

pub mod audit_service;
pub mod component_service;
pub mod project_loader;
pub mod route_plan_service;
pub mod scaffold_service;

pub use audit_service::{AuditIssue, AuditReport, AuditService};
pub use component_service::{ComponentReport, ComponentService};
pub use project_loader::{load_project, load_routes, routes_text};
pub use route_plan_service::{PlannedRoute, RoutePlanService, plan_table};
pub use scaffold_service::{ScaffoldReport, ScaffoldService, WriteMode};

//! Application layer for backforge.
//!
//! This layer contains:
//! - **Services**: use case orchestration (scaffold, add, audit, route plans)
//! - **Ports**: traits for the filesystem and templates
//! - **Splice / scan**: line-level editing and reading of generated sources
//! - **Errors**: application-specific error types
//!
//! Business rules live in `crate::domain` and `crate::routing`; this layer
//! only sequences them.

pub mod error;
pub mod ports;
pub mod scan;
pub mod services;
pub mod splice;

pub use services::{
    AuditIssue, AuditReport, AuditService, ComponentReport, ComponentService, PlannedRoute,
    RoutePlanService, ScaffoldReport, ScaffoldService, WriteMode,
};

pub use ports::{Filesystem, TemplateCatalog, TemplateRenderer};

pub use error::ApplicationError;

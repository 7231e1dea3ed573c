//! Template catalogs.
//!
//! [`BuiltinCatalog`] serves the templates compiled into the binary.
//! [`OverlayCatalog`] layers a directory on top of another catalog so teams
//! can replace or add files without rebuilding.

mod builtin;
mod overlay;

pub use builtin::BuiltinCatalog;
pub use overlay::{OverlayCatalog, TEMPLATES_DIR_ENV, default_catalog};

//! Policy catalog and role resolution.

pub mod catalog;
pub mod resolve;

pub use catalog::{ConfigPolicyCatalog, PolicyCatalog};
pub use resolve::resolve_role;

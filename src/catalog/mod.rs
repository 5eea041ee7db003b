//! Requirement catalog: categories of declarative checks.

pub mod loader;
pub mod model;

pub use loader::load_catalog;
pub use model::{Catalog, Category, Check, CheckKind, Severity};

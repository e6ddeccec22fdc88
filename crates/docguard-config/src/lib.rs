//! # docguard-config
//!
//! Configuration schema, loading, and validation for the docguard fraud
//! pipeline. Settings come from a YAML file, environment variables, or
//! both; environment variables win.

pub mod schema;
pub mod validation;

pub use schema::*;
pub use validation::*;

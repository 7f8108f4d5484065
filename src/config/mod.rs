//! Declarative spec files: a TOML description of an application's
//! parameters, built into a finalized [`crate::spec::Spec`].

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{ParamEntry, SpecFile};

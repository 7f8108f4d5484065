//! Parameter model and specification registry.
//!
//! ```text
//! SpecBuilder::register / add_* → SpecBuilder::finalize → Spec → Parser
//! ```
//!
//! A [`SpecBuilder`] accumulates [`Param`] descriptors and is consumed by
//! `finalize()`, so a finalized [`Spec`] can no longer change.

mod error;
mod help;
mod param;
mod registry;
mod value;
pub mod vet;

pub use error::SpecError;
pub use param::{
    attribute_name, version_message, Arity, Keys, Param, ParamKind, ParamOptions, Role, ValueType,
};
pub use registry::{Spec, SpecBuilder};
pub use value::Value;
pub use vet::{PathCheck, Validator, VetError};

//! Configuration errors raised while building a specification.

use thiserror::Error;

/// Errors that can occur while registering or finalizing parameters.
///
/// These are programmer errors in the declaration of a command line, so they
/// are reported immediately and never repaired by renaming or dropping a
/// conflicting parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A primary or secondary key is already registered.
    #[error("Duplicate parameter key, '{key}' rejected")]
    DuplicateKey { key: String },

    /// Two or more parameters derive the same attribute name.
    #[error("Duplicate attribute names, {}, for command line options", .names.join(", "))]
    DuplicateAttributes { names: Vec<String> },

    /// Key does not follow the `-x`, `--name` or bare-name syntax.
    #[error("'{key}' is not a valid key: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Positional parameters are addressed by one name only.
    #[error("{key} is positional: long key not permitted")]
    LongKeyOnPositional { key: String },

    /// A positional constructor was given a dashed key.
    #[error("positional parameter name, {key}, illegal: no leading dashes allowed")]
    NotPositional { key: String },

    /// A keyword constructor was given a key without leading dashes.
    #[error("command line key, {key}, does not start with '-' as required")]
    NotKeyword { key: String },

    /// Arity, value type, role or kind tag that names nothing known.
    #[error("{kind}, {tag} not recognized")]
    UnknownTag { kind: &'static str, tag: String },
}

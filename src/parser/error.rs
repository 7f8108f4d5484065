//! Parse-time errors.

use thiserror::Error;

use crate::console::HELP_EXIT_STATUS;
use crate::spec::VetError;

/// Errors that abort a parse. No partial result is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Key token matched no key, flag group or abbreviation.
    #[error("Unexpected command line key, '{token}'")]
    UnrecognizedOption { token: String },

    /// Singular parameter given without a value.
    #[error("The parameter {key} requires a value, but none was supplied")]
    MissingValue { key: String },

    /// Required list parameter given with no values.
    #[error("{key} requires at least one value, but none were supplied")]
    NoValues { key: String },

    /// Scalar key repeated with a different value.
    #[error("Duplicate key '{key}'")]
    DuplicateKey { key: String },

    /// List key repeated with different values while concatenation is off.
    #[error("Duplicate key '{key}' with differing value lists")]
    DuplicateValues { key: String },

    /// A keyword claimed a slot after a required positional was passed over.
    #[error("missing value for required positional parameter {positional}: {key} seen first")]
    RequiredPositionalSkipped { positional: String, key: String },

    /// A keyword registered before a positional appeared after it.
    #[error("{key} cannot occur after {after}")]
    OutOfOrder { key: String, after: String },

    /// A value token arrived when no positional was left to take it.
    #[error("Unexpected value '{token}' after the last positional parameter")]
    UnexpectedValue { token: String },

    /// Validator rejection; the message is the validator's own.
    #[error("{source}")]
    Vet {
        key: String,
        #[source]
        source: VetError,
    },

    /// Required parameters never supplied; all of them are named.
    #[error("required parameters missing: {}.", .names.join(", "))]
    MissingRequired { names: Vec<String> },

    /// Help was printed and the console's exit returned.
    #[error("help requested")]
    HelpShown { status: i32 },
}

impl ParseError {
    /// Process exit status a command line tool should use for this error.
    pub fn exit_status(&self) -> i32 {
        match self {
            ParseError::HelpShown { status } => *status,
            _ => 1,
        }
    }

    /// Stable identifier for the error kind.
    pub fn error_type(&self) -> &'static str {
        match self {
            ParseError::UnrecognizedOption { .. } => "unrecognized_option",
            ParseError::MissingValue { .. } => "missing_value",
            ParseError::NoValues { .. } => "no_values",
            ParseError::DuplicateKey { .. } => "duplicate_key",
            ParseError::DuplicateValues { .. } => "duplicate_values",
            ParseError::RequiredPositionalSkipped { .. } => "required_positional_skipped",
            ParseError::OutOfOrder { .. } => "out_of_order",
            ParseError::UnexpectedValue { .. } => "unexpected_value",
            ParseError::Vet { .. } => "invalid_value",
            ParseError::MissingRequired { .. } => "missing_required",
            ParseError::HelpShown { .. } => "help_shown",
        }
    }

    pub(crate) fn help_shown() -> Self {
        ParseError::HelpShown {
            status: HELP_EXIT_STATUS,
        }
    }
}

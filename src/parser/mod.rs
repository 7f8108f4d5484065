//! Command-line parser.
//!
//! ```text
//! tokens → [token: key or value?] → [state: keyword / group / negation /
//!          abbreviation / positional] → ParsedArgs
//! ```
//!
//! A parse never mutates its [`crate::spec::Spec`]; all per-parse state
//! lives inside [`Parser::parse`].

mod error;
mod result;
mod state;
pub mod token;

pub use error::ParseError;
pub use result::ParsedArgs;
pub use state::Parser;

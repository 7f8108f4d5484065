//! Declarative command-line specification and parsing.
//!
//! Register parameter descriptors on a [`SpecBuilder`], finalize it into an
//! immutable [`Spec`], then parse any number of token sequences against it:
//!
//! ```
//! use cmdspec::SpecBuilder;
//!
//! let mut builder = SpecBuilder::new("copy");
//! builder
//!     .add_flag(("-v", "--verbose"), false, "chatty output")?
//!     .add_string_here("source", None, "file to copy")?;
//! let spec = builder.finalize()?;
//!
//! let args = spec.parse(["-v", "a.txt"])?;
//! assert_eq!(args.flag("verbose"), Some(true));
//! assert_eq!(args.string("source"), Some("a.txt"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod console;
pub mod diag;
pub mod parser;
pub mod spec;

pub use console::{BufferConsole, Console, StdConsole, HELP_EXIT_STATUS};
pub use diag::Diagnostics;
pub use parser::{ParseError, ParsedArgs, Parser};
pub use spec::{
    Arity, Keys, Param, ParamKind, ParamOptions, PathCheck, Role, Spec, SpecBuilder, SpecError,
    Value, ValueType, VetError,
};

//! Validators: turn a raw acquired value into its vetted form.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::spec::value::Value;

/// Structured reasons a validator can reject a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VetError {
    #[error("'{value}' is not an integer")]
    NotAnInteger { value: String },

    #[error("'{value}' is not a number")]
    NotAFloat { value: String },

    #[error("'{}' does not exist", .path.display())]
    PathMissing { path: PathBuf },

    #[error("Paths {} do not exist", join_paths(.paths))]
    PathsMissing { paths: Vec<PathBuf> },

    #[error("'{}' exists, but does not name a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("{} all exist, but do not name directories", join_paths(.paths))]
    NotDirectories { paths: Vec<PathBuf> },

    /// The value had the wrong shape for this validator (e.g. a list where
    /// a single string was expected).
    #[error("expected {expected}, got '{found}'")]
    WrongShape {
        expected: &'static str,
        found: String,
    },

    /// Free-form rejection from a caller-supplied validator.
    #[error("{0}")]
    Rejected(String),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

type VetFn = dyn Fn(Value) -> Result<Value, VetError> + Send + Sync;

/// A shareable validator function.
///
/// Called exactly once per final assignment of a parameter's value.
#[derive(Clone)]
pub struct Validator(Arc<VetFn>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, VetError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, raw: Value) -> Result<Value, VetError> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Which filesystem checks a path validator applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathCheck {
    pub must_exist: bool,
    pub must_be_dir: bool,
}

impl PathCheck {
    pub fn existing() -> Self {
        Self {
            must_exist: true,
            must_be_dir: false,
        }
    }

    pub fn directory() -> Self {
        Self {
            must_exist: true,
            must_be_dir: true,
        }
    }
}

/// Parse strings (or every element of a list) as `i64`.
pub fn integer() -> Validator {
    Validator::new(|raw| map_scalars(raw, &parse_integer))
}

/// Parse strings (or every element of a list) as `f64`.
pub fn float() -> Validator {
    Validator::new(|raw| map_scalars(raw, &parse_float))
}

/// Check a single path against `check`.
pub fn path(check: PathCheck) -> Validator {
    Validator::new(move |raw| match raw {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => vet_path(PathBuf::from(s), check),
        Value::Path(p) => vet_path(p, check),
        other => Err(wrong_shape("a path", &other)),
    })
}

/// Check every path of a list against `check`, reporting all failures at
/// once.
pub fn path_list(check: PathCheck) -> Validator {
    Validator::new(move |raw| {
        let items = match raw {
            Value::List(items) => items,
            Value::Null => return Ok(Value::List(Vec::new())),
            other => return Err(wrong_shape("a list of paths", &other)),
        };
        let paths = items
            .into_iter()
            .map(|item| match item {
                Value::Str(s) => Ok(PathBuf::from(s)),
                Value::Path(p) => Ok(p),
                other => Err(wrong_shape("a path", &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        vet_path_list(paths, check)
    })
}

fn vet_path(path: PathBuf, check: PathCheck) -> Result<Value, VetError> {
    let exists = path.exists();
    if check.must_exist && !exists {
        return Err(VetError::PathMissing { path });
    }
    if exists && check.must_be_dir && !path.is_dir() {
        return Err(VetError::NotADirectory { path });
    }
    Ok(Value::Path(path))
}

fn vet_path_list(paths: Vec<PathBuf>, check: PathCheck) -> Result<Value, VetError> {
    if check.must_exist {
        let missing: Vec<PathBuf> = paths.iter().filter(|p| !p.exists()).cloned().collect();
        if !missing.is_empty() {
            return Err(VetError::PathsMissing { paths: missing });
        }
    }
    if check.must_be_dir {
        let non_dirs: Vec<PathBuf> = paths
            .iter()
            .filter(|p| p.exists() && !p.is_dir())
            .cloned()
            .collect();
        if !non_dirs.is_empty() {
            return Err(VetError::NotDirectories { paths: non_dirs });
        }
    }
    Ok(Value::List(paths.into_iter().map(Value::Path).collect()))
}

fn map_scalars(
    raw: Value,
    parse: &dyn Fn(Value) -> Result<Value, VetError>,
) -> Result<Value, VetError> {
    match raw {
        Value::List(items) => items
            .into_iter()
            .map(parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => parse(other),
    }
}

fn parse_integer(raw: Value) -> Result<Value, VetError> {
    match raw {
        Value::Null | Value::Int(_) => Ok(raw),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| VetError::NotAnInteger { value: s }),
        other => Err(VetError::NotAnInteger {
            value: other.to_string(),
        }),
    }
}

fn parse_float(raw: Value) -> Result<Value, VetError> {
    match raw {
        Value::Null | Value::Float(_) => Ok(raw),
        Value::Int(i) => Ok(Value::Float(i as f64)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| VetError::NotAFloat { value: s }),
        other => Err(VetError::NotAFloat {
            value: other.to_string(),
        }),
    }
}

fn wrong_shape(expected: &'static str, found: &Value) -> VetError {
    VetError::WrongShape {
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_parses_negative_numbers() {
        assert_eq!(integer().call("-5".into()), Ok(Value::Int(-5)));
    }

    #[test]
    fn integer_rejects_words() {
        assert_eq!(
            integer().call("five".into()),
            Err(VetError::NotAnInteger {
                value: "five".into()
            })
        );
    }

    #[test]
    fn integer_passes_defaults_through() {
        assert_eq!(integer().call(Value::Int(7)), Ok(Value::Int(7)));
        assert_eq!(integer().call(Value::Null), Ok(Value::Null));
    }

    #[test]
    fn float_maps_lists() {
        let vetted = float().call(Value::strings(["1.5", "2"])).unwrap();
        assert_eq!(vetted, Value::List(vec![Value::Float(1.5), Value::Float(2.0)]));
    }

    #[test]
    fn path_requires_existence_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = path(PathCheck::existing())
            .call(Value::Path(missing.clone()))
            .unwrap_err();
        assert_eq!(err, VetError::PathMissing { path: missing });
        assert!(path(PathCheck::default())
            .call(Value::Str("nope".into()))
            .is_ok());
    }

    #[test]
    fn path_rejects_files_for_directories() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = path(PathCheck::directory())
            .call(Value::Path(file.path().to_path_buf()))
            .unwrap_err();
        assert!(matches!(err, VetError::NotADirectory { .. }));
        assert!(err.to_string().contains("does not name a directory"));
    }

    #[test]
    fn path_list_reports_every_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let raw = Value::List(vec![
            Value::Path(dir.path().to_path_buf()),
            Value::Path(a.clone()),
            Value::Path(b.clone()),
        ]);
        let err = path_list(PathCheck::existing()).call(raw).unwrap_err();
        assert_eq!(err, VetError::PathsMissing { paths: vec![a, b] });
    }
}

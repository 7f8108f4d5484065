use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::types::{ParamEntry, SpecFile};
use crate::diag::Diagnostics;
use crate::spec::{
    vet, Arity, Keys, Param, ParamKind, ParamOptions, PathCheck, Role, Spec, SpecBuilder,
    SpecError, Value, ValueType,
};

/// Errors that can occur when loading or building a spec file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read spec file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse spec file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Spec file validation failed: {message}")]
    ValidationError { message: String },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Value of an entry's `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Flag,
    String,
    Integer,
    Float,
    Path,
    Csv,
    List,
    PathList,
    End,
    Help,
    Version,
}

impl FromStr for EntryKind {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "flag" => Ok(EntryKind::Flag),
            "string" => Ok(EntryKind::String),
            "integer" => Ok(EntryKind::Integer),
            "float" => Ok(EntryKind::Float),
            "path" => Ok(EntryKind::Path),
            "csv" => Ok(EntryKind::Csv),
            "list" => Ok(EntryKind::List),
            "path-list" => Ok(EntryKind::PathList),
            "end" => Ok(EntryKind::End),
            "help" => Ok(EntryKind::Help),
            "version" => Ok(EntryKind::Version),
            _ => Err(SpecError::UnknownTag {
                kind: "parameter kind",
                tag: s.to_string(),
            }),
        }
    }
}

const VERSION_KEY: &str = "--version";

impl SpecFile {
    /// Returns the default spec file location.
    ///
    /// Uses `~/.config/cmdspec/spec.toml` on Unix/macOS, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("cmdspec").join("spec.toml")
    }

    /// Loads the spec file at the default location.
    ///
    /// A missing file yields an empty spec (help only).
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No spec file, using empty spec");
            return Ok(SpecFile::default());
        }
        Self::load(&path)
    }

    /// Reads, parses and validates a spec file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: SpecFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.validate()?;
        tracing::debug!(
            path = %path.display(),
            params = file.params.len(),
            "Loaded spec file"
        );
        Ok(file)
    }

    /// Checks:
    /// - every entry has a key
    /// - the app name, when present, is not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.appname {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "appname must not be blank".to_string(),
                });
            }
        }
        if let Some(index) = self.params.iter().position(|p| p.key.is_empty()) {
            return Err(ConfigError::ValidationError {
                message: format!("param #{} has an empty key", index + 1),
            });
        }
        Ok(())
    }

    /// Registers every entry in file order and finalizes the registry.
    pub fn build(&self) -> Result<Spec, ConfigError> {
        let mut builder = match &self.appname {
            Some(name) => SpecBuilder::new(name.as_str()),
            None => SpecBuilder::default(),
        }
        .group_flags(self.group_flags)
        .may_abbreviate(self.may_abbreviate)
        .cat_on_dup(self.cat_on_dup)
        .diagnostics(Diagnostics::new(self.debug.iter().cloned()));
        if let Some(prefix) = &self.help_prefix {
            builder = builder.help_prefix(prefix.as_str());
        }
        if let Some(suffix) = &self.help_suffix {
            builder = builder.help_suffix(suffix.as_str());
        }

        let mut has_version = false;
        for entry in &self.params {
            let param = self.entry_param(entry)?;
            has_version |= param.role() == Role::Version;
            builder.register(param)?;
        }
        if self.version.is_some() && !has_version {
            builder.register(self.version_param(VERSION_KEY.into())?)?;
        }

        Ok(builder.finalize()?)
    }

    fn version_param(&self, keys: Keys) -> Result<Param, SpecError> {
        Param::version(
            keys,
            self.appname.as_deref(),
            self.version.as_deref(),
            self.date.as_deref(),
        )
    }

    fn entry_param(&self, entry: &ParamEntry) -> Result<Param, ConfigError> {
        let Some(kind) = entry.kind.as_deref() else {
            return generic_param(entry);
        };
        let kind: EntryKind = kind.parse()?;
        let keys = Keys {
            short: entry.key.clone(),
            long: entry.long.clone(),
        };
        let check = PathCheck {
            must_exist: entry.must_exist,
            must_be_dir: entry.must_be_dir,
        };

        let options = ParamOptions {
            long_key: entry.long.clone(),
            attrname: entry.attrname.clone(),
            help: entry.help.clone(),
            ..ParamOptions::default()
        };
        let options = match kind {
            EntryKind::End => return Ok(Param::end(&entry.key)?),
            EntryKind::Help => return Ok(Param::help(keys)?),
            EntryKind::Version => return Ok(self.version_param(keys)?),
            EntryKind::Flag => {
                let default = match &entry.default {
                    None => false,
                    Some(value) => match to_value(value)? {
                        Value::Bool(b) => b,
                        _ => return Err(bad_default(entry, "a boolean")),
                    },
                };
                return Ok(Param::keyword(
                    ParamKind::Flag { negatable: true },
                    &entry.key,
                    ParamOptions {
                        default: Some(Value::Bool(default)),
                        arity: Some(Arity::None),
                        value_type: Some(ValueType::Bool),
                        ..options
                    },
                )?);
            }
            EntryKind::String => ParamOptions {
                default: scalar_default(entry)?,
                ..options
            },
            EntryKind::Integer => ParamOptions {
                default: match scalar_default(entry)? {
                    None => None,
                    Some(Value::Int(n)) => Some(Value::Int(n)),
                    Some(_) => return Err(bad_default(entry, "an integer")),
                },
                vet: Some(vet::integer()),
                ..options
            },
            EntryKind::Float => ParamOptions {
                default: match scalar_default(entry)? {
                    None => None,
                    Some(Value::Int(n)) => Some(Value::Float(n as f64)),
                    Some(Value::Float(x)) => Some(Value::Float(x)),
                    Some(_) => return Err(bad_default(entry, "a number")),
                },
                vet: Some(vet::float()),
                ..options
            },
            EntryKind::Path => ParamOptions {
                default: match scalar_default(entry)? {
                    Some(Value::Str(s)) => Some(Value::Str(s)),
                    None => None,
                    Some(_) => return Err(bad_default(entry, "a string")),
                },
                vet: Some(vet::path(check)),
                ..options
            },
            EntryKind::Csv => ParamOptions {
                default: Some(list_default(entry)?),
                arity: Some(Arity::single(entry.optional)),
                value_type: Some(ValueType::Csv),
                ..options
            },
            EntryKind::List => ParamOptions {
                default: Some(list_default(entry)?),
                arity: Some(Arity::plural(entry.optional)),
                value_type: Some(ValueType::List),
                ..options
            },
            EntryKind::PathList => ParamOptions {
                default: Some(list_default(entry)?),
                arity: Some(Arity::plural(entry.optional)),
                value_type: Some(ValueType::List),
                vet: Some(vet::path_list(check)),
                ..options
            },
        };

        let options = with_overrides(entry, options)?;
        if entry.key.starts_with('-') {
            Ok(Param::key_value(&entry.key, options)?)
        } else {
            Ok(Param::positional(&entry.key, options)?)
        }
    }
}

/// An entry without a kind: everything comes from the explicit tags.
fn generic_param(entry: &ParamEntry) -> Result<Param, ConfigError> {
    let options = with_overrides(
        entry,
        ParamOptions {
            long_key: entry.long.clone(),
            attrname: entry.attrname.clone(),
            default: entry.default.as_ref().map(to_value).transpose()?,
            help: entry.help.clone(),
            ..ParamOptions::default()
        },
    )?;
    let role = match options.role {
        Some(role) => role,
        None if entry.key == "--" => Role::End,
        None if entry.key.starts_with('-') => Role::Keyword,
        None => Role::Positional,
    };
    let kind = match role {
        Role::Keyword if options.arity == Some(Arity::None) => ParamKind::Flag { negatable: false },
        Role::Keyword => ParamKind::KeyValue,
        Role::Positional => ParamKind::Positional,
        Role::End => return Ok(Param::end(&entry.key)?),
        Role::Help => {
            return Ok(Param::help(Keys {
                short: entry.key.clone(),
                long: entry.long.clone(),
            })?)
        }
        Role::Version => {
            return Err(ConfigError::ValidationError {
                message: format!("{}: use kind = \"version\" for version switches", entry.key),
            })
        }
    };
    Ok(Param::new(kind, &entry.key, options)?)
}

/// Apply explicit `arity`, `value_type` and `role` tags.
fn with_overrides(entry: &ParamEntry, options: ParamOptions) -> Result<ParamOptions, SpecError> {
    Ok(ParamOptions {
        arity: match &entry.arity {
            Some(tag) => Some(tag.parse()?),
            None => options.arity,
        },
        value_type: match &entry.value_type {
            Some(tag) => Some(tag.parse()?),
            None => options.value_type,
        },
        role: match &entry.role {
            Some(tag) => Some(tag.parse()?),
            None => options.role,
        },
        ..options
    })
}

fn scalar_default(entry: &ParamEntry) -> Result<Option<Value>, ConfigError> {
    match entry.default.as_ref().map(to_value).transpose()? {
        Some(Value::List(_)) => Err(bad_default(entry, "a single value")),
        other => Ok(other),
    }
}

fn list_default(entry: &ParamEntry) -> Result<Value, ConfigError> {
    match entry.default.as_ref().map(to_value).transpose()? {
        None => Ok(Value::List(Vec::new())),
        Some(Value::List(items)) => Ok(Value::List(items)),
        Some(single) => Ok(Value::List(vec![single])),
    }
}

fn bad_default(entry: &ParamEntry, expected: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: format!("default for {} must be {}", entry.key, expected),
    }
}

/// Convert a TOML value into a resolved value. Tables have no counterpart.
fn to_value(value: &toml::Value) -> Result<Value, ConfigError> {
    Ok(match value {
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Integer(n) => Value::Int(*n),
        toml::Value::Float(x) => Value::Float(*x),
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Datetime(d) => Value::Str(d.to_string()),
        toml::Value::Array(items) => {
            Value::List(items.iter().map(to_value).collect::<Result<_, _>>()?)
        }
        toml::Value::Table(_) => {
            return Err(ConfigError::ValidationError {
                message: "tables are not valid parameter defaults".to_string(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, kind: &str) -> ParamEntry {
        ParamEntry {
            key: key.to_string(),
            kind: Some(kind.to_string()),
            ..ParamEntry::default()
        }
    }

    #[test]
    fn kinds_are_case_insensitive() {
        assert_eq!("Path_List".parse::<EntryKind>().unwrap(), EntryKind::PathList);
        assert!(matches!(
            "bogus".parse::<EntryKind>(),
            Err(SpecError::UnknownTag { kind: "parameter kind", .. })
        ));
    }

    #[test]
    fn flag_default_must_be_boolean() {
        let mut e = entry("-v", "flag");
        e.default = Some(toml::Value::Integer(3));
        let file = SpecFile::default();
        assert!(matches!(
            file.entry_param(&e),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn float_default_widens_integers() {
        let mut e = entry("-r", "float");
        e.default = Some(toml::Value::Integer(2));
        let param = SpecFile::default().entry_param(&e).unwrap();
        assert_eq!(param.default(), &Value::Float(2.0));
        assert_eq!(param.arity(), Arity::ZeroOrOne);
    }

    #[test]
    fn bare_keys_become_positionals() {
        let param = SpecFile::default()
            .entry_param(&entry("files", "list"))
            .unwrap();
        assert_eq!(param.role(), Role::Positional);
        assert_eq!(param.arity(), Arity::OneOrMore);
    }

    #[test]
    fn explicit_tags_override_the_kind() {
        let mut e = entry("-n", "string");
        e.arity = Some("zero-or-more".to_string());
        let param = SpecFile::default().entry_param(&e).unwrap();
        assert_eq!(param.arity(), Arity::ZeroOrMore);

        e.arity = Some("lots".to_string());
        assert!(matches!(
            SpecFile::default().entry_param(&e),
            Err(ConfigError::Spec(SpecError::UnknownTag { kind: "count type", .. }))
        ));
    }

    #[test]
    fn tables_are_not_values() {
        let table = toml::Value::Table(toml::map::Map::new());
        assert!(to_value(&table).is_err());
        let array = toml::Value::Array(vec![toml::Value::Integer(1), "a".into()]);
        assert_eq!(
            to_value(&array).unwrap(),
            Value::List(vec![Value::Int(1), Value::from("a")])
        );
    }
}

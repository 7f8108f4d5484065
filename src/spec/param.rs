//! Parameter descriptors, one immutable description per command-line
//! parameter.

use std::fmt;
use std::str::FromStr;

use crate::spec::error::SpecError;
use crate::spec::value::Value;
use crate::spec::vet::{Validator, VetError};

/// What kind of parameter this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Addressed by a key token (`-x`, `--name`).
    Keyword,
    /// Addressed by its position among non-key tokens.
    Positional,
    Help,
    Version,
    /// The end-of-options marker (`--`).
    End,
}

/// How many tokens satisfy a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    None,
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

/// Shape of the resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    String,
    /// Comma-separated components, resolved to a list.
    Csv,
    List,
    End,
    Help,
    Version,
}

impl Arity {
    /// Consumes a list of tokens rather than a single one.
    pub fn is_plural(self) -> bool {
        matches!(self, Arity::ZeroOrMore | Arity::OneOrMore)
    }

    /// Must receive at least one value on every command line.
    pub fn is_required(self) -> bool {
        matches!(self, Arity::One | Arity::OneOrMore)
    }

    /// `one`, or `zero-or-one` when optional.
    pub fn single(optional: bool) -> Self {
        if optional {
            Arity::ZeroOrOne
        } else {
            Arity::One
        }
    }

    /// `one-or-more`, or `zero-or-more` when optional.
    pub fn plural(optional: bool) -> Self {
        if optional {
            Arity::ZeroOrMore
        } else {
            Arity::OneOrMore
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Arity::None => "none",
            Arity::One => "one",
            Arity::ZeroOrOne => "zero-or-one",
            Arity::ZeroOrMore => "zero-or-more",
            Arity::OneOrMore => "one-or-more",
        }
    }
}

impl Role {
    pub fn tag(self) -> &'static str {
        match self {
            Role::Keyword => "keyword",
            Role::Positional => "positional",
            Role::Help => "help",
            Role::Version => "version",
            Role::End => "end",
        }
    }
}

impl ValueType {
    pub fn tag(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Csv => "csv",
            ValueType::List => "list",
            ValueType::End => "end",
            ValueType::Help => "help",
            ValueType::Version => "version",
        }
    }
}

/// Tags are matched case-insensitively, with `_` and `-` interchangeable,
/// so `ZERO_OR_ONE` and `zero-or-one` name the same arity.
fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('_', "-")
}

impl FromStr for Arity {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "none" => Ok(Arity::None),
            "one" => Ok(Arity::One),
            "zero-or-one" | "?" => Ok(Arity::ZeroOrOne),
            "zero-or-more" | "*" => Ok(Arity::ZeroOrMore),
            "one-or-more" | "+" => Ok(Arity::OneOrMore),
            _ => Err(SpecError::UnknownTag {
                kind: "count type",
                tag: s.to_string(),
            }),
        }
    }
}

impl FromStr for Role {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "keyword" => Ok(Role::Keyword),
            "positional" | "position" => Ok(Role::Positional),
            "help" => Ok(Role::Help),
            "version" => Ok(Role::Version),
            "end" => Ok(Role::End),
            _ => Err(SpecError::UnknownTag {
                kind: "role",
                tag: s.to_string(),
            }),
        }
    }
}

impl FromStr for ValueType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "bool" | "boolean" => Ok(ValueType::Bool),
            "string" => Ok(ValueType::String),
            "csv" => Ok(ValueType::Csv),
            "list" => Ok(ValueType::List),
            "end" => Ok(ValueType::End),
            "help" => Ok(ValueType::Help),
            "version" => Ok(ValueType::Version),
            _ => Err(SpecError::UnknownTag {
                kind: "value type",
                tag: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Variant-specific part of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Boolean switch; `negatable` flags also accept `-nof` / `--no-flag`.
    Flag { negatable: bool },
    KeyValue,
    End,
    Help,
    /// Carries the composed version message.
    Version { message: String },
    Positional,
}

/// Optional settings shared by every descriptor constructor.
#[derive(Debug, Clone, Default)]
pub struct ParamOptions {
    /// Secondary (`--long`) key. Keywords only.
    pub long_key: Option<String>,
    /// Overrides the attribute names derived from the keys.
    pub attrname: Option<String>,
    pub default: Option<Value>,
    pub arity: Option<Arity>,
    pub value_type: Option<ValueType>,
    pub role: Option<Role>,
    pub help: Option<String>,
    pub vet: Option<Validator>,
}

/// The surface keys of a keyword: a primary key and an optional secondary
/// key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    pub short: String,
    pub long: Option<String>,
}

impl From<&str> for Keys {
    fn from(short: &str) -> Self {
        Self {
            short: short.to_string(),
            long: None,
        }
    }
}

impl From<(&str, &str)> for Keys {
    fn from((short, long): (&str, &str)) -> Self {
        Self {
            short: short.to_string(),
            long: Some(long.to_string()),
        }
    }
}

/// A validated description of one command-line parameter.
#[derive(Debug, Clone)]
pub struct Param {
    kind: ParamKind,
    role: Role,
    short_key: String,
    long_key: Option<String>,
    attrnames: Vec<String>,
    arity: Arity,
    value_type: ValueType,
    default: Value,
    help: String,
    vet: Option<Validator>,
    position: usize,
}

const NO_HELP: &str = "???";

impl Param {
    /// Generic constructor. The role comes from `options.role` when given,
    /// otherwise from the key: `--` is the end marker, a bare name is
    /// positional, anything dashed is a keyword.
    pub fn new(
        kind: ParamKind,
        short_key: &str,
        options: ParamOptions,
    ) -> Result<Self, SpecError> {
        let (dashes, short_name) = split_key(short_key)?;
        let role = match options.role {
            Some(role) => role,
            None if short_key == "--" => Role::End,
            None if dashes.is_empty() => Role::Positional,
            None => Role::Keyword,
        };

        let mut long_key = match options.long_key.as_deref().filter(|l| !l.is_empty()) {
            Some(long) => {
                if role == Role::Positional {
                    return Err(SpecError::LongKeyOnPositional {
                        key: short_key.to_string(),
                    });
                }
                long_name(long)?;
                Some(long.to_string())
            }
            None => None,
        };
        if dashes == "--" {
            if let Some(long) = &long_key {
                if long != short_key {
                    return Err(SpecError::InvalidKey {
                        key: long.clone(),
                        reason: "only one double-dashed key allowed",
                    });
                }
                long_key = None;
            }
        }

        let attrnames = match options.attrname.filter(|a| !a.is_empty()) {
            Some(name) => vec![name],
            None => {
                let mut names = Vec::new();
                let short_attr = attribute_name(short_name);
                if !short_attr.is_empty() {
                    names.push(short_attr);
                }
                if let Some(long) = &long_key {
                    let long_attr = attribute_name(long_name(long)?);
                    if !long_attr.is_empty() {
                        names.push(long_attr);
                    }
                }
                names
            }
        };

        let arity = options.arity.unwrap_or(if options.default.is_some() {
            Arity::ZeroOrOne
        } else {
            Arity::One
        });
        let value_type = options.value_type.unwrap_or(
            if role == Role::Keyword && arity == Arity::None {
                ValueType::Bool
            } else {
                ValueType::String
            },
        );

        Ok(Self {
            kind,
            role,
            short_key: short_key.to_string(),
            long_key,
            attrnames,
            arity,
            value_type,
            default: options.default.unwrap_or(Value::Null),
            help: options.help.unwrap_or_else(|| NO_HELP.to_string()),
            vet: options.vet,
            position: 0,
        })
    }

    /// A boolean switch with a caller-chosen default.
    pub fn flag(
        keys: impl Into<Keys>,
        default: bool,
        negatable: bool,
        help: &str,
    ) -> Result<Self, SpecError> {
        let keys = keys.into();
        Self::keyword(
            ParamKind::Flag { negatable },
            &keys.short,
            ParamOptions {
                long_key: keys.long,
                default: Some(Value::Bool(default)),
                arity: Some(Arity::None),
                value_type: Some(ValueType::Bool),
                help: Some(help.to_string()),
                ..ParamOptions::default()
            },
        )
    }

    /// A generic keyed parameter; arity and value type as declared.
    pub fn key_value(short_key: &str, options: ParamOptions) -> Result<Self, SpecError> {
        Self::keyword(ParamKind::KeyValue, short_key, options)
    }

    /// The end-of-options marker, normally `--`.
    pub fn end(marker: &str) -> Result<Self, SpecError> {
        Self::keyword(
            ParamKind::End,
            marker,
            ParamOptions {
                arity: Some(Arity::None),
                value_type: Some(ValueType::End),
                role: Some(Role::End),
                help: Some("end of argument list: remainder ignored".to_string()),
                ..ParamOptions::default()
            },
        )
    }

    pub fn help(keys: impl Into<Keys>) -> Result<Self, SpecError> {
        let keys = keys.into();
        Self::keyword(
            ParamKind::Help,
            &keys.short,
            ParamOptions {
                long_key: keys.long,
                arity: Some(Arity::None),
                value_type: Some(ValueType::Help),
                role: Some(Role::Help),
                help: Some("print this message to the console and exit".to_string()),
                ..ParamOptions::default()
            },
        )
    }

    /// Version switch; the message is composed from the app name, version
    /// and optional date.
    pub fn version(
        keys: impl Into<Keys>,
        appname: Option<&str>,
        version: Option<&str>,
        date: Option<&str>,
    ) -> Result<Self, SpecError> {
        let keys = keys.into();
        Self::keyword(
            ParamKind::Version {
                message: version_message(appname, version, date),
            },
            &keys.short,
            ParamOptions {
                long_key: keys.long,
                arity: Some(Arity::None),
                value_type: Some(ValueType::Version),
                role: Some(Role::Version),
                help: Some("print version information to the console".to_string()),
                ..ParamOptions::default()
            },
        )
    }

    pub fn positional(key: &str, options: ParamOptions) -> Result<Self, SpecError> {
        let param = Self::new(ParamKind::Positional, key, options)?;
        if param.role != Role::Positional {
            return Err(SpecError::NotPositional {
                key: key.to_string(),
            });
        }
        Ok(param)
    }

    /// Like [`Param::new`], but the key must start with `-`.
    pub fn keyword(
        kind: ParamKind,
        short_key: &str,
        options: ParamOptions,
    ) -> Result<Self, SpecError> {
        if !short_key.starts_with('-') {
            return Err(SpecError::NotKeyword {
                key: short_key.to_string(),
            });
        }
        Self::new(kind, short_key, options)
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn short_key(&self) -> &str {
        &self.short_key
    }

    pub fn long_key(&self) -> Option<&str> {
        self.long_key.as_deref()
    }

    /// Every surface key: primary first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.short_key.as_str()).chain(self.long_key.as_deref())
    }

    pub fn attrnames(&self) -> &[String] {
        &self.attrnames
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    /// Help message shown in the parameter's help line.
    pub fn help_msg(&self) -> &str {
        &self.help
    }

    /// Ordinal index among all registered parameters.
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Single-character boolean keyword, eligible for `-abc` grouping.
    pub fn groupable_char(&self) -> Option<char> {
        if self.role != Role::Keyword || self.value_type != ValueType::Bool {
            return None;
        }
        let mut chars = self.short_key.strip_prefix('-')?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '-' => Some(c),
            _ => None,
        }
    }

    pub fn is_negatable(&self) -> bool {
        matches!(self.kind, ParamKind::Flag { negatable: true })
    }

    /// Accumulates repeated occurrences instead of treating them as
    /// conflicts.
    pub fn accumulates(&self) -> bool {
        self.arity.is_plural() || self.value_type == ValueType::Csv
    }

    /// Run the validator, if any, on a raw value.
    pub fn vet(&self, raw: Value) -> Result<Value, VetError> {
        match &self.vet {
            Some(vet) => vet.call(raw),
            None => Ok(raw),
        }
    }

    /// `short[long]`, as used in error messages.
    pub fn print_name(&self) -> String {
        match &self.long_key {
            Some(long) => format!("{}[{}]", self.short_key, long),
            None => self.short_key.clone(),
        }
    }

    /// Canonical usage fragment for help text.
    pub fn arg_look(&self) -> String {
        match &self.kind {
            ParamKind::Flag { negatable: true } => {
                let negated = |key: &str| {
                    let (dashes, name) = key.split_at(leading_dashes(key));
                    format!("{dashes}[NO|no][-]{name}")
                };
                match &self.long_key {
                    Some(long) => format!("{}, {}", negated(&self.short_key), negated(long)),
                    None => negated(&self.short_key),
                }
            }
            ParamKind::Flag { negatable: false } => match &self.long_key {
                Some(long) => format!("{}, {}", self.short_key, long),
                None => self.short_key.clone(),
            },
            ParamKind::End => format!("{} (ignored)", self.short_key),
            ParamKind::KeyValue | ParamKind::Help | ParamKind::Version { .. } => {
                let body = placeholder(&self.short_key);
                let keys = self.print_name();
                match repeat_look(&body, self.arity) {
                    Some(data) => format!("{keys} {data}"),
                    None => keys,
                }
            }
            ParamKind::Positional => {
                let body = self.short_key.to_uppercase();
                repeat_look(&body, self.arity).unwrap_or(body)
            }
        }
    }

    /// One help line: `\t<arg_look>:  <help>.` plus the default, if any.
    pub fn help_line(&self) -> String {
        if self.default.is_null() {
            format!("\t{}:  {}.\n", self.arg_look(), self.help)
        } else {
            format!(
                "\t{}:  {}. Default: {}\n",
                self.arg_look(),
                self.help,
                self.default
            )
        }
    }
}

fn repeat_look(body: &str, arity: Arity) -> Option<String> {
    match arity {
        Arity::None => None,
        Arity::One => Some(body.to_string()),
        Arity::ZeroOrOne => Some(format!("{body}?")),
        Arity::ZeroOrMore => Some(format!("[{body}1[,{body}2[,...]]]")),
        Arity::OneOrMore => Some(format!("{body}1[,{body}2[,...]]")),
    }
}

/// Upper-cased word characters following the dashes of a key.
fn placeholder(key: &str) -> String {
    key[leading_dashes(key)..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_uppercase()
}

fn leading_dashes(key: &str) -> usize {
    key.len() - key.trim_start_matches('-').len()
}

/// Split a primary key into its dashes and name, checking the syntax:
/// at most two dashes, a name that does not itself start with a dash,
/// and no `=` anywhere.
fn split_key(key: &str) -> Result<(&str, &str), SpecError> {
    let invalid = |reason| SpecError::InvalidKey {
        key: key.to_string(),
        reason,
    };
    let dash_count = leading_dashes(key);
    if dash_count > 2 {
        return Err(invalid("more than two leading dashes"));
    }
    if key.contains('=') {
        return Err(invalid("keys may not contain '='"));
    }
    let (dashes, name) = key.split_at(dash_count);
    if name.is_empty() && dashes != "--" {
        return Err(invalid("empty name"));
    }
    Ok((dashes, name))
}

/// Name part of a secondary key, which must be `--name`.
fn long_name(long: &str) -> Result<&str, SpecError> {
    let invalid = |reason| SpecError::InvalidKey {
        key: long.to_string(),
        reason,
    };
    let name = long
        .strip_prefix("--")
        .ok_or_else(|| invalid("long keys start with '--'"))?;
    if name.is_empty() || name.starts_with('-') {
        return Err(invalid("long keys need a name after '--'"));
    }
    if name.contains('=') {
        return Err(invalid("keys may not contain '='"));
    }
    Ok(name)
}

/// Derive an attribute name from a key's name part: runs of dashes become
/// one underscore and non-word characters are dropped.
pub fn attribute_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_dash_run = false;
    for c in name.chars() {
        if c == '-' {
            if !in_dash_run {
                out.push('_');
            }
            in_dash_run = true;
            continue;
        }
        in_dash_run = false;
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        }
    }
    out
}

/// `"<appname>: Version <version>[, <date>]"`.
pub fn version_message(appname: Option<&str>, version: Option<&str>, date: Option<&str>) -> String {
    let mut msg = String::new();
    if let Some(app) = appname {
        msg.push_str(app);
        msg.push_str(": ");
    }
    match version {
        Some(v) => {
            msg.push_str("Version ");
            msg.push_str(v);
        }
        None => msg.push_str("(no version provided)"),
    }
    if let Some(d) = date {
        msg.push_str(", ");
        msg.push_str(d);
    }
    msg
}

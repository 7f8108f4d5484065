//! Specification registry: accumulates parameter descriptors, then
//! freezes into an immutable, shareable [`Spec`].

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::diag::Diagnostics;
use crate::parser::{ParseError, ParsedArgs, Parser};
use crate::spec::error::SpecError;
use crate::spec::help;
use crate::spec::param::{Arity, Keys, Param, ParamKind, ParamOptions, Role, ValueType};
use crate::spec::value::Value;
use crate::spec::vet::{self, PathCheck};

const DEFAULT_HELP_KEYS: (&str, &str) = ("-?", "--help");
const DEFAULT_HELP_PREFIX: &str = "USAGE:\n";
const DEFAULT_HELP_SUFFIX: &str = "--------";

/// Mutable registry. Consumed by [`SpecBuilder::finalize`].
#[derive(Debug)]
pub struct SpecBuilder {
    appname: Option<String>,
    params: Vec<Param>,
    keys: BTreeMap<String, usize>,
    groupable: BTreeSet<char>,
    positionals: Vec<usize>,
    attributes: Vec<String>,
    defaults: BTreeMap<String, Value>,
    help_prefix: String,
    help_suffix: String,
    group_flags: bool,
    may_abbreviate: bool,
    cat_on_dup: bool,
    has_help: bool,
    version: Option<usize>,
    diagnostics: Diagnostics,
}

/// Finalized registry: the immutable contract every parse runs against.
///
/// Holds no interior mutability, so one `Spec` can back any number of
/// concurrent parses.
#[derive(Debug)]
pub struct Spec {
    appname: Option<String>,
    params: Vec<Param>,
    keys: BTreeMap<String, usize>,
    groupable: BTreeSet<char>,
    positionals: Vec<usize>,
    defaults: BTreeMap<String, Value>,
    help_prefix: String,
    help_suffix: String,
    group_flags: bool,
    may_abbreviate: bool,
    cat_on_dup: bool,
    version: Option<usize>,
    diagnostics: Diagnostics,
}

impl Default for SpecBuilder {
    fn default() -> Self {
        Self {
            appname: None,
            params: Vec::new(),
            keys: BTreeMap::new(),
            groupable: BTreeSet::new(),
            positionals: Vec::new(),
            attributes: Vec::new(),
            defaults: BTreeMap::new(),
            help_prefix: DEFAULT_HELP_PREFIX.to_string(),
            help_suffix: DEFAULT_HELP_SUFFIX.to_string(),
            group_flags: true,
            may_abbreviate: true,
            cat_on_dup: true,
            has_help: false,
            version: None,
            diagnostics: Diagnostics::default(),
        }
    }
}

impl SpecBuilder {
    pub fn new(appname: impl Into<String>) -> Self {
        Self {
            appname: Some(appname.into()),
            ..Self::default()
        }
    }

    /// Allow `-abc` for independently registered flags `-a -b -c`.
    pub fn group_flags(mut self, enabled: bool) -> Self {
        self.group_flags = enabled;
        self
    }

    /// Accept unambiguous key prefixes.
    pub fn may_abbreviate(mut self, enabled: bool) -> Self {
        self.may_abbreviate = enabled;
        self
    }

    /// Concatenate repeated list/CSV keys instead of rejecting them.
    pub fn cat_on_dup(mut self, enabled: bool) -> Self {
        self.cat_on_dup = enabled;
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Text placed before the generated help.
    pub fn help_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.help_prefix = prefix.into();
        self
    }

    /// Text placed after the generated help.
    pub fn help_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.help_suffix = suffix.into();
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Add a descriptor. Fails if either of its keys is already taken.
    pub fn register(&mut self, mut param: Param) -> Result<&Param, SpecError> {
        for key in param.keys() {
            if self.keys.contains_key(key) {
                return Err(SpecError::DuplicateKey {
                    key: key.to_string(),
                });
            }
        }

        let position = self.params.len();
        param.set_position(position);
        if let Some(c) = param.groupable_char() {
            self.groupable.insert(c);
        }
        for key in param.keys() {
            self.keys.insert(key.to_string(), position);
        }
        for name in param.attrnames() {
            self.attributes.push(name.clone());
            self.defaults.insert(name.clone(), param.default().clone());
        }
        match param.role() {
            Role::Positional => self.positionals.push(position),
            Role::Help => self.has_help = true,
            Role::Version => self.version = Some(position),
            Role::Keyword | Role::End => {}
        }
        self.diagnostics.emit("attrs", || {
            format!(
                "register {} at {} as {:?}",
                param.print_name(),
                position,
                param.attrnames()
            )
        });

        self.params.push(param);
        Ok(&self.params[position])
    }

    fn add(&mut self, param: Result<Param, SpecError>) -> Result<&mut Self, SpecError> {
        self.register(param?)?;
        Ok(self)
    }

    // ---- keyword parameters ----

    /// Boolean flag; negatable as `-noX` / `--no-name`.
    pub fn add_flag(
        &mut self,
        keys: impl Into<Keys>,
        default: bool,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::flag(keys, default, true, help))
    }

    pub fn add_string(
        &mut self,
        keys: impl Into<Keys>,
        default: Option<&str>,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: default.map(Value::from),
                ..options
            },
        ))
    }

    pub fn add_integer(
        &mut self,
        keys: impl Into<Keys>,
        default: Option<i64>,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: default.map(Value::Int),
                vet: Some(vet::integer()),
                ..options
            },
        ))
    }

    pub fn add_float(
        &mut self,
        keys: impl Into<Keys>,
        default: Option<f64>,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: default.map(Value::Float),
                vet: Some(vet::float()),
                ..options
            },
        ))
    }

    pub fn add_path(
        &mut self,
        keys: impl Into<Keys>,
        default: Option<&str>,
        help: &str,
        check: PathCheck,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: default.map(Value::from),
                vet: Some(vet::path(check)),
                ..options
            },
        ))
    }

    /// Single comma-separated value, resolved to a list.
    pub fn add_csv(
        &mut self,
        keys: impl Into<Keys>,
        optional: bool,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: Some(Value::List(Vec::new())),
                arity: Some(Arity::single(optional)),
                value_type: Some(ValueType::Csv),
                ..options
            },
        ))
    }

    /// Consumes every following non-key token.
    pub fn add_list(
        &mut self,
        keys: impl Into<Keys>,
        optional: bool,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: Some(Value::List(Vec::new())),
                arity: Some(Arity::plural(optional)),
                value_type: Some(ValueType::List),
                ..options
            },
        ))
    }

    pub fn add_path_list(
        &mut self,
        keys: impl Into<Keys>,
        optional: bool,
        help: &str,
        check: PathCheck,
    ) -> Result<&mut Self, SpecError> {
        let (short, options) = keyed(keys, help);
        self.add(Param::key_value(
            &short,
            ParamOptions {
                default: Some(Value::List(Vec::new())),
                arity: Some(Arity::plural(optional)),
                value_type: Some(ValueType::List),
                vet: Some(vet::path_list(check)),
                ..options
            },
        ))
    }

    // ---- positional parameters ----

    pub fn add_string_here(
        &mut self,
        key: &str,
        default: Option<&str>,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: default.map(Value::from),
                ..helped(help)
            },
        ))
    }

    pub fn add_integer_here(
        &mut self,
        key: &str,
        default: Option<i64>,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: default.map(Value::Int),
                vet: Some(vet::integer()),
                ..helped(help)
            },
        ))
    }

    pub fn add_float_here(
        &mut self,
        key: &str,
        default: Option<f64>,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: default.map(Value::Float),
                vet: Some(vet::float()),
                ..helped(help)
            },
        ))
    }

    pub fn add_path_here(
        &mut self,
        key: &str,
        default: Option<&str>,
        help: &str,
        check: PathCheck,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: default.map(Value::from),
                vet: Some(vet::path(check)),
                ..helped(help)
            },
        ))
    }

    pub fn add_csv_here(
        &mut self,
        key: &str,
        optional: bool,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: Some(Value::List(Vec::new())),
                arity: Some(Arity::single(optional)),
                value_type: Some(ValueType::Csv),
                ..helped(help)
            },
        ))
    }

    pub fn add_list_here(
        &mut self,
        key: &str,
        optional: bool,
        help: &str,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: Some(Value::List(Vec::new())),
                arity: Some(Arity::plural(optional)),
                value_type: Some(ValueType::List),
                ..helped(help)
            },
        ))
    }

    pub fn add_path_list_here(
        &mut self,
        key: &str,
        optional: bool,
        help: &str,
        check: PathCheck,
    ) -> Result<&mut Self, SpecError> {
        self.add(Param::positional(
            key,
            ParamOptions {
                default: Some(Value::List(Vec::new())),
                arity: Some(Arity::plural(optional)),
                value_type: Some(ValueType::List),
                vet: Some(vet::path_list(check)),
                ..helped(help)
            },
        ))
    }

    // ---- markers ----

    pub fn add_end_marker(&mut self, marker: &str) -> Result<&mut Self, SpecError> {
        self.add(Param::end(marker))
    }

    pub fn add_help(&mut self, keys: impl Into<Keys>) -> Result<&mut Self, SpecError> {
        self.add(Param::help(keys))
    }

    /// Version switch named after this registry's app name.
    pub fn add_version(
        &mut self,
        keys: impl Into<Keys>,
        version: Option<&str>,
        date: Option<&str>,
    ) -> Result<&mut Self, SpecError> {
        let param = Param::version(keys, self.appname.as_deref(), version, date);
        self.add(param)
    }

    /// Freeze the registry.
    ///
    /// Registers a default `-?`/`--help` when none was added, rejects
    /// duplicate attribute names (all of them, in one error) and appends
    /// the sentinel positional one past the last parameter.
    pub fn finalize(mut self) -> Result<Spec, SpecError> {
        if !self.has_help {
            self.register(Param::help(DEFAULT_HELP_KEYS)?)?;
        }

        let mut sorted = self.attributes.clone();
        sorted.sort();
        let mut dups: Vec<String> = sorted
            .windows(2)
            .filter(|pair| pair[0] == pair[1])
            .map(|pair| pair[0].clone())
            .collect();
        dups.dedup();
        if !dups.is_empty() {
            return Err(SpecError::DuplicateAttributes { names: dups });
        }

        self.positionals.push(self.params.len());

        let spec = Spec {
            appname: self.appname,
            params: self.params,
            keys: self.keys,
            groupable: self.groupable,
            positionals: self.positionals,
            defaults: self.defaults,
            help_prefix: self.help_prefix,
            help_suffix: self.help_suffix,
            group_flags: self.group_flags,
            may_abbreviate: self.may_abbreviate,
            cat_on_dup: self.cat_on_dup,
            version: self.version,
            diagnostics: self.diagnostics,
        };
        spec.diagnostics.emit("final", || {
            let looks: Vec<String> = spec.params.iter().map(Param::arg_look).collect();
            format!(
                "finalized {} parameters: {}; positionals at {:?}",
                spec.params.len(),
                looks.join(" "),
                spec.positionals
            )
        });
        tracing::debug!(
            params = spec.params.len(),
            positionals = spec.positionals.len() - 1,
            "Specification finalized"
        );
        Ok(spec)
    }
}

fn keyed(keys: impl Into<Keys>, help: &str) -> (String, ParamOptions) {
    let keys = keys.into();
    (
        keys.short,
        ParamOptions {
            long_key: keys.long,
            ..helped(help)
        },
    )
}

fn helped(help: &str) -> ParamOptions {
    ParamOptions {
        help: Some(help.to_string()),
        ..ParamOptions::default()
    }
}

impl Spec {
    /// Already final; returns itself unchanged.
    pub fn finalize(self) -> Result<Spec, SpecError> {
        Ok(self)
    }

    pub fn appname(&self) -> Option<&str> {
        self.appname.as_deref()
    }

    /// All descriptors in registration order (index = position).
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, position: usize) -> Option<&Param> {
        self.params.get(position)
    }

    /// Descriptor registered under exactly this key.
    pub fn lookup(&self, key: &str) -> Option<&Param> {
        self.keys.get(key).map(|&pos| &self.params[pos])
    }

    /// Positions of positional parameters, ending with the sentinel
    /// `params().len()`.
    pub fn positionals(&self) -> &[usize] {
        &self.positionals
    }

    pub fn is_groupable(&self, c: char) -> bool {
        self.groupable.contains(&c)
    }

    /// Attribute name → declared default.
    pub fn defaults(&self) -> &BTreeMap<String, Value> {
        &self.defaults
    }

    pub fn groups_flags(&self) -> bool {
        self.group_flags
    }

    pub fn abbreviates(&self) -> bool {
        self.may_abbreviate
    }

    pub fn cats_on_dup(&self) -> bool {
        self.cat_on_dup
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Resolve a token to a registered key: the exact key if there is one,
    /// else the only key the token is a prefix of. Any `=value` suffix is
    /// ignored.
    pub fn resolve_key(&self, token: &str) -> Option<&str> {
        let prefix = token.split('=').next().unwrap_or_default();
        if prefix.is_empty() {
            return None;
        }
        if let Some((key, _)) = self.keys.get_key_value(prefix) {
            return Some(key);
        }
        let mut candidates = self
            .keys
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(key, _)| key.as_str())
            .take_while(|key| key.starts_with(prefix));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn version_message(&self) -> Option<&str> {
        let param = self.params.get(self.version?)?;
        match param.kind() {
            ParamKind::Version { message } => Some(message),
            _ => None,
        }
    }

    pub fn help_text(&self) -> String {
        help::render(
            self.appname.as_deref(),
            &self.params,
            self.version_message(),
            &self.help_prefix,
            &self.help_suffix,
        )
    }

    /// Parameters that must appear on every command line.
    pub fn required(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| p.arity().is_required())
    }

    /// Parse `tokens` with the standard console.
    pub fn parse<I, S>(&self, tokens: I) -> Result<ParsedArgs, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Parser::new(self).parse(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_registration_order() {
        let mut b = SpecBuilder::new("t");
        b.add_flag("-a", false, "a")
            .unwrap()
            .add_string_here("file", None, "file")
            .unwrap();
        let spec = b.finalize().unwrap();
        assert_eq!(spec.params()[0].position(), 0);
        assert_eq!(spec.params()[1].position(), 1);
        // file, then the sentinel one past the implicit help
        assert_eq!(spec.positionals(), [1, 3]);
    }

    #[test]
    fn single_char_booleans_are_groupable() {
        let mut b = SpecBuilder::new("t");
        b.add_flag("-a", false, "a")
            .unwrap()
            .add_flag("--bee", false, "b")
            .unwrap()
            .add_string("-c", None, "c")
            .unwrap();
        let spec = b.finalize().unwrap();
        assert!(spec.is_groupable('a'));
        assert!(!spec.is_groupable('b'));
        assert!(!spec.is_groupable('c'));
    }

    #[test]
    fn resolve_key_prefers_exact_then_unique_prefix() {
        let mut b = SpecBuilder::new("t");
        b.add_string(("-o", "--output"), Some("x"), "o")
            .unwrap()
            .add_flag(("-v", "--verbose"), false, "v")
            .unwrap()
            .add_flag("--version-check", false, "vc")
            .unwrap();
        let spec = b.finalize().unwrap();
        assert_eq!(spec.resolve_key("--out=file"), Some("--output"));
        assert_eq!(spec.resolve_key("-o"), Some("-o"));
        assert_eq!(spec.resolve_key("--ver"), None);
        assert_eq!(spec.resolve_key("--verb"), Some("--verbose"));
        assert_eq!(spec.resolve_key("--nothing"), None);
        assert_eq!(spec.resolve_key(""), None);
    }

    #[test]
    fn finalize_adds_default_help_once() {
        let spec = SpecBuilder::new("t").finalize().unwrap();
        assert_eq!(spec.params().len(), 1);
        assert!(spec.lookup("-?").is_some());
        assert!(spec.lookup("--help").is_some());

        let mut b = SpecBuilder::new("t");
        b.add_help(("-h", "--help")).unwrap();
        let spec = b.finalize().unwrap();
        assert_eq!(spec.params().len(), 1);
        assert!(spec.lookup("-?").is_none());
    }

    #[test]
    fn required_skips_optional_parameters() {
        let mut b = SpecBuilder::new("t");
        b.add_string("-a", None, "a")
            .unwrap()
            .add_string("-b", Some("x"), "b")
            .unwrap()
            .add_list_here("rest", false, "r")
            .unwrap();
        let spec = b.finalize().unwrap();
        let names: Vec<_> = spec.required().map(Param::short_key).collect();
        assert_eq!(names, ["-a", "rest"]);
    }
}

//! Single-pass parser: consumes a token sequence against a finalized
//! [`Spec`].

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::console::{Console, StdConsole, HELP_EXIT_STATUS};
use crate::diag::Diagnostics;
use crate::parser::error::ParseError;
use crate::parser::result::ParsedArgs;
use crate::parser::token::{is_key, split_csv, split_values, strip_negation, KeyToken};
use crate::spec::{version_message, Arity, Param, ParamKind, Role, Spec, Value, ValueType};

static STD_CONSOLE: StdConsole = StdConsole;

/// One parse of one token sequence.
///
/// ```ignore
/// let args = Parser::new(&spec)
///     .console(&console)
///     .parse(std::env::args().skip(1))?;
/// ```
pub struct Parser<'a> {
    spec: &'a Spec,
    console: &'a dyn Console,
    diagnostics: &'a Diagnostics,
}

impl<'a> Parser<'a> {
    /// Parser writing help/version to stdout, with the registry's
    /// diagnostics.
    pub fn new(spec: &'a Spec) -> Self {
        Self {
            spec,
            console: &STD_CONSOLE,
            diagnostics: spec.diagnostics(),
        }
    }

    pub fn console(mut self, console: &'a dyn Console) -> Self {
        self.console = console;
        self
    }

    pub fn diagnostics(mut self, diagnostics: &'a Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn parse<I, S>(self, tokens: I) -> Result<ParsedArgs, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scan = Scan::new(self, tokens.into_iter().map(Into::into).collect());
        scan.run()?;
        scan.finish()
    }
}

/// Mutable per-parse state. Lives only for one call to `Parser::parse`.
struct Scan<'a> {
    spec: &'a Spec,
    console: &'a dyn Console,
    diag: &'a Diagnostics,
    tokens: VecDeque<String>,
    /// Index into `spec.positionals()` of the next positional to fill.
    cursor: usize,
    /// Position of the last positional satisfied or skipped.
    last_positional: Option<usize>,
    /// Positions of parameters that received a value.
    seen: BTreeSet<usize>,
    /// Raw (pre-vetting) values, for duplicate detection and concatenation.
    raw: HashMap<usize, Value>,
    values: BTreeMap<String, Value>,
    rest: Vec<String>,
    done: bool,
}

impl<'a> Scan<'a> {
    fn new(parser: Parser<'a>, tokens: VecDeque<String>) -> Self {
        let mut values = BTreeMap::new();
        for param in parser.spec.params() {
            for name in names_of(param) {
                values.insert(name.to_string(), param.default().clone());
            }
        }
        Self {
            spec: parser.spec,
            console: parser.console,
            diag: parser.diagnostics,
            tokens,
            cursor: 0,
            last_positional: None,
            seen: BTreeSet::new(),
            raw: HashMap::new(),
            values,
            rest: Vec::new(),
            done: false,
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while !self.done {
            let Some(token) = self.tokens.pop_front() else {
                break;
            };
            self.diag.emit("parser", || {
                format!("next token is '{}', key: {}", token, is_key(&token))
            });

            if let Some(key) = KeyToken::parse(&token) {
                let handled = self.take_keyword(key.key, key.value)?
                    || self.take_flag_group(&key)?
                    || self.take_negated_flag(&key)?
                    || self.take_abbreviation(&key)?;
                if !handled {
                    return Err(ParseError::UnrecognizedOption { token });
                }
                continue;
            }
            self.take_positional(token)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<ParsedArgs, ParseError> {
        let missing: Vec<String> = self
            .spec
            .required()
            .filter(|p| !self.seen.contains(&p.position()))
            .map(Param::print_name)
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingRequired { names: missing });
        }
        tracing::debug!(
            values = self.values.len(),
            rest = self.rest.len(),
            "Command line parsed"
        );
        Ok(ParsedArgs::new(self.values, self.rest))
    }

    fn next_positional(&self) -> usize {
        self.spec.positionals()[self.cursor]
    }

    /// Exact key match. Markers act immediately; everything else acquires
    /// and stores a value.
    fn take_keyword(&mut self, key: &str, value: Option<&str>) -> Result<bool, ParseError> {
        let spec = self.spec;
        let Some(param) = spec.lookup(key) else {
            return Ok(false);
        };
        self.diag
            .emit("parser", || format!("key {} matches {}", key, param.print_name()));

        match param.role() {
            Role::Help => {
                self.console.print(&spec.help_text());
                self.console.exit(HELP_EXIT_STATUS);
                return Err(ParseError::help_shown());
            }
            Role::Version => {
                let message = match param.kind() {
                    ParamKind::Version { message } => message.clone(),
                    _ => version_message(spec.appname(), None, None),
                };
                self.console.print(&format!("{message}\n"));
                return Ok(true);
            }
            Role::End => {
                self.rest.extend(self.tokens.drain(..));
                self.done = true;
                return Ok(true);
            }
            Role::Positional => return Ok(false),
            Role::Keyword => {}
        }

        self.check_position(param)?;
        let raw = self.acquire(param, value)?;
        self.store(param, raw)?;
        Ok(true)
    }

    /// `-abc`, `-noabc`, `-no-abc`: every letter must be a groupable flag.
    fn take_flag_group(&mut self, key: &KeyToken<'_>) -> Result<bool, ParseError> {
        let spec = self.spec;
        if !spec.groups_flags() || key.dashes != "-" || key.value.is_some() {
            return Ok(false);
        }
        let (negated, letters) = strip_negation(key.name);
        if letters.is_empty() || !letters.chars().all(|c| spec.is_groupable(c)) {
            return Ok(false);
        }
        for c in letters.chars() {
            if let Some(param) = spec.lookup(&format!("-{c}")) {
                self.check_position(param)?;
                self.assign(param, Value::Bool(!negated));
            }
        }
        Ok(true)
    }

    /// `-nof`, `--no-name`, `--noname`, `--NO-name` for a negatable flag.
    fn take_negated_flag(&mut self, key: &KeyToken<'_>) -> Result<bool, ParseError> {
        let spec = self.spec;
        if key.value.is_some() {
            return Ok(false);
        }
        let (negated, name) = strip_negation(key.name);
        if !negated || name.is_empty() {
            return Ok(false);
        }
        match spec.lookup(&format!("{}{name}", key.dashes)) {
            Some(param) if param.is_negatable() => {
                self.check_position(param)?;
                self.assign(param, Value::Bool(false));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn take_abbreviation(&mut self, key: &KeyToken<'_>) -> Result<bool, ParseError> {
        let spec = self.spec;
        if !spec.abbreviates() || key.name.is_empty() {
            return Ok(false);
        }
        match spec.resolve_key(key.key) {
            Some(full) if full != key.key => {
                self.diag
                    .emit("parser", || format!("{} abbreviates {}", key.key, full));
                self.take_keyword(full, key.value)
            }
            _ => Ok(false),
        }
    }

    fn take_positional(&mut self, token: String) -> Result<(), ParseError> {
        let spec = self.spec;
        let position = self.next_positional();
        let Some(param) = spec.param(position) else {
            return Err(ParseError::UnexpectedValue { token });
        };
        self.last_positional = Some(position);
        self.cursor += 1;

        let raw = if param.arity().is_plural() {
            let mut items = vec![token];
            items.extend(self.take_value_tokens());
            Value::strings(items)
        } else {
            Value::Str(token)
        };
        let raw = match param.value_type() {
            ValueType::Csv => expand_csv(raw),
            _ => raw,
        };
        self.store(param, raw)?;

        if position + 1 == spec.params().len() {
            self.rest.extend(self.tokens.drain(..));
            self.done = true;
        }
        Ok(())
    }

    /// A keyword may not go back past a positional already consumed, and
    /// may not jump over a required positional that has no value yet.
    /// Optional positionals it jumps over are skipped (they keep their
    /// defaults).
    fn check_position(&mut self, param: &Param) -> Result<(), ParseError> {
        let spec = self.spec;
        if let Some(last) = self.last_positional {
            if param.position() < last {
                let after = spec
                    .param(last)
                    .map(Param::print_name)
                    .unwrap_or_default();
                return Err(ParseError::OutOfOrder {
                    key: param.print_name(),
                    after,
                });
            }
        }
        while param.position() > self.next_positional() {
            let next = self.next_positional();
            let Some(pending) = spec.param(next) else {
                break;
            };
            if pending.arity().is_required() {
                return Err(ParseError::RequiredPositionalSkipped {
                    positional: pending.print_name(),
                    key: param.print_name(),
                });
            }
            self.diag.emit("parser", || {
                format!("{} skips optional {}", param.print_name(), pending.print_name())
            });
            self.last_positional = Some(next);
            self.cursor += 1;
        }
        Ok(())
    }

    fn acquire(&mut self, param: &Param, value: Option<&str>) -> Result<Value, ParseError> {
        let raw = match param.arity() {
            Arity::None => Value::Bool(true),
            Arity::One | Arity::ZeroOrOne => match value {
                Some(v) => Value::from(v),
                None => match self.take_value_token() {
                    Some(token) => Value::Str(token),
                    None if param.arity() == Arity::ZeroOrOne => param.default().clone(),
                    None => {
                        return Err(ParseError::MissingValue {
                            key: param.print_name(),
                        })
                    }
                },
            },
            Arity::ZeroOrMore | Arity::OneOrMore => {
                let items = match value {
                    Some(v) => split_values(v),
                    None => self.take_value_tokens(),
                };
                if items.is_empty() && param.arity() == Arity::OneOrMore {
                    return Err(ParseError::NoValues {
                        key: param.print_name(),
                    });
                }
                Value::strings(items)
            }
        };
        Ok(match param.value_type() {
            ValueType::Csv => expand_csv(raw),
            _ => raw,
        })
    }

    /// Apply the duplicate policy, vet, and assign.
    fn store(&mut self, param: &Param, raw: Value) -> Result<(), ParseError> {
        let position = param.position();
        let raw = match self.raw.get(&position) {
            None => raw,
            Some(previous) if param.accumulates() => {
                if self.spec.cats_on_dup() {
                    concat(previous, raw)
                } else if *previous == raw {
                    return Ok(());
                } else {
                    return Err(ParseError::DuplicateValues {
                        key: param.print_name(),
                    });
                }
            }
            Some(previous) => {
                if *previous == raw || param.arity() == Arity::None {
                    return Ok(());
                }
                return Err(ParseError::DuplicateKey {
                    key: param.print_name(),
                });
            }
        };

        let vetted = param.vet(raw.clone()).map_err(|source| ParseError::Vet {
            key: param.print_name(),
            source,
        })?;
        self.raw.insert(position, raw);
        self.assign(param, vetted);
        Ok(())
    }

    fn assign(&mut self, param: &Param, value: Value) {
        self.diag.emit("assign", || {
            format!("assign '{}' to {:?}", value, param.attrnames())
        });
        for name in names_of(param) {
            self.values.insert(name.to_string(), value.clone());
        }
        self.seen.insert(param.position());
    }

    fn take_value_token(&mut self) -> Option<String> {
        match self.tokens.front() {
            Some(next) if !is_key(next) => self.tokens.pop_front(),
            _ => None,
        }
    }

    /// Greedily take tokens until one looks like a key.
    fn take_value_tokens(&mut self) -> Vec<String> {
        let mut items = Vec::new();
        while let Some(token) = self.take_value_token() {
            items.push(token);
        }
        items
    }
}

/// Attribute names, then surface keys.
fn names_of(param: &Param) -> impl Iterator<Item = &str> {
    param
        .attrnames()
        .iter()
        .map(String::as_str)
        .chain(param.keys())
}

fn expand_csv(raw: Value) -> Value {
    match raw {
        Value::Str(s) => Value::strings(split_csv(&s)),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .flat_map(|item| match item {
                    Value::Str(s) => split_csv(&s).into_iter().map(Value::Str).collect(),
                    other => vec![other],
                })
                .collect(),
        ),
        other => other,
    }
}

fn concat(previous: &Value, raw: Value) -> Value {
    let mut items = match previous {
        Value::List(items) => items.clone(),
        other => vec![other.clone()],
    };
    match raw {
        Value::List(more) => items.extend(more),
        other => items.push(other),
    }
    Value::List(items)
}

//! Token classification.

/// Platform path-list separator (`:` on Unix, `;` on Windows).
pub const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// A token that names a key: `-name`, `--name`, optionally with `=value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyToken<'a> {
    /// Dashes and name, without the `=value` part.
    pub key: &'a str,
    /// `-` or `--`.
    pub dashes: &'a str,
    /// Name after the dashes. Empty for a bare `--`.
    pub name: &'a str,
    pub value: Option<&'a str>,
}

impl<'a> KeyToken<'a> {
    /// Classify `token`. Returns `None` for value tokens: anything without
    /// leading dashes, more than two dashes, or a name starting with a
    /// digit (so `-5` stays a value).
    pub fn parse(token: &'a str) -> Option<Self> {
        if token.len() < 2 {
            return None;
        }
        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (token, None),
        };
        let dash_count = key.len() - key.trim_start_matches('-').len();
        if dash_count == 0 || dash_count > 2 {
            return None;
        }
        let (dashes, name) = key.split_at(dash_count);
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            key,
            dashes,
            name,
            value,
        })
    }
}

pub fn is_key(token: &str) -> bool {
    KeyToken::parse(token).is_some()
}

/// Split an embedded list value on commas and the path-list separator.
pub fn split_values(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split([',', PATH_LIST_SEPARATOR])
        .map(str::to_string)
        .collect()
}

/// Split a value on commas only.
pub fn split_csv(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}

/// Strip a leading `no`/`NO` negation, with an optional `-` after it.
/// Returns `(negated, rest)`; never strips down to an empty rest.
pub fn strip_negation(name: &str) -> (bool, &str) {
    let rest = name
        .strip_prefix("no")
        .or_else(|| name.strip_prefix("NO"))
        .map(|rest| rest.strip_prefix('-').unwrap_or(rest));
    match rest {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, name),
    }
}

//! The immutable outcome of a successful parse.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::spec::Value;

/// Every attribute name and surface key mapped to its resolved value,
/// plus any tokens left unparsed after the end marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedArgs {
    values: BTreeMap<String, Value>,
    rest: Vec<String>,
}

impl ParsedArgs {
    pub(crate) fn new(values: BTreeMap<String, Value>, rest: Vec<String>) -> Self {
        Self { values, rest }
    }

    /// Look up by attribute name (`output_file`) or key (`--output-file`).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_float()
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.get(name)?.as_path()
    }

    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name)?.as_list()
    }

    /// List elements that are strings; `None` if any element is not.
    pub fn strings(&self, name: &str) -> Option<Vec<&str>> {
        self.list(name)?.iter().map(Value::as_str).collect()
    }

    /// Tokens after the end marker, or after the final positional ended the
    /// parse.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }
}

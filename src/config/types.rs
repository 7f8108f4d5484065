use serde::{Deserialize, Serialize};

/// Root of a declarative spec file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecFile {
    /// Application name shown in help and version output.
    #[serde(default)]
    pub appname: Option<String>,
    /// Registers `--version` when set.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Allow `-abc` for single-letter flags (default: true).
    #[serde(default = "default_true")]
    pub group_flags: bool,
    /// Accept unambiguous key prefixes (default: true).
    #[serde(default = "default_true")]
    pub may_abbreviate: bool,
    /// Concatenate repeated list keys (default: true).
    #[serde(default = "default_true")]
    pub cat_on_dup: bool,
    /// Diagnostic enable patterns, e.g. `["parser", "attrs"]`.
    #[serde(default)]
    pub debug: Vec<String>,
    #[serde(default)]
    pub help_prefix: Option<String>,
    #[serde(default)]
    pub help_suffix: Option<String>,
    #[serde(default, rename = "param")]
    pub params: Vec<ParamEntry>,
}

/// One `[[param]]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamEntry {
    /// Primary key. No leading dashes means positional.
    pub key: String,
    #[serde(default)]
    pub long: Option<String>,
    /// flag, string, integer, float, path, csv, list, path-list, end, help
    /// or version. Absent means a generic entry built from the explicit tags.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub default: Option<toml::Value>,
    /// Zero values allowed (csv, list and path-list kinds).
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub must_exist: bool,
    #[serde(default)]
    pub must_be_dir: bool,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub attrname: Option<String>,
    #[serde(default)]
    pub arity: Option<String>,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SpecFile {
    fn default() -> Self {
        Self {
            appname: None,
            version: None,
            date: None,
            group_flags: true,
            may_abbreviate: true,
            cat_on_dup: true,
            debug: Vec::new(),
            help_prefix: None,
            help_suffix: None,
            params: Vec::new(),
        }
    }
}

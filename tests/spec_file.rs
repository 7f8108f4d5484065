//! Loading and building declarative spec files.

use std::fs;
use std::path::Path;

use cmdspec::config::{ConfigError, SpecFile};
use cmdspec::{BufferConsole, Parser, SpecError};
use tempfile::TempDir;

const COPY_SPEC: &str = r#"
appname = "copy"
version = "2.0"
date = "2024-05-01"
debug = ["parser"]

[[param]]
key = "-v"
long = "--verbose"
kind = "flag"
help = "chatty output"

[[param]]
key = "-n"
kind = "integer"
default = 1
help = "number of copies"

[[param]]
key = "-x"
kind = "csv"
optional = true

[[param]]
key = "src"
kind = "string"
help = "source file"

[[param]]
key = "dest"
kind = "string"
default = "."
"#;

fn write_spec(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("spec.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn config_path_ends_with_expected() {
    assert!(SpecFile::config_path().ends_with("cmdspec/spec.toml"));
}

#[test]
fn loads_and_builds_a_working_spec() {
    let dir = TempDir::new().unwrap();
    let file = SpecFile::load(&write_spec(&dir, COPY_SPEC)).unwrap();
    assert_eq!(file.appname.as_deref(), Some("copy"));
    assert_eq!(file.params.len(), 5);
    assert!(file.group_flags);

    let spec = file.build().unwrap();
    assert_eq!(spec.diagnostics().patterns(), ["parser"]);

    let args = spec.parse(["-v", "-n", "4", "-x", "p,q", "a.txt"]).unwrap();
    assert_eq!(args.flag("verbose"), Some(true));
    assert_eq!(args.string("src"), Some("a.txt"));
    assert_eq!(args.string("dest"), Some("."));
    assert_eq!(args.integer("n"), Some(4));
    assert_eq!(args.strings("x"), Some(vec!["p", "q"]));
}

#[test]
fn top_level_version_registers_a_version_switch() {
    let dir = TempDir::new().unwrap();
    let spec = SpecFile::load(&write_spec(&dir, COPY_SPEC))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(spec.version_message(), Some("copy: Version 2.0, 2024-05-01"));

    let console = BufferConsole::new();
    Parser::new(&spec)
        .console(&console)
        .parse(["--version", "a"])
        .unwrap();
    assert_eq!(console.output(), "copy: Version 2.0, 2024-05-01\n");
}

#[test]
fn policy_switches_and_help_frame_come_from_the_file() {
    let content = r#"
appname = "t"
group_flags = false
cat_on_dup = false
help_prefix = "Usage"
help_suffix = "bye"

[[param]]
key = "-a"
kind = "flag"

[[param]]
key = "-b"
kind = "flag"
"#;
    let dir = TempDir::new().unwrap();
    let spec = SpecFile::load(&write_spec(&dir, content))
        .unwrap()
        .build()
        .unwrap();
    assert!(!spec.groups_flags());
    assert!(!spec.cats_on_dup());
    assert!(spec.abbreviates());

    let help = spec.help_text();
    assert!(help.starts_with("Usage\n"));
    assert!(help.trim_end().ends_with("bye"));
}

#[test]
fn generic_entries_use_explicit_tags() {
    let content = r#"
[[param]]
key = "--files"
arity = "one-or-more"
value_type = "list"

[[param]]
key = "--"
"#;
    let dir = TempDir::new().unwrap();
    let spec = SpecFile::load(&write_spec(&dir, content))
        .unwrap()
        .build()
        .unwrap();

    let args = spec.parse(["--files", "a", "b", "--", "c"]).unwrap();
    assert_eq!(args.strings("files"), Some(vec!["a", "b"]));
    assert_eq!(args.rest(), ["c"]);
}

#[test]
fn unknown_kind_is_a_spec_error() {
    let content = r#"
[[param]]
key = "-a"
kind = "flagg"
"#;
    let dir = TempDir::new().unwrap();
    let err = SpecFile::load(&write_spec(&dir, content))
        .unwrap()
        .build()
        .unwrap_err();
    match err {
        ConfigError::Spec(SpecError::UnknownTag { kind, tag }) => {
            assert_eq!(kind, "parameter kind");
            assert_eq!(tag, "flagg");
        }
        other => panic!("Expected UnknownTag, got {other:?}"),
    }
}

#[test]
fn duplicate_keys_in_the_file_fail_the_build() {
    let content = r#"
[[param]]
key = "-a"
kind = "flag"

[[param]]
key = "-a"
kind = "string"
"#;
    let dir = TempDir::new().unwrap();
    let err = SpecFile::load(&write_spec(&dir, content))
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Spec(SpecError::DuplicateKey { .. })
    ));
}

#[test]
fn empty_key_fails_validation() {
    let content = r#"
[[param]]
key = ""
"#;
    let dir = TempDir::new().unwrap();
    match SpecFile::load(&write_spec(&dir, content)).unwrap_err() {
        ConfigError::ValidationError { message } => assert!(message.contains("empty key")),
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "appname = ");
    match SpecFile::load(&path).unwrap_err() {
        ConfigError::ParseError { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let err = SpecFile::load(Path::new("/definitely/not/here/spec.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
    assert!(err.to_string().contains("Failed to read spec file"));
}

//! Tests for the `cmdspec` binary, driven through `std::process::Command`.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

const SPEC: &str = r#"
appname = "copy"
version = "1.0"

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
key = "src"
kind = "string"
help = "source file"
"#;

fn cmdspec_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cmdspec"))
}

fn spec_dir() -> (TempDir, String) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("spec.toml");
    fs::write(&path, SPEC).expect("Failed to write spec");
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

#[test]
fn test_json_output() {
    let (_dir, spec) = spec_dir();
    let output = cmdspec_cmd()
        .args(["--spec", &spec, "--", "-v", "-n", "3", "a.txt"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(json["values"]["verbose"], true);
    assert_eq!(json["values"]["n"], 3);
    assert_eq!(json["values"]["src"], "a.txt");
}

#[test]
fn test_text_output() {
    let (_dir, spec) = spec_dir();
    let output = cmdspec_cmd()
        .args(["--spec", &spec, "--format", "text", "--", "a.txt"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("src = a.txt\n"));
    assert!(stdout.contains("verbose = false\n"));
    assert!(stdout.contains("n = 1\n"));
}

#[test]
fn test_parse_error_exits_with_one() {
    let (_dir, spec) = spec_dir();
    let output = cmdspec_cmd()
        .args(["--spec", &spec, "--", "-v"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: required parameters missing: src."));
}

#[test]
fn test_help_exits_with_101() {
    let (_dir, spec) = spec_dir();
    let output = cmdspec_cmd()
        .args(["--spec", &spec, "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(101));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("copy: Version 1.0\n\nUSAGE:\n"));
    assert!(stdout.contains("PARAMETERS:"));
}

#[test]
fn test_missing_spec_file_is_reported() {
    let output = cmdspec_cmd()
        .args(["--spec", "/definitely/not/here.toml", "--", "x"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Failed to read spec file '/definitely/not/here.toml'"));
}

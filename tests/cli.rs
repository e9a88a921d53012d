use std::fs;
use std::process::{Command, Output};

fn lucyc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lucyc"))
        .args(args)
        .output()
        .expect("binary runs")
}

#[test]
fn prints_module_on_stdout() {
    let out = lucyc(&["tests/snapshots/nested_state/input.lucy"]);
    let expected = fs::read_to_string("tests/snapshots/nested_state/expected.js").unwrap();

    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), expected);
}

#[test]
fn requires_a_filename() {
    let out = lucyc(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("A filename is required"));
}

#[test]
fn reports_compile_errors_on_stderr() {
    let out = lucyc(&["tests/fixtures/duplicate_state.lucy"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(
        String::from_utf8_lossy(&out.stderr)
            .contains("tests/fixtures/duplicate_state.lucy:5:9: validation error: duplicate state 'green'")
    );
}

#[test]
fn reports_missing_file() {
    let out = lucyc(&["tests/fixtures/does_not_exist.lucy"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Reading tests/fixtures/does_not_exist.lucy"));
}

#[test]
fn dumps_ast_as_json() {
    let out = lucyc(&["--emit", "ast", "tests/snapshots/nested_state/input.lucy"]);
    assert!(out.status.success());

    let ast: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(ast["name"], "light");
    assert_eq!(ast["initial"], "green");
    assert_eq!(ast["states"][2]["children"]["initial"], "walk");
    assert_eq!(ast["states"][2]["children"]["states"][2]["final"], true);
}

//! Integration tests for the Theta compiler CLI.
//!
//! These tests exercise the `thetac` binary in a realistic environment by spawning
//! the compiled executable and validating its behavior through stdout, stderr, and
//! exit codes.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn write_source(dir: &assert_fs::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let child = dir.child(name);
    child.write_str(contents).unwrap();
    child.path().to_path_buf()
}

#[test]
fn fails_when_file_missing() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.arg("this-file-does-not-exist.th");
    cmd.assert().failure().stderr(predicate::str::contains("path not found"));
}

#[test]
fn compiles_a_trivial_capsule_to_wasm() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = write_source(&temp, "main.th", "capsule Main { main = () -> 10 + 5 }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&source);
    cmd.assert().success().stdout(predicate::str::contains("Compiled"));

    temp.child("main.wasm").assert(predicate::path::exists());
}

#[test]
fn honors_the_output_flag() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = write_source(&temp, "main.th", "capsule Main { main = () -> 1 }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&source).arg("-o").arg("out.wasm");
    cmd.assert().success();

    temp.child("out.wasm").assert(predicate::path::exists());
}

#[test]
fn reports_type_errors_and_exits_nonzero() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = write_source(&temp, "main.th", "capsule Main { main = () -> 1 + 'x' }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&source);
    cmd.assert().failure().stderr(predicate::str::contains("TypeError"));
}

#[test]
fn emit_tokens_prints_lexer_output() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = write_source(&temp, "main.th", "capsule Main { main = () -> 1 }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&source).arg("--emitTokens");
    cmd.assert().success().stdout(predicate::str::contains("Token"));
}

#[test]
fn emit_ast_prints_the_parsed_tree() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = write_source(&temp, "main.th", "capsule Main { main = () -> 1 }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&source).arg("--emitAST");
    cmd.assert().success().stdout(predicate::str::contains("Capsule"));
}

#[test]
fn emit_wat_prints_text_format() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = write_source(&temp, "main.th", "capsule Main { main = () -> 1 }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&source).arg("--emitWAT");
    cmd.assert().success().stdout(predicate::str::contains("module"));
}

#[test]
fn resolves_links_against_discovered_capsules() {
    let temp = assert_fs::TempDir::new().unwrap();
    write_source(&temp, "lib.th", "capsule Lib { helper = 4 }");
    let main = write_source(&temp, "main.th", "link Lib\ncapsule Main { main = () -> 1 }");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.current_dir(temp.path()).arg(&main);
    cmd.assert().success();
}

#[test]
fn shows_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("thetac"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

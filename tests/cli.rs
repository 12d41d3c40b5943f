//! End-to-end CLI tests (`spec.md` §6), in the style of the `assert_cmd`/
//! `predicates` e2e suites used elsewhere in this retrieval pack (e.g.
//! `faxc-drv`'s `tests/e2e/cli_tests.rs`).
use std::fs;
use std::process;

use assert_cmd::Command;
use predicates::prelude::*;

fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("c0c-test-{}-{name}", process::id()))
}

#[test]
fn compiles_to_binary_with_dash_c() {
    let input = scratch_path("hello.c0");
    let output = scratch_path("hello.bin");
    fs::write(&input, "int main(){return 0;}").unwrap();

    Command::cargo_bin("c0c")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-c")
        .assert()
        .success();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[0..4], &[0x43, 0x30, 0x3A, 0x29]);
}

#[test]
fn compiles_to_assembly_with_dash_s() {
    let input = scratch_path("hello2.c0");
    let output = scratch_path("hello2.s");
    fs::write(&input, "int main(){return 0;}").unwrap();

    Command::cargo_bin("c0c")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-s")
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains(".functions:"));
}

#[test]
fn requires_exactly_one_of_compile_or_assembly() {
    let input = scratch_path("hello3.c0");
    fs::write(&input, "int main(){return 0;}").unwrap();

    Command::cargo_bin("c0c")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg("-")
        .assert()
        .failure();
}

#[test]
fn analysis_errors_exit_with_code_2() {
    let input = scratch_path("bad.c0");
    fs::write(&input, "int f(){return 0;}").unwrap();

    Command::cargo_bin("c0c")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg("-")
        .arg("-s")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("main"));
}

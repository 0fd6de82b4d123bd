//! End-to-end CLI tests driving the real `cppcheck` binary through
//! `assert_cmd`.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cppcheck() -> Command {
    Command::cargo_bin("cppcheck").unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn no_arguments_prints_usage_and_exits_zero() {
    cppcheck()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("cppcheck")));
}

#[test]
fn clean_file_reports_no_errors_found_on_stdout() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "clean.c", "int main(){return 0;}");

    cppcheck()
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No errors found"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn leaking_file_reports_a_diagnostic_on_stderr_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "leak.cpp", "void f(){int*a=new int[10];}");

    cppcheck()
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Memory leak: a"));
}

#[test]
fn errorsonly_suppresses_progress_lines() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "clean.c", "int main(){return 0;}");

    cppcheck()
        .arg("--errorsonly")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn style_flag_enables_struct_member_check() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "a.c", "struct S{int a;}; int main(){return 0;}");

    cppcheck()
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    cppcheck()
        .arg("--style")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("struct member 'S::a' is never read"));
}

#[test]
fn missing_file_prints_cannot_open_and_still_exits_zero() {
    cppcheck()
        .arg("/no/such/file.c")
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot open"));
}

#[test]
fn recursive_flag_discovers_source_files_in_a_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    write_file(&dir, "a.c", "int main(){return 0;}");
    std::fs::write(dir.path().join("sub").join("b.cpp"), "void f(){int*p=new int[4];}").unwrap();

    cppcheck()
        .arg("--recursive")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Memory leak: p"));
}

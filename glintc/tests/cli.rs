//! Black-box CLI tests driving the built `glintc` binary end-to-end,
//! grounded on `faxc-drv/tests/e2e/cli_tests.rs`'s `assert_cmd` style.
//! Exercises `spec.md` §8's six literal scenarios plus its boundary tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_script(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn glintc() -> Command {
    Command::cargo_bin("glintc").unwrap()
}

#[test]
fn scenario_arithmetic_precedence() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "s1.gln", "println(1+2*3);");
    glintc().arg(&path).assert().success().stdout("7\n");
}

#[test]
fn scenario_user_function_call() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        "s2.gln",
        "form f(x,y){ return x*x+y*y; } println(f(3,4));",
    );
    glintc().arg(&path).assert().success().stdout("25\n");
}

#[test]
fn scenario_while_loop_with_bare_assignment() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "s3.gln", "i=0; while i<3 { println(i); i=i+1; }");
    glintc().arg(&path).assert().success().stdout("0\n1\n2\n");
}

#[test]
fn scenario_if_else() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        "s4.gln",
        "if 2==2 println(\"ok\"); else println(\"bad\");",
    );
    glintc().arg(&path).assert().success().stdout("ok\n");
}

#[test]
fn scenario_vector_literal_printing() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "s5.gln", "println([1,2,3]);");
    glintc().arg(&path).assert().success().stdout("[1, 2, 3]\n");
}

#[test]
fn scenario_radix_literals() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "s6.gln", "println(0xFF + 0b10);");
    glintc().arg(&path).assert().success().stdout("257\n");
}

#[test]
fn boundary_unterminated_string_is_a_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "bad.gln", "println(\"abc);");
    glintc().arg(&path).assert().failure();
}

#[test]
fn boundary_division_by_zero_is_a_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "divzero.gln", "println(1/0);");
    glintc().arg(&path).assert().failure();
}

#[test]
fn boundary_arity_mismatch_is_a_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        "arity.gln",
        "form f(a, b) { return a + b; } println(f(1));",
    );
    glintc().arg(&path).assert().failure();
}

#[test]
fn boundary_loose_break_outside_loop_is_tolerated() {
    // A `break` outside any loop unwinds the top-level block like any other
    // block (stopping statements after it) but is not an error: the program
    // still exits successfully, it just never reaches the trailing println.
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "loose_break.gln", "println(7); break; println(8);");
    glintc().arg(&path).assert().success().stdout("7\n");
}

#[test]
fn debug_flag_prints_the_ast_before_evaluating() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "debug.gln", "println(1);");
    glintc()
        .arg("-d")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Program").and(predicate::str::contains("1\n")));
}

#[test]
fn compile_then_vm_run_round_trips_through_bytecode() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "prog.gln", "println(6*7);");

    glintc().arg("-c").arg(&path).assert().success();
    let bytecode_path = path.with_extension("glnc");
    assert!(bytecode_path.exists());

    glintc().arg(&bytecode_path).assert().success().stdout("42\n");
}

#[test]
fn missing_input_file_exits_nonzero() {
    glintc().assert().failure();
}

#[test]
fn help_flag_exits_with_code_one() {
    glintc()
        .arg("--help")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("glintc"));
}

#[test]
fn trailing_args_are_forwarded_to_the_running_program() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "args.gln", "println(args());");
    glintc()
        .arg(&path)
        .arg("--")
        .arg("hello")
        .arg("world")
        .assert()
        .success()
        .stdout("[hello, world]\n");
}

// End-to-end runs of the isotest binary over the scripts in tests/fixtures.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

use std::{
    fs,
    io::{BufRead, BufReader, Read},
    process::{self, Stdio},
};

use assert_cmd::Command;
use predicates::{
    prelude::PredicateBooleanExt,
    str::{contains, ends_with},
};

fn isotest() -> Command {
    let mut cmd = Command::cargo_bin("isotest").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("ISOTEST_LOG");
    cmd
}

fn fixture(name: &str) -> String {
    format!("tests/fixtures/{name}")
}

#[test]
fn passing_file_exits_zero_with_ticks_and_pass_lines() {
    isotest()
        .arg(fixture("success.ist"))
        .assert()
        .success()
        .stdout(
            contains("Scope: arithmetic\n\n  ••\n  Test: adds ✔\n")
                .and(contains("  •\n  Test: divides ✔\n"))
                .and(ends_with("s)\n\n")),
        );
}

#[test]
fn failing_assertion_reports_site_and_summary() {
    let file = fixture("failure.ist");
    isotest().arg(&file).assert().code(1).stdout(contains(format!(
        "Scope: arithmetic\n\n  Test: adds ✘\n  → file: {file} ↪3\n  → line: (assert-equal 3 (+ 1 1))))\n  AssertionFailed: 3 != 2\n\n"
    )));
}

#[test]
fn first_failing_file_stops_the_run() {
    isotest()
        .arg(fixture("success.ist"))
        .arg(fixture("failure.ist"))
        .arg(fixture("third_file.ist"))
        .assert()
        .code(1)
        .stdout(
            contains("Test: adds ✔")
                .and(contains("AssertionFailed: 3 != 2"))
                .and(contains("third file ran").not()),
        );
}

#[test]
fn every_file_runs_when_all_pass() {
    isotest()
        .arg(fixture("success.ist"))
        .arg(fixture("third_file.ist"))
        .assert()
        .success()
        .stdout(contains("third file ran\n"));
}

#[test]
fn error_in_loaded_helper_traces_from_the_test_inward() {
    let file = fixture("exception.ist");
    isotest().arg(&file).assert().code(1).stdout(contains(format!(
        "  Test: helper raises ✘\n\
         \x20 → file: {file} ↪4\n\
         \x20 → line: (explode \"boom\"))\n\
         \x20 → file: tests/fixtures/support/helper.ist ↪2\n\
         \x20 → line: (raise RuntimeError message))\n\
         \x20 RuntimeError: boom\n"
    )));
}

#[test]
fn assertion_inside_loaded_file_points_at_that_file() {
    isotest()
        .arg(fixture("failure_in_loaded_file.ist"))
        .assert()
        .code(1)
        .stdout(
            contains("  → file: tests/fixtures/support/helper.ist ↪5\n  → line: (assert (> n 0)))\n")
                .and(contains("AssertionFailed: expression returned false"))
                .and(contains("failure_in_loaded_file.ist ↪").not()),
        );
}

#[test]
fn custom_assertion_reports_the_calling_line() {
    let file = fixture("fail_custom_assertion.ist");
    isotest().arg(&file).assert().code(1).stdout(contains(format!(
        "  •\n  Test: custom ✘\n  → file: {file} ↪8\n  → line: (assert-even 3))\n  AssertionFailed: 3 is odd\n"
    )));
}

#[test]
fn prelude_frames_are_hidden() {
    let file = fixture("prelude_assertion.ist");
    isotest().arg(&file).assert().code(1).stdout(
        contains(format!("  → file: {file} ↪2\n"))
            .and(contains("AssertionFailed: expected nil, got 1"))
            .and(contains("<internal").not()),
    );
}

#[test]
fn assertion_outside_any_test_has_an_unnamed_failure_line() {
    let file = fixture("outside_block.ist");
    isotest().arg(&file).assert().code(1).stdout(contains(format!(
        "•\n  Test: ✘\n  → file: {file} ↪2\n  → line: (assert-equal 1 2)\n  AssertionFailed: 1 != 2\n"
    )));
}

#[test]
fn syntax_error_prints_only_the_summary() {
    isotest()
        .arg(fixture("syntax_error.ist"))
        .assert()
        .code(1)
        .stdout(
            contains("  SyntaxError: tests/fixtures/syntax_error.ist:")
                .and(contains("✘").not())
                .and(contains("→ file").not()),
        );
}

#[test]
fn missing_file_is_a_load_error() {
    isotest()
        .arg(fixture("does_not_exist.ist"))
        .assert()
        .code(1)
        .stdout(contains(
            "  LoadError: cannot load such file -- tests/fixtures/does_not_exist.ist",
        ));
}

#[test]
fn test_filter_runs_only_the_named_test() {
    isotest()
        .args(["-t", "three"])
        .arg(fixture("filters.ist"))
        .assert()
        .success()
        .stdout(contains("Test: three ✔").and(contains("ran").not()));
}

#[test]
fn scope_filter_runs_only_the_named_scope() {
    isotest()
        .args(["--scope", "first"])
        .arg(fixture("filters.ist"))
        .assert()
        .code(1)
        .stdout(contains("AssertionFailed: first scope ran").and(contains("second/two").not()));
}

#[test]
fn scope_and_test_filters_combine() {
    isotest()
        .args(["-s", "second", "-t", "two"])
        .arg(fixture("filters.ist"))
        .assert()
        .code(1)
        .stdout(contains("Test: two ✘").and(contains("Test: three").not()));
}

#[test]
fn prepare_runs_before_each_test_and_setup_feeds_the_parameter() {
    isotest()
        .arg(fixture("prepare_setup.ist"))
        .assert()
        .success()
        .stdout(contains("Test: first ✔").and(contains("Test: second ✔")));
}

#[test]
fn backtrace_flag_prints_every_frame() {
    let file = fixture("exception.ist");
    isotest()
        .arg("-b")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(contains(format!("  → file: {file} ↪3\n")).and(contains("RuntimeError: boom")));
}

#[test]
fn env_file_values_reach_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join("test.env");
    fs::write(&env_file, "# fixture values\nISOTEST_FIXTURE_VALUE=from-file\n").unwrap();

    isotest()
        .arg("-e")
        .arg(&env_file)
        .arg(fixture("env_reader.ist"))
        .assert()
        .success()
        .stdout(contains("Test: reads env ✔"));
}

#[test]
fn malformed_env_file_is_a_harness_error() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join("bad.env");
    fs::write(&env_file, "GOOD=1\nnot a pair\n").unwrap();

    isotest()
        .arg("-e")
        .arg(&env_file)
        .arg(fixture("success.ist"))
        .assert()
        .code(2)
        .stderr(contains("isotest::env_file").and(contains("malformed line 2")));
}

#[test]
fn config_file_selects_the_test() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("isotest.toml");
    fs::write(&config, "selected_test = \"three\"\n").unwrap();

    isotest()
        .arg("-c")
        .arg(&config)
        .arg(fixture("filters.ist"))
        .assert()
        .success();
}

#[test]
fn unknown_config_key_is_a_harness_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("isotest.toml");
    fs::write(&config, "selected_tset = \"typo\"\n").unwrap();

    isotest()
        .arg("--config")
        .arg(&config)
        .arg(fixture("success.ist"))
        .assert()
        .code(2)
        .stderr(contains("isotest::config").and(contains("help:")));
}

#[test]
fn no_files_is_a_usage_error() {
    isotest().assert().failure().stderr(contains("Usage"));
}

#[test]
fn direct_flunk_points_at_its_own_line() {
    let file = fixture("flunk.ist");
    isotest().arg(&file).assert().code(1).stdout(contains(format!(
        "  •\n  Test: gives up ✘\n  → file: {file} ↪4\n  → line: (flunk \"boom\")))\n  AssertionFailed: boom\n"
    )));
}

#[test]
fn assert_raise_names_the_kind_actually_raised() {
    isotest()
        .arg(fixture("wrong_kind.ist"))
        .assert()
        .code(1)
        .stdout(contains(
            "AssertionFailed: expected TypeError, got ArgumentError: bad argument",
        ));
}

#[test]
fn runaway_recursion_is_reported_as_too_deep() {
    isotest()
        .arg(fixture("deep_recursion.ist"))
        .assert()
        .code(1)
        .stdout(
            contains("Test: bounded ✔")
                .and(contains("  •\n  Test: caught ✔"))
                .and(contains("  Test: unbounded ✘\n"))
                .and(contains("  RuntimeError: stack level too deep\n"))
                .and(contains("overflowed").not()),
        );
}

#[cfg(unix)]
#[test]
fn rescue_mode_pauses_the_failing_child_until_interrupted() {
    let mut run = process::Command::new(env!("CARGO_BIN_EXE_isotest"))
        .env("NO_COLOR", "1")
        .env_remove("ISOTEST_LOG")
        .arg("-p")
        .arg(fixture("failure.ist"))
        .arg(fixture("third_file.ist"))
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdout = BufReader::new(run.stdout.take().unwrap());

    let mut output = String::new();
    let paused_pid = loop {
        let mut line = String::new();
        let read = stdout.read_line(&mut line).unwrap();
        assert_ne!(read, 0, "child never paused:\n{output}");
        output.push_str(&line);
        if let Some(rest) = line.split("paused for inspection (pid ").nth(1) {
            break rest.split(')').next().unwrap().to_string();
        }
    };
    assert!(output.contains("AssertionFailed: 3 != 2"), "{output}");

    // Interrupt the orchestrator too: it must survive and keep waiting.
    let kill = process::Command::new("kill")
        .args(["-INT", &run.id().to_string(), &paused_pid])
        .status()
        .unwrap();
    assert!(kill.success());

    stdout.read_to_string(&mut output).unwrap();
    let status = run.wait().unwrap();
    assert_eq!(status.code(), Some(1), "{output}");
    assert!(!output.contains("third file ran"), "{output}");
}

//! Command-line runs of the `task-sched` binary.

use std::path::Path;
use std::process::{Command, Output};

fn task_sched(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_task-sched"))
        .args(args)
        .output()
        .unwrap()
}

fn assert_exit_minus_one(output: &Output) {
    assert!(!output.status.success());
    #[cfg(unix)]
    assert_eq!(output.status.code(), Some(255));
    #[cfg(windows)]
    assert_eq!(output.status.code(), Some(-1));
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_no_policy_lists_available() {
    let output = task_sched(&[]);
    assert_exit_minus_one(&output);
    let err = stderr(&output);
    assert!(err.contains("No scheduling policy given"), "{err}");
    assert!(err.contains("fcfs"), "{err}");
}

#[test]
fn test_unknown_policy_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let output = task_sched(&["fcfs", "lottery", "--output-dir", out]);
    assert_exit_minus_one(&output);
    assert!(stderr(&output).contains("Could not install policy 'lottery'"));
    assert!(!dir.path().join("fcfs.log").exists());
}

#[test]
fn test_duplicate_policy_rejected() {
    let output = task_sched(&["rr", "rr", "--no-report"]);
    assert_exit_minus_one(&output);
    assert!(stderr(&output).contains("Could not install policy 'rr'"));
}

#[test]
fn test_reports_written_per_policy() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports");
    let output = task_sched(&[
        "fcfs",
        "rr",
        "--count",
        "8",
        "--seed",
        "3",
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("Found algorithm: fcfs"), "{text}");
    assert!(text.contains("Found algorithm: rr"), "{text}");
    for name in ["fcfs", "rr"] {
        assert!(out.join(format!("{name}.log")).exists());
        assert!(out.join(format!("{name}.json")).exists());
    }
    let log = std::fs::read_to_string(out.join("fcfs.log")).unwrap();
    assert!(log.contains("Makespan:"));
}

#[test]
fn test_no_report_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = task_sched(&[
        "srtn",
        "--count",
        "5",
        "--no-report",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Found algorithm: srtn"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_explicit_task_file() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks.json");
    std::fs::write(
        &tasks,
        r#"[
            {"name": "A", "arrive_time": 0, "run_time": 3},
            {"name": "B", "arrive_time": 1, "run_time": 2}
        ]"#,
    )
    .unwrap();
    let output = run_with_tasks(&tasks, dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("makespan 5"));

    let log = std::fs::read_to_string(dir.path().join("fcfs.log")).unwrap();
    assert!(log.contains("Task A: Arrived: 0, Finished: 3"), "{log}");
    assert!(log.contains("Task B: Arrived: 1, Finished: 5"), "{log}");
}

#[test]
fn test_invalid_task_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks.json");
    std::fs::write(&tasks, r#"[{"name": "A", "arrive_time": 0, "run_time": 0}]"#).unwrap();
    let output = run_with_tasks(&tasks, dir.path());
    assert!(!output.status.success());
    assert!(!dir.path().join("fcfs.log").exists());
}

fn run_with_tasks(tasks: &Path, out: &Path) -> Output {
    task_sched(&[
        "fcfs",
        "--tasks",
        tasks.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ])
}

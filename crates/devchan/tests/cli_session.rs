#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn run_session(extra_args: &[&str], script: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_devchan"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("session")
        .args(extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("session command should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(script.as_bytes())
        .expect("script should be writable");

    child.wait_with_output().expect("session should finish")
}

fn records(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect()
}

#[test]
fn write_then_read_round_trip() {
    let output = run_session(&[], "open\nwrite device hello\ncat device 0\nclose\n");
    assert!(output.status.success());

    let records = records(&output);
    assert_eq!(records.len(), 4);
    assert_eq!(records[1]["count"], 5);
    assert_eq!(records[2]["data"], "hello");
    assert_eq!(records[2]["offset"], 5);
}

#[test]
fn fresh_device_read_is_end_of_data() {
    let output = run_session(&[], "read device 0 64\n");
    assert!(output.status.success());
    let records = records(&output);
    assert_eq!(records[0]["count"], 0);
    assert_eq!(records[0]["data"], "");
}

#[test]
fn out_of_space_sets_exit_code_and_continues() {
    let output = run_session(&[], "write device 1023 x\nwrite device 0 ok\n");
    assert_eq!(output.status.code(), Some(28));

    let records = records(&output);
    assert_eq!(records.len(), 2);
    assert!(records[0]["error"]
        .as_str()
        .map(|s| s.contains("no space left"))
        .unwrap_or(false));
    assert_eq!(records[1]["count"], 2);
}

#[test]
fn status_reads_serve_advisory() {
    let output = run_session(
        &["--advisory", "custom advisory"],
        "write status something\ncat status 0\n",
    );
    assert!(output.status.success());
    let records = records(&output);
    assert_eq!(records[1]["data"], "custom advisory");
}

#[test]
fn malformed_line_is_a_usage_error() {
    let output = run_session(&[], "open\nfrobnicate\n");
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn script_file_is_read() {
    let path = PathBuf::from(format!(
        "/tmp/devchan-script-{}-{}.txt",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::write(&path, "# comment\nwrite device abc\nstats\n").expect("script should be writable");

    let output = run_session(&["--script", path.to_str().expect("utf-8 path")], "");
    assert!(output.status.success());
    let records = records(&output);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["counters"]["writes"], 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn info_reports_capacity() {
    let output = Command::new(env!("CARGO_BIN_EXE_devchan"))
        .arg("--format")
        .arg("json")
        .arg("info")
        .output()
        .expect("info should run");

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("info should emit json");
    assert_eq!(payload["capacity"], 1024);
    assert_eq!(payload["write_limit"], 1023);
    assert_eq!(payload["status_mode"], "666");
}

use event_log_sink::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::process::Command;
use std::sync::Arc;
use test_log::test;

const CHILD_ENV: &str = "EVENT_LOG_SINK_FATAL_CHILD";

/// Body run in a re-executed copy of this test binary: logs fatally from
/// inside an open event, writing to the real stdout/stderr.
fn fatal_inside_event() -> ! {
    let scope = Scope::background().with_logger(Arc::new(DefaultLogger::new()));
    let (scope, event) = new_event(&scope, "doomed");
    event.set_label("order", "o-1");
    info(&scope, "deferred forever");
    with("reason", "disk gone").fatalf(&scope, format_args!("cannot continue: {}", 42))
}

#[test]
fn fatal_streams_immediately_and_exits_with_status_one() {
    if std::env::var_os(CHILD_ENV).is_some() {
        fatal_inside_event();
    }

    let output = Command::new(std::env::current_exe().unwrap())
        .args([
            "--exact",
            "fatal_streams_immediately_and_exits_with_status_one",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8(output.stderr).unwrap();
    let records: Vec<Value> = stderr
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    assert_eq!(records.len(), 1, "stderr was: {stderr}");
    assert_eq!(records[0]["severity"], "CRITICAL");
    assert_eq!(records[0]["message"], "cannot continue: 42");
    assert_eq!(records[0]["reason"], "disk gone");

    // The event never ends, so neither it nor its deferred child is written.
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("deferred forever"), "stdout was: {stdout}");
    assert!(!stdout.contains("\"doomed\""), "stdout was: {stdout}");
}

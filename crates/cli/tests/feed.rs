//! CLI-level tests for `taskview feed`.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_events(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();
    file
}

#[test]
fn feed_materializes_views_from_a_pending_event() {
    let events = write_events(
        r#"[
            {
                "id": "t-1",
                "type": "vacation",
                "status": "pending",
                "submittedby": "alice",
                "summary": "two weeks off",
                "detail": "see calendar",
                "approvers": [{"id": "bob", "name": "Bob"}]
            }
        ]"#,
    );

    Command::cargo_bin("taskview")
        .unwrap()
        .arg("feed")
        .arg(events.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""alice""#)
                .and(predicate::str::contains(r#""mytasks""#))
                .and(predicate::str::contains(r#""approvaltasks""#))
                .and(predicate::str::contains(r#""t-1""#)),
        );
}

#[test]
fn feed_leaves_no_views_after_completion() {
    let events = write_events(
        r#"[
            {
                "id": "t-1",
                "type": "invoice",
                "status": "pending",
                "submittedby": "alice",
                "summary": "pay vendor",
                "detail": "",
                "approvers": [{"id": "bob", "name": "Bob"}]
            },
            {
                "id": "t-1",
                "type": "invoice",
                "status": "complete",
                "submittedby": "alice",
                "summary": "pay vendor",
                "detail": "",
                "approvers": [{"id": "bob", "name": "Bob"}]
            }
        ]"#,
    );

    Command::cargo_bin("taskview")
        .unwrap()
        .arg("feed")
        .arg(events.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("{}\n"));
}

#[test]
fn feed_rejects_an_unknown_status() {
    let events = write_events(
        r#"[
            {
                "id": "t-1",
                "type": "vacation",
                "status": "cancelled",
                "submittedby": "alice",
                "summary": "",
                "detail": "",
                "approvers": []
            }
        ]"#,
    );

    Command::cargo_bin("taskview")
        .unwrap()
        .arg("feed")
        .arg(events.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed task event"));
}

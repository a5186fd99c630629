#![cfg(unix)]

mod support;

use std::path::Path;

use support::{fake_tool, logging_body, PtySession};

const PROJECTS: &str = r#"[{"name":"Proj A","projectId":"p1","projectNumber":"1"}]"#;
const INSTANCES: &str = r#"[{"name":"Inst 1","connectionName":"p1:region:inst1"}]"#;

/// Fake gcloud with one project and one instance; fake proxy that logs to
/// stderr and exits 5.
fn fake_cloud(dir: &Path, log: &Path) -> Vec<(&'static str, String)> {
    let gcloud = fake_tool(
        dir,
        "gcloud",
        &logging_body(
            log,
            "gcloud",
            &format!(
                "case \"$1\" in\n  projects) echo '{PROJECTS}' ;;\n  sql) echo '{INSTANCES}' ;;\nesac"
            ),
        ),
    );
    let proxy = fake_tool(
        dir,
        "cloud_sql_proxy",
        &logging_body(log, "proxy", "echo 'proxy log line' >&2\nexit 5"),
    );
    vec![
        ("CSQLP_GCLOUD", gcloud.display().to_string()),
        ("CSQLP_PROXY", proxy.display().to_string()),
    ]
}

fn calls(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_ctrl_c_at_project_menu_says_bye_and_exits_zero() {
    let td = tempfile::tempdir().expect("tmpdir");
    let log = td.path().join("calls.log");
    let mut term = PtySession::spawn(&fake_cloud(td.path(), &log));

    term.wait_for("Select project");
    let status = term.interrupt();
    let screen = term.output();

    assert_eq!(status.code(), Some(0), "status {status:?}; screen:\n{screen}");
    assert!(screen.contains("Bye!"), "{screen}");
    assert_eq!(calls(&log), vec!["gcloud projects list --format=json"]);
}

#[test]
fn test_ctrl_c_at_port_prompt_cancels_without_launching() {
    let td = tempfile::tempdir().expect("tmpdir");
    let log = td.path().join("calls.log");
    let mut term = PtySession::spawn(&fake_cloud(td.path(), &log));

    term.wait_for("Select project");
    term.send(b"\r");
    term.wait_for("Select instance");
    term.send(b"\r");
    term.wait_for("Input port");
    let status = term.interrupt();
    let screen = term.output();

    assert_eq!(status.code(), Some(0), "status {status:?}; screen:\n{screen}");
    assert!(screen.contains("Bye!"), "{screen}");
    assert!(!screen.contains("Running command"), "{screen}");
    assert_eq!(
        calls(&log),
        vec![
            "gcloud projects list --format=json",
            "gcloud sql instances list --project=p1 --format=json",
        ]
    );
}

#[test]
fn test_full_session_runs_proxy_and_relays_its_stderr() {
    let td = tempfile::tempdir().expect("tmpdir");
    let log = td.path().join("calls.log");
    let mut term = PtySession::spawn(&fake_cloud(td.path(), &log));

    term.wait_for("Select project");
    term.send(b"\r");
    term.wait_for("Select instance");
    term.send(b"\r");
    term.wait_for("Input port");
    // Enter on an empty line takes the default port.
    term.send(b"\r");
    let status = term.finish();
    let screen = term.output();

    assert_eq!(status.code(), Some(5), "status {status:?}; screen:\n{screen}");
    assert!(
        screen.contains("Running command: -instances=p1:region:inst1=tcp:5432"),
        "{screen}"
    );
    assert!(screen.contains("proxy log line"), "{screen}");
    assert!(screen.contains("child process exited with code 5"), "{screen}");
    let running = screen.find("Running command").expect("running line");
    let relayed = screen.find("proxy log line").expect("relayed line");
    let exited = screen.find("child process exited").expect("exit line");
    assert!(running < relayed && relayed < exited, "{screen}");
    assert_eq!(
        calls(&log).last().map(String::as_str),
        Some("proxy -instances=p1:region:inst1=tcp:5432")
    );
}

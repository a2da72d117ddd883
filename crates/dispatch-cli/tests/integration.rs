#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Mock, ServerGuard};
use predicates::prelude::*;
use tempfile::TempDir;

const API_KEY: &str = "integration-secret-key";
const ACK: &str = r#"{"success":true}"#;

fn dispatch() -> Command {
    let mut cmd = Command::cargo_bin("dispatch").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("DISPATCH_SERVER")
        .env_remove("DISPATCH_SITE")
        .env_remove("DISPATCH_USER")
        .env_remove("DISPATCH_API_KEY")
        .env_remove("DISPATCH_CONFIG");
    cmd
}

fn against(server: &ServerGuard) -> Command {
    let mut cmd = dispatch();
    cmd.args(["--server", server.url().as_str(), "--site", "7", "--user", "alice"])
        .env("DISPATCH_API_KEY", API_KEY);
    cmd
}

fn list_body(items: &[(i64, &str)]) -> String {
    let data: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, code)| serde_json::json!({"id": id, "code": code, "description": format!("{code} description")}))
        .collect();
    serde_json::json!({"success": true, "data": data}).to_string()
}

fn get(server: &mut ServerGuard, path: &str, query: Matcher, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("auth".into(), API_KEY.into()),
            Matcher::UrlEncoded("site".into(), "7".into()),
            query,
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

fn post(server: &mut ServerGuard, path: &str, body_match: Matcher, body: &str) -> Mock {
    server
        .mock("POST", path)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("auth".into(), API_KEY.into()),
            Matcher::UrlEncoded("site".into(), "7".into()),
            body_match,
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

/// Mocks for steps 1–5.
fn mock_resolution(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        get(
            server,
            "/api/1.0/sites/",
            Matcher::UrlEncoded("test_site".into(), "true".into()),
            &list_body(&[(1, "S1")]),
        ),
        get(
            server,
            "/api/1.0/areas/",
            Matcher::UrlEncoded("offset".into(), "0".into()),
            &list_body(&[(10, "A10"), (11, "A11")]),
        ),
        get(
            server,
            "/api/1.0/areas/",
            Matcher::UrlEncoded("offset".into(), "2".into()),
            &list_body(&[(12, "A12")]),
        ),
        get(
            server,
            "/api/1.0/lines/",
            Matcher::UrlEncoded("area_id".into(), "12".into()),
            &list_body(&[(20, "L1")]),
        ),
        get(
            server,
            "/api/1.0/machines/",
            Matcher::UrlEncoded("line_id".into(), "20".into()),
            &list_body(&[(30, "M1")]),
        ),
        get(
            server,
            "/api/1.0/dispatchtypes/",
            Matcher::UrlEncoded("active".into(), "true".into()),
            &list_body(&[(40, "DT1")]),
        ),
    ]
}

// ---------------------------------------------------------------------------
// startup
// ---------------------------------------------------------------------------

#[test]
fn missing_arguments_fail_before_any_request() {
    dispatch()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "missing required arguments: server, site, user, apikey",
        ));
}

#[test]
fn help_lists_subcommands() {
    dispatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dispatch.yaml");
    std::fs::write(&path, "utc_offset: nowhere\n").unwrap();

    dispatch()
        .args(["resolve", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"))
        .stderr(predicate::str::contains("invalid utc_offset"));
}

// ---------------------------------------------------------------------------
// dispatch resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_prints_resources_as_table() {
    let mut server = mockito::Server::new();
    let mocks = mock_resolution(&mut server);

    against(&server)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("RESOURCE"))
        .stdout(predicate::str::contains("A12"))
        .stdout(predicate::str::contains("DT1"));

    for m in mocks {
        m.assert();
    }
}

#[test]
fn resolve_json_reports_selected_ids() {
    let mut server = mockito::Server::new();
    let _mocks = mock_resolution(&mut server);

    let output = against(&server)
        .args(["resolve", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["site"]["id"], 1);
    assert_eq!(value["area"]["id"], 12);
    assert_eq!(value["line"]["code"], "L1");
    assert_eq!(value["machine"]["id"], 30);
    assert_eq!(value["dispatch_type"]["code"], "DT1");
}

#[test]
fn ambiguous_site_aborts_resolution() {
    let mut server = mockito::Server::new();
    let _sites = get(
        &mut server,
        "/api/1.0/sites/",
        Matcher::Any,
        &list_body(&[(1, "S1"), (2, "S2")]),
    );
    let areas = server.mock("GET", "/api/1.0/areas/").match_query(Matcher::Any).expect(0).create();

    against(&server)
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("resolve_site"))
        .stderr(predicate::str::contains("expected exactly one"));

    areas.assert();
}

// ---------------------------------------------------------------------------
// dispatch run
// ---------------------------------------------------------------------------

#[test]
fn full_run_exercises_every_endpoint() {
    let mut server = mockito::Server::new();
    let mut mocks = mock_resolution(&mut server);

    mocks.push(
        server
            .mock("POST", "/api/1.0/users/clock_in/alice/")
            .match_body(Matcher::UrlEncoded("linecode".into(), "L1".into()))
            .with_body(ACK)
            .expect(2)
            .create(),
    );
    mocks.push(post(
        &mut server,
        "/api/1.0/users/clock_out/alice/",
        Matcher::UrlEncoded("linecode".into(), "L1".into()),
        ACK,
    ));
    mocks.push(post(
        &mut server,
        "/api/1.0/machines/set_cycle_count/",
        Matcher::UrlEncoded("cyclecount".into(), "832".into()),
        ACK,
    ));
    mocks.push(post(
        &mut server,
        "/api/1.0/machines/increment_cycle_count/",
        Matcher::UrlEncoded("skip_lastupdated".into(), "1".into()),
        ACK,
    ));
    mocks.push(post(
        &mut server,
        "/api/1.0/dispatches/open/",
        Matcher::UrlEncoded("machine".into(), "30".into()),
        r#"{"success":true,"data":{"id":555}}"#,
    ));
    mocks.push(post(
        &mut server,
        "/api/1.0/dispatches/close/555/",
        Matcher::Any,
        ACK,
    ));
    mocks.push(post(
        &mut server,
        "/api/1.0/dispatches/add/",
        Matcher::UrlEncoded("machinecode".into(), "M1".into()),
        ACK,
    ));
    mocks.push(post(
        &mut server,
        "/api/1.0/pitchdetails/record_details/",
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "now".into()),
            Matcher::UrlEncoded("end".into(), "now".into()),
            Matcher::UrlEncoded("productcode".into(), "testproduct-3".into()),
        ]),
        ACK,
    ));
    mocks.push(get(
        &mut server,
        "/api/1.0/pitchdetails/record_details/",
        Matcher::UrlEncoded("show_products".into(), "true".into()),
        r#"{"success":true,"data":{"actual":42}}"#,
    ));

    against(&server)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened and closed dispatch 555"))
        .stdout(predicate::str::contains("daily_summary"));

    for m in mocks {
        m.assert();
    }
}

#[test]
fn api_error_aborts_with_server_message() {
    let mut server = mockito::Server::new();
    let _mocks = mock_resolution(&mut server);
    let _clock_in = post(
        &mut server,
        "/api/1.0/users/clock_in/alice/",
        Matcher::Any,
        r#"{"success":false,"error":"User alice does not exist"}"#,
    );
    let clock_out = server
        .mock("POST", "/api/1.0/users/clock_out/alice/")
        .expect(0)
        .create();

    against(&server)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("clock_in_out"))
        .stderr(predicate::str::contains("User alice does not exist"));

    clock_out.assert();
}

#[test]
fn server_error_status_aborts_run() {
    let mut server = mockito::Server::new();
    let _sites = server
        .mock("GET", "/api/1.0/sites/")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"success":true,"data":[{"id":1}]}"#)
        .create();

    against(&server)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected HTTP status 500"));
}

#[test]
fn debug_output_never_contains_the_api_key() {
    let mut server = mockito::Server::new();
    let _mocks = mock_resolution(&mut server);

    let output = against(&server)
        .args(["resolve", "--dbg"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("response"), "expected debug logging: {stderr}");
    assert!(!stderr.contains(API_KEY));
    assert!(!stdout.contains(API_KEY));
}

#[test]
fn config_file_supplies_connection_values() {
    let mut server = mockito::Server::new();
    let _mocks = mock_resolution(&mut server);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dispatch.yaml");
    std::fs::write(
        &path,
        format!("server: \"{}\"\nsite: \"7\"\nuser: alice\n", server.url()),
    )
    .unwrap();

    dispatch()
        .args(["resolve", "--config"])
        .arg(&path)
        .env("DISPATCH_API_KEY", API_KEY)
        .assert()
        .success()
        .stdout(predicate::str::contains("L1"));
}

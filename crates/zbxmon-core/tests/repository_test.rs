// Integration tests for the two-phase problem fetch and the
// boolean-returning mutations, using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zbxmon_api::TransportConfig;
use zbxmon_core::model::{AuthCarrier, Credential, MonitorServer};
use zbxmon_core::repository::ProblemRepository;
use zbxmon_core::CoreError;

// ── Helpers ─────────────────────────────────────────────────────────

fn server_record(mock: &MockServer) -> MonitorServer {
    MonitorServer {
        id: 1,
        name: "Test".to_owned(),
        url: mock.uri(),
        credential: Credential::ApiToken(SecretString::from("t0ken")),
        auth_carrier: AuthCarrier::Header,
    }
}

fn repository() -> ProblemRepository {
    ProblemRepository::new(TransportConfig::default())
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": 1,
    }))
}

fn rpc_error(code: i64, message: &str, data: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "error": {"code": code, "message": message, "data": data},
        "id": 1,
    }))
}

fn mock_problems(result: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({"method": "problem.get"})))
        .respond_with(rpc_result(result))
}

fn mock_triggers(result: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({"method": "trigger.get"})))
        .respond_with(rpc_result(result))
}

/// The bodies of every request the mock server received, in order.
async fn received_bodies(mock: &MockServer) -> Vec<Value> {
    mock.received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Two-phase fetch ─────────────────────────────────────────────────

#[tokio::test]
async fn fetch_joins_trigger_metadata_into_problems() {
    let mock = MockServer::start().await;
    mock_problems(json!([
        {"eventid": "100", "objectid": "10", "clock": "1700000000",
         "name": "Disk full", "severity": "4", "acknowledged": "0", "suppressed": "0"},
        {"eventid": "101", "objectid": "11", "clock": "1700000100",
         "name": "High CPU", "severity": "3", "acknowledged": "1", "suppressed": "0"},
    ]))
    .expect(1)
    .mount(&mock)
    .await;
    mock_triggers(json!([
        {"triggerid": "10", "manual_close": "1", "comments": "Clean /var",
         "hosts": [{"host": "db-01"}]},
        {"triggerid": "11", "hosts": [{"host": "web-01"}]},
    ]))
    .expect(1)
    .mount(&mock)
    .await;

    let problems = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap();

    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0].host_name, "db-01");
    assert_eq!(problems[0].manual_close, "1");
    assert_eq!(problems[0].comments, "Clean /var");
    assert_eq!(problems[1].host_name, "web-01");
    assert_eq!(problems[1].manual_close, "0");
}

#[tokio::test]
async fn shared_triggers_are_requested_once() {
    let mock = MockServer::start().await;
    mock_problems(json!([
        {"eventid": "100", "objectid": "10", "name": "a", "severity": "1",
         "acknowledged": "0", "suppressed": "0", "clock": "1"},
        {"eventid": "101", "objectid": "10", "name": "b", "severity": "1",
         "acknowledged": "0", "suppressed": "0", "clock": "2"},
        {"eventid": "102", "objectid": "12", "name": "c", "severity": "1",
         "acknowledged": "0", "suppressed": "0", "clock": "3"},
    ]))
    .expect(1)
    .mount(&mock)
    .await;
    mock_triggers(json!([])).expect(1).mount(&mock).await;

    let problems = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap();
    assert_eq!(problems.len(), 3);

    let bodies = received_bodies(&mock).await;
    let trigger_call = bodies
        .iter()
        .find(|b| b["method"] == "trigger.get")
        .expect("trigger.get was called");
    assert_eq!(trigger_call["params"]["triggerids"], json!(["10", "12"]));
}

#[tokio::test]
async fn empty_problem_list_skips_the_trigger_fetch() {
    let mock = MockServer::start().await;
    mock_problems(json!([])).expect(1).mount(&mock).await;

    let problems = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap();
    assert!(problems.is_empty());

    let bodies = received_bodies(&mock).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["method"], "problem.get");
}

#[tokio::test]
async fn problems_without_object_ids_skip_the_trigger_fetch() {
    let mock = MockServer::start().await;
    mock_problems(json!([
        {"eventid": "100", "name": "orphan", "severity": "2",
         "acknowledged": "0", "suppressed": "0", "clock": "1"},
    ]))
    .expect(1)
    .mount(&mock)
    .await;

    let problems = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap();

    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].host_name, "Host-");

    let bodies = received_bodies(&mock).await;
    assert_eq!(bodies.len(), 1);
}

#[tokio::test]
async fn failed_enrichment_defaults_host_names_instead_of_failing() {
    let mock = MockServer::start().await;
    mock_problems(json!([
        {"eventid": "100", "objectid": "10", "name": "Disk full", "severity": "4",
         "acknowledged": "0", "suppressed": "0", "clock": "1"},
    ]))
    .expect(1)
    .mount(&mock)
    .await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({"method": "trigger.get"})))
        .respond_with(rpc_error(-32602, "Invalid params.", "No permissions."))
        .expect(1)
        .mount(&mock)
        .await;

    let problems = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap();

    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].host_name, "Host-10");
}

#[tokio::test]
async fn failed_problem_fetch_aborts_with_a_stage_tagged_error() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .respond_with(rpc_error(-32602, "Invalid params.", "No permissions."))
        .expect(1)
        .mount(&mock)
        .await;

    let err = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap_err();

    match err {
        CoreError::SyncFailed { ref message, .. } => {
            assert!(message.contains("No permissions."));
        }
        other => panic!("expected SyncFailed, got {other:?}"),
    }
    assert!(err.to_string().starts_with("problem fetch failed"));
}

#[tokio::test]
async fn malformed_problem_records_are_dropped_not_fatal() {
    let mock = MockServer::start().await;
    mock_problems(json!([
        "not-a-record",
        {"eventid": "100", "objectid": "10", "name": "real", "severity": "2",
         "acknowledged": "0", "suppressed": "0", "clock": "1"},
    ]))
    .expect(1)
    .mount(&mock)
    .await;
    mock_triggers(json!([
        {"triggerid": "10", "hosts": [{"host": "web-01"}]},
    ]))
    .expect(1)
    .mount(&mock)
    .await;

    let problems = repository()
        .fetch_problems(&server_record(&mock))
        .await
        .unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].eventid, "100");
}

// ── Session credentials ─────────────────────────────────────────────

#[tokio::test]
async fn password_credential_logs_in_before_fetching() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({
            "method": "user.login",
            "params": {"username": "admin", "password": "hunter2"},
        })))
        .respond_with(rpc_result(json!("fresh-session")))
        .expect(1)
        .mount(&mock)
        .await;
    mock_problems(json!([])).expect(1).mount(&mock).await;

    let mut server = server_record(&mock);
    server.credential = Credential::Password {
        username: "admin".to_owned(),
        password: SecretString::from("hunter2"),
    };
    server.auth_carrier = AuthCarrier::Body;

    let problems = repository().fetch_problems(&server).await.unwrap();
    assert!(problems.is_empty());

    let bodies = received_bodies(&mock).await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["method"], "problem.get");
    assert_eq!(bodies[1]["auth"], "fresh-session");
}

#[tokio::test]
async fn rejected_login_surfaces_as_authentication_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .respond_with(rpc_error(-32602, "Invalid params.", "Incorrect user name or password."))
        .expect(1)
        .mount(&mock)
        .await;

    let mut server = server_record(&mock);
    server.credential = Credential::Password {
        username: "admin".to_owned(),
        password: SecretString::from("wrong"),
    };

    let err = repository().fetch_problems(&server).await.unwrap_err();
    match err {
        CoreError::AuthenticationFailed { message } => {
            assert!(message.contains("Incorrect user name or password."));
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn acknowledge_reports_server_acceptance() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({
            "method": "event.acknowledge",
            "params": {"eventids": ["100"], "action": 2, "message": "Looking into it"},
        })))
        .respond_with(rpc_result(json!({"eventids": ["100"]})))
        .expect(1)
        .mount(&mock)
        .await;

    let accepted = repository()
        .acknowledge(&server_record(&mock), "100", true, "Looking into it")
        .await;
    assert!(accepted);
}

#[tokio::test]
async fn unacknowledge_sends_the_unack_action_code() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({
            "method": "event.acknowledge",
            "params": {"action": 16},
        })))
        .respond_with(rpc_result(json!({"eventids": ["100"]})))
        .expect(1)
        .mount(&mock)
        .await;

    assert!(
        repository()
            .acknowledge(&server_record(&mock), "100", false, "Reopening")
            .await
    );
}

#[tokio::test]
async fn close_sends_the_close_action_code() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({
            "method": "event.acknowledge",
            "params": {"eventids": ["100"], "action": 1, "message": "Fixed"},
        })))
        .respond_with(rpc_result(json!({"eventids": ["100"]})))
        .expect(1)
        .mount(&mock)
        .await;

    assert!(repository().close(&server_record(&mock), "100", "Fixed").await);
}

#[tokio::test]
async fn rejected_mutation_is_false_never_an_error() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .respond_with(rpc_error(-32500, "Permission denied.", ""))
        .expect(1)
        .mount(&mock)
        .await;

    let accepted = repository()
        .acknowledge(&server_record(&mock), "100", true, "msg")
        .await;
    assert!(!accepted);
}

#[tokio::test]
async fn unreachable_server_makes_mutations_false() {
    // Nothing is listening on this port.
    let server = MonitorServer {
        id: 9,
        name: "Gone".to_owned(),
        url: "http://127.0.0.1:1".to_owned(),
        credential: Credential::ApiToken(SecretString::from("t0ken")),
        auth_carrier: AuthCarrier::Header,
    };
    assert!(!repository().close(&server, "100", "msg").await);
}

use std::time::Duration;

use serde_json::{Value, json};

use common::TestGateway;

mod common;

#[tokio::test]
async fn trigger_parses_the_build_identifier() {
    let gateway = TestGateway::spawn("echo \"Build queued. Build ID: 7f3a-22\"").await;

    let response = gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["buildId"], json!("7f3a-22"));
    assert_eq!(body["status"], json!("pending"));
    assert!(body.get("note").is_none());

    let log = gateway.tool_log();
    assert!(log.contains("udid:X"));
    assert!(log.contains("async:true"));
}

#[tokio::test]
async fn second_trigger_returns_the_tracked_record() {
    let gateway = TestGateway::spawn("echo \"Build ID: 7f3a-22\"").await;

    gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    let response = gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["buildId"], json!("7f3a-22"));
    assert_eq!(body["status"], json!("pending"));
    assert!(
        body["note"]
            .as_str()
            .expect("note missing")
            .contains("already in progress")
    );
    assert_eq!(gateway.tool_invocations(), 1, "second trigger must not start a second build");
}

#[tokio::test]
async fn status_returns_the_stored_record() {
    let gateway = TestGateway::spawn("echo \"Build ID: 7f3a-22\"").await;

    gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    let response = gateway.get("/api/build-status/X").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["buildId"], json!("7f3a-22"));
    assert_eq!(body["status"], json!("pending"));
    assert!(body["startedAt"].is_string());
}

#[tokio::test]
async fn status_for_an_unknown_device_is_a_normal_response() {
    let gateway = TestGateway::spawn("echo ok").await;

    let response = gateway.get("/api/build-status/NEVER-SEEN").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(false));
    assert!(
        body["message"]
            .as_str()
            .expect("message missing")
            .contains("NEVER-SEEN")
    );
}

#[tokio::test]
async fn trigger_without_identifier_in_output_uses_the_sentinel() {
    let gateway = TestGateway::spawn("echo \"Build queued\"").await;

    let response = gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["buildId"], json!("unknown"));
    assert_eq!(body["status"], json!("pending"));
}

#[tokio::test]
async fn trigger_failure_commits_nothing_and_allows_retry() {
    let gateway = TestGateway::spawn("echo \"farm unreachable\" 1>&2; exit 1").await;

    let response = gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(false));
    assert!(
        body["stderr"]
            .as_str()
            .expect("stderr missing")
            .contains("farm unreachable")
    );

    let response = gateway.get("/api/build-status/X").await;
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(false), "failed trigger must not leave a record");

    gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    assert_eq!(gateway.tool_invocations(), 2, "retry must reach the tool again");
}

#[tokio::test]
async fn trigger_requires_an_identifier() {
    let gateway = TestGateway::spawn("echo ok").await;

    for body in [json!({}), json!({"udid": ""})] {
        let response = gateway.post_json("/api/trigger-build", body).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.expect("Couldn't parse body");
        assert_eq!(body["error"], json!("identifier required"));
    }
    assert_eq!(gateway.tool_invocations(), 0);
}

#[tokio::test]
async fn trigger_timeout_is_reported_and_commits_nothing() {
    let gateway = TestGateway::spawn_with(
        "sleep 5",
        Duration::from_secs(30),
        Duration::from_millis(200),
    )
    .await;

    let response = gateway
        .post_json("/api/trigger-build", json!({"udid": "X"}))
        .await;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("build tool timed out"));

    let response = gateway.get("/api/build-status/X").await;
    let body: Value = response.json().await.expect("Couldn't parse body");
    assert_eq!(body["success"], json!(false), "timed out trigger must not leave a record");
}

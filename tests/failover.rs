//! End-to-end failover behavior through the HTTP front end.

use serde_json::{json, Value};
use std::time::{Duration, Instant};

use model_router::resilience::DEGRADED_ANSWER;
use router_sdk::SdkError;

mod common;
use common::Behavior;

#[tokio::test]
async fn test_healthy_primary_answers() {
    let primary = common::start_backend(Behavior::Answer("APR is the annual rate")).await;
    let fallback = common::start_backend(Behavior::Answer("fallback")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let answer = router.client.ask("What is APR?", Some("general")).await.unwrap();

    assert_eq!(answer.answer, "APR is the annual rate");
    assert_eq!(answer.model_used, "b-default");
    assert_eq!(answer.stage.as_deref(), Some("PRIMARY"));
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_primary_timeout_falls_back() {
    let primary = common::start_backend(Behavior::Hang).await;
    let fallback = common::start_backend(Behavior::Answer("fallback answer")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let started = Instant::now();
    let answer = router.client.ask("What is APR?", None).await.unwrap();

    assert_eq!(answer.model_used, "FALLBACK:b-fb");
    assert_eq!(answer.answer, "fallback answer");
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_primary_error_status_falls_back() {
    let primary = common::start_backend(Behavior::Status(503)).await;
    let fallback = common::start_backend(Behavior::Answer("fallback answer")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    for _ in 0..5 {
        let answer = router.client.ask("What is APR?", None).await.unwrap();
        assert_eq!(answer.model_used, "FALLBACK:b-fb");
        assert_eq!(answer.stage.as_deref(), Some("FALLBACK"));
    }
    assert_eq!(primary.calls(), 5);
}

#[tokio::test]
async fn test_both_backends_fail_degrades() {
    let primary = common::start_backend(Behavior::Status(500)).await;
    let fallback = common::start_backend(Behavior::Malformed).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let answer = router.client.ask("What is APR?", None).await.unwrap();

    assert_eq!(answer.answer, DEGRADED_ANSWER);
    assert_eq!(
        answer.answer,
        "I'm sorry, system is currently under high load. Please try again later."
    );
    assert_eq!(answer.model_used, "DEGRADED_SERVICE");
    assert_eq!(answer.stage.as_deref(), Some("DEGRADED"));
}

#[tokio::test]
async fn test_missing_question_rejected() {
    let primary = common::start_backend(Behavior::Answer("unused")).await;
    let fallback = common::start_backend(Behavior::Answer("unused")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let err = router.client.ask_raw(&json!({ "type": "general" })).await.unwrap_err();
    match err {
        SdkError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing question");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = router.client.ask("   ", None).await.unwrap_err();
    assert!(matches!(err, SdkError::Status { status: 400, .. }));
    assert_eq!(primary.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let primary = common::start_backend(Behavior::Answer("unused")).await;
    let fallback = common::start_backend(Behavior::Answer("unused")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let res = reqwest::Client::new()
        .post(router.url("/ask"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_gateway_envelope_on_root_route() {
    let primary = common::start_backend(Behavior::Answer("enveloped")).await;
    let fallback = common::start_backend(Behavior::Answer("unused")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let res = reqwest::Client::new()
        .post(router.url("/"))
        .json(&json!({ "body": "{\"prompt\":\"What is APR?\"}" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["x-answer-stage"], "PRIMARY");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "answer": "enveloped", "model_used": "b-default" }));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let primary = common::start_backend(Behavior::Answer("ok")).await;
    let fallback = common::start_backend(Behavior::Answer("unused")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let res = reqwest::Client::new()
        .post(router.url("/ask"))
        .header("x-request-id", "req-123")
        .json(&json!({ "question": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_health_and_static_config() {
    let primary = common::start_backend(Behavior::Answer("ok")).await;
    let fallback = common::start_backend(Behavior::Answer("unused")).await;
    let router = common::start_router(common::router_config(&primary, &fallback)).await;

    let health = router.client.health().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["static_routing"], true);

    let config = router.client.config().await.unwrap();
    assert_eq!(config["default_model"], "b-default");
    assert_eq!(config["overrides"], json!({}));
}

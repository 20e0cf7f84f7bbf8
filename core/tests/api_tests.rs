// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Route-level tests for the status API, driven without a listener via
//! `tower::util::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use caroline_neural_core::application::ServiceSupervisor;
use caroline_neural_core::config::NeuralConfig;
use caroline_neural_core::domain::DecisionKind;
use caroline_neural_core::presentation::app;

fn supervisor() -> Arc<ServiceSupervisor> {
    Arc::new(ServiceSupervisor::new(&NeuralConfig::default()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn os_status_reports_engine_and_queues() {
    let supervisor = supervisor();
    supervisor.engine().force_decision(DecisionKind::RouteChange, serde_json::json!({}));

    let response = app(supervisor)
        .oneshot(Request::get("/os_status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["system_status"], "initializing");
    assert_eq!(json["decision_engine"]["pending_decisions"], 1);
    assert_eq!(json["decision_engine"]["decisions_made"], 0);
    assert_eq!(json["data_queues"]["scanner_feed"], 0);
    assert_eq!(json["data_queues"].as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn recent_decisions_respects_limit() {
    let supervisor = supervisor();
    for _ in 0..5 {
        supervisor
            .engine()
            .force_decision(DecisionKind::RouteChange, serde_json::json!({}));
    }
    supervisor.engine().drain_and_execute();

    let response = app(supervisor)
        .oneshot(
            Request::get("/recent_decisions?limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["recent_decisions"].as_array().unwrap().len(), 2);
    assert_eq!(json["total_decisions"], 5);
    assert_eq!(json["recent_decisions"][0]["status"], "executed");
}

#[tokio::test]
async fn queue_status_marks_empty_queues_idle() {
    let response = app(supervisor())
        .oneshot(Request::get("/queue_status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let queues = json["queues"].as_object().unwrap();
    assert_eq!(queues.len(), 5);
    assert_eq!(queues["weather_feed"]["status"], "idle");
    assert_eq!(queues["weather_feed"]["size"], 0);
}

#[tokio::test]
async fn force_decision_queues_and_acknowledges() {
    let supervisor = supervisor();
    let response = app(supervisor.clone())
        .oneshot(
            Request::post("/force_decision")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"type": "custom_type", "data": {"reason": "drill"}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = body_json(response).await;
    assert_eq!(json["decision_queued"], true);
    assert_eq!(json["decision_type"], "custom_type");
    assert_eq!(supervisor.engine().pending_len(), 1);

    supervisor.engine().drain_and_execute();
    let history = supervisor.recent_decisions(1);
    assert_eq!(history[0].urgency, caroline_neural_core::domain::Urgency::Immediate);
    assert_eq!(history[0].payload["reason"], "drill");
}

#[tokio::test]
async fn force_decision_rejects_empty_type() {
    let response = app(supervisor())
        .oneshot(
            Request::post("/force_decision")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"type": "  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

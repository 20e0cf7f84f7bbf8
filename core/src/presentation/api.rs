// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Status and control HTTP surface for the neural core.
//!
//! Four routes, all JSON: three read-only status views and one operator
//! escape hatch that queues a forced decision. This is the only externally
//! observable surface of the core.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::ServiceSupervisor;
use crate::domain::DecisionKind;

const DEFAULT_RECENT_LIMIT: usize = 10;

pub struct AppState {
    pub supervisor: Arc<ServiceSupervisor>,
}

pub fn app(supervisor: Arc<ServiceSupervisor>) -> Router {
    let state = Arc::new(AppState { supervisor });

    Router::new()
        .route("/os_status", get(os_status))
        .route("/recent_decisions", get(recent_decisions))
        .route("/queue_status", get(queue_status))
        .route("/force_decision", post(force_decision))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn os_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let supervisor = &state.supervisor;
    let engine = supervisor.engine();

    // BTreeMap keeps service/queue ordering stable across responses.
    let services: BTreeMap<_, _> = supervisor
        .services()
        .into_iter()
        .map(|(name, handle)| {
            (
                name,
                json!({
                    "status": handle.status,
                    "last_activity": handle.last_activity.to_rfc3339(),
                }),
            )
        })
        .collect();

    let queues: BTreeMap<_, _> = supervisor
        .queue_sizes()
        .into_iter()
        .map(|(ch, size)| (ch.as_str(), size))
        .collect();

    Json(json!({
        "system_status": supervisor.system_status(),
        "background_services": services,
        "decision_engine": {
            "pending_decisions": engine.pending_len(),
            "decisions_made": engine.decisions_made(),
            "rule_misses": engine.rule_misses(),
        },
        "data_queues": queues,
    }))
}

#[derive(serde::Deserialize)]
pub struct RecentDecisionsQuery {
    limit: Option<usize>,
}

async fn recent_decisions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentDecisionsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let decisions = state.supervisor.recent_decisions(limit);

    Json(json!({
        "recent_decisions": decisions,
        "total_decisions": state.supervisor.engine().decisions_made(),
    }))
}

async fn queue_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let queues: BTreeMap<_, _> = state
        .supervisor
        .queue_sizes()
        .into_iter()
        .map(|(ch, size)| {
            (
                ch.as_str(),
                json!({
                    "size": size,
                    "status": if size > 0 { "active" } else { "idle" },
                }),
            )
        })
        .collect();

    Json(json!({ "queues": queues }))
}

#[derive(serde::Deserialize)]
pub struct ForceDecisionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

async fn force_decision(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForceDecisionRequest>,
) -> impl IntoResponse {
    if payload.kind.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "decision type must not be empty" })),
        );
    }

    let kind = DecisionKind::from(payload.kind.as_str());
    let id = state.supervisor.force_decision(kind, payload.data);

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "decision_queued": true,
            "decision_id": id,
            "decision_type": payload.kind,
        })),
    )
}

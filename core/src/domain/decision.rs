// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Autonomous decision records.
//!
//! A `Decision` is derived from a feed event by the engine's rule table (or
//! forced by an operator) and moves through exactly one transition:
//! `Pending → Executed` when it is auto-executable, `Pending →
//! PendingApproval` when it needs a human. There is no retry and no
//! cancellation once a decision exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a decision record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub uuid::Uuid);

impl DecisionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a decision does. The four rule-table kinds are closed; forced
/// decisions may carry any operator-supplied kind, preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionKind {
    RouteOptimization,
    ScheduleAdjustment,
    RouteChange,
    ClientCommunication,
    Other(String),
}

impl DecisionKind {
    pub fn as_str(&self) -> &str {
        match self {
            DecisionKind::RouteOptimization => "route_optimization",
            DecisionKind::ScheduleAdjustment => "schedule_adjustment",
            DecisionKind::RouteChange => "route_change",
            DecisionKind::ClientCommunication => "client_communication",
            DecisionKind::Other(s) => s,
        }
    }
}

impl From<&str> for DecisionKind {
    fn from(s: &str) -> Self {
        match s {
            "route_optimization" => DecisionKind::RouteOptimization,
            "schedule_adjustment" => DecisionKind::ScheduleAdjustment,
            "route_change" => DecisionKind::RouteChange,
            "client_communication" => DecisionKind::ClientCommunication,
            other => DecisionKind::Other(other.to_string()),
        }
    }
}

impl Serialize for DecisionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DecisionKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DecisionKind::from(s.as_str()))
    }
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a decision to be synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    ScannerEvent,
    WeatherAlert,
    TrafficDelay,
    ScheduleConflict,
    UserRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Routine,
    Medium,
    High,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Executed,
    PendingApproval,
}

/// A derived action record. `payload` is the triggering event's payload,
/// copied verbatim and treated as opaque by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    /// Serialized as `type` on the wire.
    #[serde(rename = "type")]
    pub kind: DecisionKind,
    pub trigger: Trigger,
    pub payload: serde_json::Value,
    pub urgency: Urgency,
    pub auto_execute: bool,
    pub status: DecisionStatus,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl Decision {
    pub fn new(
        kind: DecisionKind,
        trigger: Trigger,
        payload: serde_json::Value,
        urgency: Urgency,
        auto_execute: bool,
    ) -> Self {
        Self {
            id: DecisionId::new(),
            kind,
            trigger,
            payload,
            urgency,
            auto_execute,
            status: DecisionStatus::Pending,
            created_at: Utc::now(),
            executed_at: None,
        }
    }

    /// Move to the terminal state. `executed_at` is stamped here and only
    /// here, which keeps the invariant that it is set iff the decision left
    /// `Pending`. A non-auto decision can only ever reach `PendingApproval`.
    pub fn finalize(&mut self, at: DateTime<Utc>) {
        self.status = if self.auto_execute {
            DecisionStatus::Executed
        } else {
            DecisionStatus::PendingApproval
        };
        self.executed_at = Some(at);
    }

    pub fn is_terminal(&self) -> bool {
        self.status != DecisionStatus::Pending
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod decision;
pub mod event;
pub mod service;

pub use decision::{Decision, DecisionId, DecisionKind, DecisionStatus, Trigger, Urgency};
pub use event::{
    ContextUpdate, FeedChannel, FeedEvent, MalformedEvent, RouteAnalysis, ScannerReport,
    ScheduleReport, TrafficReport, WeatherConditions, WeatherReport,
};
pub use service::{ServiceHandle, ServiceStatus};

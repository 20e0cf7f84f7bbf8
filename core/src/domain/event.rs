// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Feed events emitted by the background source services.
//!
//! Each of the five sources produces one event shape. Payloads are typed all
//! the way through: a value that does not match its shape is rejected at the
//! serde boundary, and `FeedEvent::validate` catches semantic garbage that
//! the type system cannot (empty transmissions, absurd travel-time deltas).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named channel an event is routed through. One feed queue exists per
/// channel; the names are stable and appear verbatim in the status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedChannel {
    ScannerFeed,
    WeatherFeed,
    TrafficFeed,
    ScheduleEvents,
    UserContext,
}

impl FeedChannel {
    pub const ALL: [FeedChannel; 5] = [
        FeedChannel::ScannerFeed,
        FeedChannel::WeatherFeed,
        FeedChannel::TrafficFeed,
        FeedChannel::ScheduleEvents,
        FeedChannel::UserContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedChannel::ScannerFeed => "scanner_feed",
            FeedChannel::WeatherFeed => "weather_feed",
            FeedChannel::TrafficFeed => "traffic_feed",
            FeedChannel::ScheduleEvents => "schedule_events",
            FeedChannel::UserContext => "user_context",
        }
    }
}

impl std::fmt::Display for FeedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scanner transmission with an extracted (or not) street location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerReport {
    pub channel: String,
    pub transmission: String,
    pub location_extracted: bool,
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub temperature_f: i32,
    pub humidity_pct: u8,
    pub wind_speed_mph: u32,
    pub precipitation_in: f64,
}

/// Weather snapshot. A non-empty `alerts` list is what drives decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current_conditions: WeatherConditions,
    pub forecast_changes: bool,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAnalysis {
    pub primary_route: String,
    pub alternate_routes: Vec<String>,
    pub incidents: Vec<String>,
    /// Delta against the baseline commute, in minutes. Positive means slower.
    pub travel_time_change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficReport {
    pub route_analysis: RouteAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub optimizations: Vec<String>,
    pub conflicts_resolved: u32,
    pub efficiency_gain: f64,
}

/// User-context delta plus any preference overrides to fold into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextUpdate {
    pub context_changes: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub preferences: std::collections::HashMap<String, serde_json::Value>,
}

/// A timestamped synthetic signal from one of the five simulated sources.
///
/// Produced by exactly one source service, consumed at most once by the
/// decision engine. Lives from poll tick to dequeue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FeedEvent {
    Scanner {
        observed_at: DateTime<Utc>,
        report: ScannerReport,
    },
    Weather {
        observed_at: DateTime<Utc>,
        report: WeatherReport,
    },
    Traffic {
        observed_at: DateTime<Utc>,
        report: TrafficReport,
    },
    Schedule {
        observed_at: DateTime<Utc>,
        report: ScheduleReport,
    },
    Context {
        observed_at: DateTime<Utc>,
        update: ContextUpdate,
    },
}

/// Semantic rejection of an event whose typed payload carries garbage values.
///
/// Classifying these explicitly keeps bad feed data out of the decision
/// history without crashing a loop.
#[derive(Debug, Error)]
#[error("malformed {channel} event: {reason}")]
pub struct MalformedEvent {
    pub channel: FeedChannel,
    pub reason: String,
}

// Anything slower or faster than a full day of commute delta is feed noise.
const MAX_TRAVEL_TIME_DELTA_MIN: i64 = 24 * 60;

impl FeedEvent {
    pub fn channel(&self) -> FeedChannel {
        match self {
            FeedEvent::Scanner { .. } => FeedChannel::ScannerFeed,
            FeedEvent::Weather { .. } => FeedChannel::WeatherFeed,
            FeedEvent::Traffic { .. } => FeedChannel::TrafficFeed,
            FeedEvent::Schedule { .. } => FeedChannel::ScheduleEvents,
            FeedEvent::Context { .. } => FeedChannel::UserContext,
        }
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        match self {
            FeedEvent::Scanner { observed_at, .. }
            | FeedEvent::Weather { observed_at, .. }
            | FeedEvent::Traffic { observed_at, .. }
            | FeedEvent::Schedule { observed_at, .. }
            | FeedEvent::Context { observed_at, .. } => *observed_at,
        }
    }

    /// Serialize the source payload into the opaque form a `Decision` carries.
    pub fn payload_json(&self) -> serde_json::Value {
        match self {
            FeedEvent::Scanner { report, .. } => serde_json::to_value(report),
            FeedEvent::Weather { report, .. } => serde_json::to_value(report),
            FeedEvent::Traffic { report, .. } => serde_json::to_value(report),
            FeedEvent::Schedule { report, .. } => serde_json::to_value(report),
            FeedEvent::Context { update, .. } => serde_json::to_value(update),
        }
        .unwrap_or(serde_json::Value::Null)
    }

    /// Reject values the shape alone cannot rule out.
    pub fn validate(&self) -> Result<(), MalformedEvent> {
        let malformed = |reason: &str| MalformedEvent {
            channel: self.channel(),
            reason: reason.to_string(),
        };

        match self {
            FeedEvent::Scanner { report, .. } => {
                if report.transmission.trim().is_empty() {
                    return Err(malformed("empty transmission"));
                }
            }
            FeedEvent::Weather { report, .. } => {
                if report.alerts.iter().any(|a| a.trim().is_empty()) {
                    return Err(malformed("blank alert entry"));
                }
                if !report.current_conditions.precipitation_in.is_finite() {
                    return Err(malformed("non-finite precipitation"));
                }
            }
            FeedEvent::Traffic { report, .. } => {
                if report.route_analysis.travel_time_change.abs() > MAX_TRAVEL_TIME_DELTA_MIN {
                    return Err(malformed("travel time delta out of range"));
                }
            }
            FeedEvent::Schedule { report, .. } => {
                if !report.efficiency_gain.is_finite() {
                    return Err(malformed("non-finite efficiency gain"));
                }
            }
            FeedEvent::Context { .. } => {}
        }
        Ok(())
    }
}

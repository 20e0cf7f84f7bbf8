// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Autonomous decision engine.
//!
//! Consumes feed events, applies a fixed per-source rule to synthesize
//! decision records, and drains them to their terminal state on a separate
//! cycle. The engine performs no I/O; it owns the pending queue, the bounded
//! history ring, the absorbed user preferences, and the observability
//! counters, all behind short-lived locks.
//!
//! ## Rule Table
//! | Trigger | Condition | Kind | Urgency | Auto |
//! |---|---|---|---|---|
//! | scanner_event | location_extracted | route_optimization | medium | yes |
//! | weather_alert | alerts non-empty | schedule_adjustment | high | yes |
//! | traffic_delay | travel_time_change > 10 | route_change | medium | yes |
//! | schedule_conflict | conflicts_resolved > 0 | client_communication | high | no |
//! | user_request | always | caller-supplied | immediate | yes |
//!
//! An event that matches no rule is dropped on purpose; the miss is counted
//! and logged rather than fully silent.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::{Decision, DecisionId, DecisionKind, FeedEvent, Trigger, Urgency};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Traffic deltas at or below this many minutes are absorbed without action.
const TRAVEL_TIME_THRESHOLD_MIN: i64 = 10;

/// What became of an event offered to the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// A decision was synthesized and queued.
    Queued(DecisionId),
    /// No rule condition matched; intentional filtering, not an error.
    Filtered,
    /// Context events carry no rule; their preferences were merged instead.
    Absorbed,
}

pub struct DecisionEngine {
    pending: Mutex<VecDeque<Decision>>,
    history: Mutex<VecDeque<Decision>>,
    history_limit: usize,
    preferences: Mutex<HashMap<String, serde_json::Value>>,
    rule_misses: AtomicU64,
    decisions_made: AtomicU64,
}

impl DecisionEngine {
    pub fn new(history_limit: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
            preferences: Mutex::new(HashMap::new()),
            rule_misses: AtomicU64::new(0),
            decisions_made: AtomicU64::new(0),
        }
    }

    /// Apply the rule table to one feed event.
    ///
    /// The decision payload is the event payload copied verbatim; the engine
    /// never inspects it again after rule evaluation.
    pub fn enqueue_from_event(&self, event: &FeedEvent) -> RuleOutcome {
        let rule = match event {
            FeedEvent::Scanner { report, .. } if report.location_extracted => Some((
                DecisionKind::RouteOptimization,
                Trigger::ScannerEvent,
                Urgency::Medium,
                true,
            )),
            FeedEvent::Weather { report, .. } if !report.alerts.is_empty() => Some((
                DecisionKind::ScheduleAdjustment,
                Trigger::WeatherAlert,
                Urgency::High,
                true,
            )),
            FeedEvent::Traffic { report, .. }
                if report.route_analysis.travel_time_change > TRAVEL_TIME_THRESHOLD_MIN =>
            {
                Some((
                    DecisionKind::RouteChange,
                    Trigger::TrafficDelay,
                    Urgency::Medium,
                    true,
                ))
            }
            FeedEvent::Schedule { report, .. } if report.conflicts_resolved > 0 => Some((
                DecisionKind::ClientCommunication,
                Trigger::ScheduleConflict,
                Urgency::High,
                false,
            )),
            FeedEvent::Context { update, .. } => {
                self.absorb_preferences(&update.preferences);
                return RuleOutcome::Absorbed;
            }
            _ => None,
        };

        match rule {
            Some((kind, trigger, urgency, auto_execute)) => {
                let decision =
                    Decision::new(kind, trigger, event.payload_json(), urgency, auto_execute);
                let id = decision.id;
                self.pending.lock().push_back(decision);
                RuleOutcome::Queued(id)
            }
            None => {
                let misses = self.rule_misses.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(channel = %event.channel(), rule_misses = misses, "no decision rule matched");
                RuleOutcome::Filtered
            }
        }
    }

    /// Queue an operator-forced decision, bypassing the rule table entirely.
    pub fn force_decision(&self, kind: DecisionKind, payload: serde_json::Value) -> DecisionId {
        let decision = Decision::new(
            kind,
            Trigger::UserRequest,
            payload,
            Urgency::Immediate,
            true,
        );
        let id = decision.id;
        info!(decision_id = %id, kind = %decision.kind, "forced decision queued");
        self.pending.lock().push_back(decision);
        id
    }

    /// One drain cycle: pop every currently queued decision, move each to its
    /// terminal state, append to history. Returns the count processed.
    ///
    /// Pops are non-blocking, one lock acquisition per decision, so the cycle
    /// completes in bounded time. Decisions queued mid-drain land in whichever
    /// cycle observes them; cross-cycle ordering is deliberately weak.
    pub fn drain_and_execute(&self) -> usize {
        let mut processed = 0;
        loop {
            let decision = self.pending.lock().pop_front();
            let Some(mut decision) = decision else { break };

            decision.finalize(Utc::now());
            info!(
                decision_id = %decision.id,
                kind = %decision.kind,
                status = ?decision.status,
                urgency = ?decision.urgency,
                "decision resolved"
            );

            let mut history = self.history.lock();
            if history.len() >= self.history_limit {
                history.pop_front();
            }
            history.push_back(decision);
            drop(history);

            self.decisions_made.fetch_add(1, Ordering::Relaxed);
            processed += 1;
        }
        processed
    }

    fn absorb_preferences(&self, incoming: &HashMap<String, serde_json::Value>) {
        if incoming.is_empty() {
            return;
        }
        let mut prefs = self.preferences.lock();
        for (key, value) in incoming {
            prefs.insert(key.clone(), value.clone());
        }
    }

    /// Most recent `n` resolved decisions, oldest first.
    pub fn recent_decisions(&self, n: usize) -> Vec<Decision> {
        let history = self.history.lock();
        let skip = history.len().saturating_sub(n);
        history.iter().skip(skip).cloned().collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Total decisions ever resolved, unaffected by history truncation.
    pub fn decisions_made(&self) -> u64 {
        self.decisions_made.load(Ordering::Relaxed)
    }

    pub fn rule_misses(&self) -> u64 {
        self.rule_misses.load(Ordering::Relaxed)
    }

    pub fn preferences(&self) -> HashMap<String, serde_json::Value> {
        self.preferences.lock().clone()
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

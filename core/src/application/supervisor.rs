// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service supervisor.
//!
//! Owns the lifecycle of every background loop: one tokio task per feed
//! source plus one drain task for the decision engine. Each loop cooperates
//! only through the feed hub and the engine; the supervisor's registry of
//! `ServiceHandle`s is the externally observable surface consumed by the
//! status API.
//!
//! Shutdown is a shared `CancellationToken` checked in every loop's
//! `select!`, so tasks exit as soon as it fires rather than finishing a
//! sleep first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::engine::DecisionEngine;
use crate::application::feeds::FeedHub;
use crate::application::sources::{
    ContextProcessor, EventSource, ScannerMonitor, ScheduleOptimizer, TrafficAnalyzer,
    WeatherProcessor,
};
use crate::config::NeuralConfig;
use crate::domain::{Decision, DecisionId, DecisionKind, FeedChannel, ServiceHandle, ServiceStatus};

const DRAIN_SERVICE_NAME: &str = "decision_engine";

type ServiceRegistry = Arc<Mutex<HashMap<String, ServiceHandle>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Initializing,
    Operational,
    Stopped,
}

pub struct ServiceSupervisor {
    engine: Arc<DecisionEngine>,
    feeds: Arc<FeedHub>,
    registry: ServiceRegistry,
    state: Mutex<SystemStatus>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    drain_interval: Duration,
}

impl ServiceSupervisor {
    pub fn new(config: &NeuralConfig) -> Self {
        Self {
            engine: Arc::new(DecisionEngine::new(config.limits.history_limit)),
            feeds: Arc::new(FeedHub::new(config.limits.queue_capacity)),
            registry: Arc::new(Mutex::new(HashMap::new())),
            state: Mutex::new(SystemStatus::Initializing),
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            drain_interval: config.services.decision_drain,
        }
    }

    /// The five production sources at the intervals the config names.
    pub fn default_sources(config: &NeuralConfig) -> Vec<Arc<dyn EventSource>> {
        let s = &config.services;
        vec![
            Arc::new(ScannerMonitor::new(s.scanner)),
            Arc::new(WeatherProcessor::new(s.weather)),
            Arc::new(TrafficAnalyzer::new(s.traffic)),
            Arc::new(ScheduleOptimizer::new(s.schedule)),
            Arc::new(ContextProcessor::new(s.context)),
        ]
    }

    /// Launch one loop per source plus the drain loop.
    ///
    /// A source with a zero interval is misconfigured: it is registered with
    /// `status = Error` and skipped, without preventing the others from
    /// starting. Returns a snapshot of the registry as started.
    pub fn start_all(
        &self,
        sources: Vec<Arc<dyn EventSource>>,
    ) -> HashMap<String, ServiceHandle> {
        for source in sources {
            let name = source.name();
            if source.interval().is_zero() {
                warn!(service = name, "refusing to start service with zero interval");
                self.registry
                    .lock()
                    .insert(name.to_string(), ServiceHandle::errored(name));
                continue;
            }

            self.registry
                .lock()
                .insert(name.to_string(), ServiceHandle::running(name));

            let handle = tokio::spawn(run_source_loop(
                source,
                Arc::clone(&self.engine),
                Arc::clone(&self.feeds),
                Arc::clone(&self.registry),
                self.shutdown.clone(),
            ));
            self.tasks.lock().push(handle);
        }

        self.registry.lock().insert(
            DRAIN_SERVICE_NAME.to_string(),
            ServiceHandle::running(DRAIN_SERVICE_NAME),
        );
        let handle = tokio::spawn(run_drain_loop(
            Arc::clone(&self.engine),
            Arc::clone(&self.registry),
            self.shutdown.clone(),
            self.drain_interval,
        ));
        self.tasks.lock().push(handle);

        *self.state.lock() = SystemStatus::Operational;
        let snapshot = self.registry.lock().clone();
        info!(services = snapshot.len(), "neural core operational");
        snapshot
    }

    /// Cancel every loop and wait for the tasks to finish.
    pub async fn shutdown(&self) {
        info!("shutting down background services");
        self.shutdown.cancel();

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "background task aborted during shutdown");
            }
        }

        for handle in self.registry.lock().values_mut() {
            if handle.status == ServiceStatus::Running {
                handle.status = ServiceStatus::Stopped;
            }
        }
        *self.state.lock() = SystemStatus::Stopped;
    }

    pub fn system_status(&self) -> SystemStatus {
        *self.state.lock()
    }

    /// Snapshot of every registered service handle.
    pub fn services(&self) -> HashMap<String, ServiceHandle> {
        self.registry.lock().clone()
    }

    pub fn queue_sizes(&self) -> HashMap<FeedChannel, usize> {
        self.feeds.sizes()
    }

    pub fn recent_decisions(&self, n: usize) -> Vec<Decision> {
        self.engine.recent_decisions(n)
    }

    pub fn force_decision(&self, kind: DecisionKind, payload: serde_json::Value) -> DecisionId {
        self.engine.force_decision(kind, payload)
    }

    pub fn engine(&self) -> &Arc<DecisionEngine> {
        &self.engine
    }

    pub fn feeds(&self) -> &Arc<FeedHub> {
        &self.feeds
    }
}

async fn run_source_loop(
    source: Arc<dyn EventSource>,
    engine: Arc<DecisionEngine>,
    feeds: Arc<FeedHub>,
    registry: ServiceRegistry,
    shutdown: CancellationToken,
) {
    let name = source.name();
    let interval = source.interval();
    let mut delay = interval;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        match source.produce().await {
            Ok(Some(event)) => {
                if let Err(e) = event.validate() {
                    warn!(service = name, error = %e, "discarding malformed event");
                } else {
                    feeds.push(event.clone());
                    let outcome = engine.enqueue_from_event(&event);
                    debug!(service = name, ?outcome, "event processed");
                }
                delay = interval;
            }
            Ok(None) => {
                delay = interval;
            }
            Err(e) => {
                // Recover after an extended back-off, never crash the loop.
                warn!(service = name, error = %e, "source failed, backing off");
                delay = interval * 2;
            }
        }

        touch(&registry, name);
    }

    debug!(service = name, "source loop stopped");
}

async fn run_drain_loop(
    engine: Arc<DecisionEngine>,
    registry: ServiceRegistry,
    shutdown: CancellationToken,
    drain_interval: Duration,
) {
    let mut tick = tokio::time::interval(drain_interval);
    // The first tick fires immediately; skip it so the loop matches the
    // source loops' sleep-then-work cadence.
    tick.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tick.tick() => {}
        }

        let drained = engine.drain_and_execute();
        if drained > 0 {
            debug!(drained, "decision drain cycle complete");
        }
        touch(&registry, DRAIN_SERVICE_NAME);
    }

    debug!("decision drain loop stopped");
}

fn touch(registry: &ServiceRegistry, name: &str) {
    if let Some(handle) = registry.lock().get_mut(name) {
        handle.last_activity = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sources::SourceError;
    use crate::domain::{FeedEvent, RouteAnalysis, TrafficReport, Urgency};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Emits one above-threshold traffic event per tick.
    struct FixedTrafficSource {
        interval: Duration,
        produced: AtomicU64,
    }

    impl FixedTrafficSource {
        fn new(interval: Duration) -> Self {
            Self {
                interval,
                produced: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl EventSource for FixedTrafficSource {
        fn name(&self) -> &'static str {
            "fixed_traffic"
        }

        fn channel(&self) -> FeedChannel {
            FeedChannel::TrafficFeed
        }

        fn interval(&self) -> Duration {
            self.interval
        }

        async fn produce(&self) -> Result<Option<FeedEvent>, SourceError> {
            self.produced.fetch_add(1, Ordering::Relaxed);
            Ok(Some(FeedEvent::Traffic {
                observed_at: Utc::now(),
                report: TrafficReport {
                    route_analysis: RouteAnalysis {
                        primary_route: "normal".to_string(),
                        alternate_routes: vec![],
                        incidents: vec![],
                        travel_time_change: 15,
                    },
                },
            }))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl EventSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing_source"
        }

        fn channel(&self) -> FeedChannel {
            FeedChannel::ScannerFeed
        }

        fn interval(&self) -> Duration {
            Duration::from_millis(10)
        }

        async fn produce(&self) -> Result<Option<FeedEvent>, SourceError> {
            Err(SourceError {
                service: "failing_source",
                reason: "synthetic fault".to_string(),
            })
        }
    }

    struct ZeroIntervalSource;

    #[async_trait]
    impl EventSource for ZeroIntervalSource {
        fn name(&self) -> &'static str {
            "zero_interval"
        }

        fn channel(&self) -> FeedChannel {
            FeedChannel::UserContext
        }

        fn interval(&self) -> Duration {
            Duration::ZERO
        }

        async fn produce(&self) -> Result<Option<FeedEvent>, SourceError> {
            Ok(None)
        }
    }

    fn fast_config() -> NeuralConfig {
        let mut config = NeuralConfig::default();
        config.services.decision_drain = Duration::from_millis(20);
        config
    }

    #[tokio::test]
    async fn events_flow_from_source_to_history() {
        let supervisor = ServiceSupervisor::new(&fast_config());
        supervisor.start_all(vec![Arc::new(FixedTrafficSource::new(
            Duration::from_millis(10),
        ))]);

        tokio::time::sleep(Duration::from_millis(150)).await;
        supervisor.shutdown().await;

        assert!(supervisor.engine().decisions_made() > 0);
        let history = supervisor.recent_decisions(10);
        assert!(history.iter().all(|d| d.kind == DecisionKind::RouteChange));
        assert!(supervisor.queue_sizes()[&FeedChannel::TrafficFeed] > 0);
    }

    #[tokio::test]
    async fn failing_source_keeps_running_and_backs_off() {
        let supervisor = ServiceSupervisor::new(&fast_config());
        supervisor.start_all(vec![Arc::new(FailingSource)]);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            supervisor.services()["failing_source"].status,
            ServiceStatus::Running
        );

        supervisor.shutdown().await;
        assert_eq!(
            supervisor.services()["failing_source"].status,
            ServiceStatus::Stopped
        );
    }

    #[tokio::test]
    async fn zero_interval_source_is_marked_error_without_blocking_others() {
        let supervisor = ServiceSupervisor::new(&fast_config());
        supervisor.start_all(vec![
            Arc::new(ZeroIntervalSource),
            Arc::new(FixedTrafficSource::new(Duration::from_millis(10))),
        ]);

        let services = supervisor.services();
        assert_eq!(services["zero_interval"].status, ServiceStatus::Error);
        assert_eq!(services["fixed_traffic"].status, ServiceStatus::Running);
        assert_eq!(supervisor.system_status(), SystemStatus::Operational);

        supervisor.shutdown().await;
        // An errored service was never running; it stays in Error.
        assert_eq!(
            supervisor.services()["zero_interval"].status,
            ServiceStatus::Error
        );
    }

    #[tokio::test]
    async fn shutdown_stops_all_loops() {
        let source = Arc::new(FixedTrafficSource::new(Duration::from_millis(10)));
        let supervisor = ServiceSupervisor::new(&fast_config());
        supervisor.start_all(vec![source.clone() as Arc<dyn EventSource>]);

        tokio::time::sleep(Duration::from_millis(50)).await;
        supervisor.shutdown().await;
        assert_eq!(supervisor.system_status(), SystemStatus::Stopped);

        let after = source.produced.load(Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.produced.load(Ordering::Relaxed), after);
    }

    #[tokio::test]
    async fn forced_decisions_resolve_on_the_drain_cycle() {
        let supervisor = ServiceSupervisor::new(&fast_config());
        supervisor.start_all(vec![]);

        supervisor.force_decision(DecisionKind::from("custom_type"), serde_json::json!({}));
        tokio::time::sleep(Duration::from_millis(100)).await;
        supervisor.shutdown().await;

        let history = supervisor.recent_decisions(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].urgency, Urgency::Immediate);
    }
}

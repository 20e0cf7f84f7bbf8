// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod engine;
pub mod feeds;
pub mod sources;
pub mod supervisor;

pub use engine::{DecisionEngine, RuleOutcome};
pub use feeds::{FeedHub, FeedQueue};
pub use sources::{
    ContextProcessor, EventSource, ScannerMonitor, ScheduleOptimizer, SourceError,
    TrafficAnalyzer, WeatherProcessor,
};
pub use supervisor::{ServiceSupervisor, SystemStatus};

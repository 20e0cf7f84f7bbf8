// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Neural core configuration.
//!
//! Loaded from a YAML file when one is given, otherwise built from defaults.
//! Intervals are humantime strings ("5s", "10m"). There is no global config
//! instance; the loaded value is passed into whatever constructs the
//! supervisor.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::engine::DEFAULT_HISTORY_LIMIT;
use crate::application::feeds::DEFAULT_QUEUE_CAPACITY;

/// Poll interval per background service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceIntervals {
    #[serde(with = "humantime_serde")]
    pub scanner: Duration,
    #[serde(with = "humantime_serde")]
    pub weather: Duration,
    #[serde(with = "humantime_serde")]
    pub traffic: Duration,
    #[serde(with = "humantime_serde")]
    pub schedule: Duration,
    #[serde(with = "humantime_serde")]
    pub context: Duration,
    /// How often the engine drains pending decisions.
    #[serde(with = "humantime_serde")]
    pub decision_drain: Duration,
}

impl Default for ServiceIntervals {
    fn default() -> Self {
        Self {
            scanner: Duration::from_secs(5),
            weather: Duration::from_secs(300),
            traffic: Duration::from_secs(30),
            schedule: Duration::from_secs(600),
            context: Duration::from_secs(60),
            decision_drain: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NeuralConfig {
    pub services: ServiceIntervals,
    pub limits: Limits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Per-feed queue capacity before drop-oldest kicks in.
    pub queue_capacity: usize,
    /// Decision history ring size.
    pub history_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl NeuralConfig {
    /// Load from a YAML file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_yaml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Background service bookkeeping for the supervisor registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Error,
}

/// One entry per background service. Mutated only by the supervisor and the
/// service's own loop (which refreshes `last_activity` every tick).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHandle {
    pub name: String,
    pub status: ServiceStatus,
    pub last_activity: DateTime<Utc>,
}

impl ServiceHandle {
    pub fn running(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ServiceStatus::Running,
            last_activity: Utc::now(),
        }
    }

    pub fn errored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ServiceStatus::Error,
            last_activity: Utc::now(),
        }
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Bounded in-memory feed queues.
//!
//! One FIFO per channel decouples the source services from the decision
//! engine and gives the status surface something to report. Producers never
//! block: when a queue is full the oldest entry is dropped and the drop is
//! counted, so a stalled consumer degrades to "freshest N events" instead of
//! unbounded growth.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::warn;

use crate::domain::{FeedChannel, FeedEvent};

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Single-channel FIFO with a drop-oldest overflow policy.
pub struct FeedQueue {
    channel: FeedChannel,
    inner: Mutex<VecDeque<FeedEvent>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl FeedQueue {
    pub fn new(channel: FeedChannel, capacity: usize) -> Self {
        Self {
            channel,
            inner: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Append an event. Never blocks; returns `false` when an older event
    /// had to be evicted to make room.
    pub fn push(&self, event: FeedEvent) -> bool {
        let evicted = {
            let mut queue = self.inner.lock();
            let evicted = if queue.len() >= self.capacity {
                queue.pop_front();
                true
            } else {
                false
            };
            queue.push_back(event);
            evicted
        };

        if evicted {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                channel = %self.channel,
                capacity = self.capacity,
                dropped_total = total,
                "feed queue saturated, dropped oldest event"
            );
        }
        !evicted
    }

    /// Non-blocking pop: `Some(event)` if present, `None` otherwise.
    pub fn try_pop(&self) -> Option<FeedEvent> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Registry of the five feed queues, one per channel.
pub struct FeedHub {
    queues: HashMap<FeedChannel, FeedQueue>,
}

impl FeedHub {
    pub fn new(capacity: usize) -> Self {
        let queues = FeedChannel::ALL
            .into_iter()
            .map(|ch| (ch, FeedQueue::new(ch, capacity)))
            .collect();
        Self { queues }
    }

    pub fn push(&self, event: FeedEvent) -> bool {
        // Every channel is created in `new`, so the lookup cannot miss.
        self.queues[&event.channel()].push(event)
    }

    pub fn queue(&self, channel: FeedChannel) -> &FeedQueue {
        &self.queues[&channel]
    }

    /// Snapshot of per-channel sizes for status reporting.
    pub fn sizes(&self) -> HashMap<FeedChannel, usize> {
        self.queues.iter().map(|(ch, q)| (*ch, q.len())).collect()
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget notifications about queue and sync activity.

use ol_core::{JobGroup, JobId};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// State of the background sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Running,
    Succeeded,
    FailedAfterRetries,
}

/// A notification emitted by the queue, a job or the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MutationSucceeded { job: JobId, kind: String },
    MutationFailed { job: JobId, kind: String, reason: String },
    AuthenticationRequired,
    Authenticated { success: bool },
    InboxNotConfigured,
    /// Fraction of documents fetched, in `0.0..=1.0`.
    SyncProgress { progress: f32 },
    SyncStatus { status: SyncStatus },
    RateLimitDelay { delay: Duration, group: JobGroup },
}

/// Receiver of events. Emitting never fails and never blocks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

impl EventSink for tokio::sync::broadcast::Sender<Event> {
    fn emit(&self, event: Event) {
        // No subscribers is fine
        let _ = self.send(event);
    }
}

/// Sink that forwards events to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: Event) {
        tracing::debug!(?event, "event");
    }
}

/// Sink that keeps every event, for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(event);
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted job records.
//!
//! The queue engine lives in the `olsync` crate; this module only defines the
//! identifiers and the row layout so that job records and node rows share one
//! SQLite file and one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Unique identifier of a job. Doubles as the pending marker on nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random job id.
    pub fn generate() -> Self {
        JobId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId(s)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordering group. Jobs of one group run strictly one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobGroup {
    /// All mutation jobs.
    Items,
    /// Full synchronization.
    Sync,
    /// Credential verification.
    Auth,
}

impl JobGroup {
    pub const ALL: [JobGroup; 3] = [JobGroup::Items, JobGroup::Sync, JobGroup::Auth];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobGroup::Items => "items",
            JobGroup::Sync => "sync",
            JobGroup::Auth => "auth",
        }
    }
}

impl fmt::Display for JobGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "items" => Ok(JobGroup::Items),
            "sync" => Ok(JobGroup::Sync),
            "auth" => Ok(JobGroup::Auth),
            _ => Err(Error::InvalidGroup(s.to_string())),
        }
    }
}

/// Persisted lifecycle state. Terminal jobs are removed from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(JobState::Queued),
            "running" => Ok(JobState::Running),
            _ => Err(Error::InvalidState(s.to_string())),
        }
    }
}

/// A durable unit of deferred work.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    /// Insertion sequence, assigned by the store. Defines FIFO order.
    pub seq: i64,
    pub id: JobId,
    /// Kind tag of the payload (e.g. `create`, `sync`).
    pub kind: String,
    /// JSON-encoded payload, interpreted by the queue engine.
    pub payload: String,
    pub group: JobGroup,
    /// Jobs sharing a dedup key have at most one queued instance.
    pub dedup_key: Option<String>,
    pub run_count: u32,
    pub state: JobState,
    /// Earliest time of the next attempt.
    pub not_before: DateTime<Utc>,
    pub cancel_requested: bool,
    pub created: DateTime<Utc>,
}

impl JobRecord {
    /// Creates a queued record that is due immediately.
    pub fn new(
        id: JobId,
        kind: impl Into<String>,
        payload: String,
        group: JobGroup,
        now: DateTime<Utc>,
    ) -> Self {
        JobRecord {
            seq: 0,
            id,
            kind: kind.into(),
            payload,
            group,
            dedup_key: None,
            run_count: 0,
            state: JobState::Queued,
            not_before: now,
            cancel_requested: false,
            created: now,
        }
    }

    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }

    /// Returns true if the record may start at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

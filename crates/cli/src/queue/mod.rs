// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable job queue.
//!
//! Jobs are persisted in the `jobs` table next to the nodes they touch, so
//! the optimistic local step and the job record commit together. Each
//! group runs strictly FIFO, one job at a time: a retrying head blocks the
//! jobs behind it. Groups are independent of each other.

mod retry;

pub use retry::{Decision, RetryPolicy};

use chrono::{DateTime, Utc};
use ol_core::{ClockSource, Database, JobGroup, JobId, JobRecord, JobState, Markers};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::config::{Config, QueueConfig};
use crate::error::{Error, Result};
use crate::events::{Event, EventSink, SyncStatus};
use crate::jobs::{JobContext, JobPayload, LocalStep, RemoteStep, SyncJob};
use crate::remote::{RateLimiter, Remote, Sleeper};

/// Result of running one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed,
    Retrying { not_before: DateTime<Utc> },
    Cancelled,
}

/// What [`JobQueue::run_next`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Ran { job: JobId, outcome: JobOutcome },
    /// The head is not due before the given time.
    Waiting(DateTime<Utc>),
    /// The group has work but the queue is offline.
    Offline,
    /// Nothing queued.
    Idle,
}

enum Claim {
    Idle,
    Waiting(DateTime<Utc>),
    Claimed(JobRecord),
}

/// The job queue engine.
pub struct JobQueue {
    db: Arc<Database>,
    remote: Arc<dyn Remote>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn ClockSource>,
    limiter: RateLimiter,
    config: QueueConfig,
    markers: Markers,
    online: AtomicBool,
    notifiers: HashMap<JobGroup, Arc<Notify>>,
    last_forced_sync: Mutex<Option<DateTime<Utc>>>,
}

impl JobQueue {
    /// Opens the queue over `db`. Jobs interrupted while running are queued again.
    pub fn open(
        db: Arc<Database>,
        remote: Arc<dyn Remote>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn ClockSource>,
        sleeper: Arc<dyn Sleeper>,
        config: &Config,
    ) -> Result<Self> {
        let requeued = db.transaction(|s| s.requeue_running())?;
        if requeued > 0 {
            tracing::info!(count = requeued, "requeued interrupted jobs");
        }
        Ok(JobQueue {
            db,
            remote,
            events,
            clock,
            limiter: RateLimiter::new(config.rate_limit_delay(), sleeper),
            config: config.queue.clone(),
            markers: config.markers.clone(),
            online: AtomicBool::new(true),
            notifiers: JobGroup::ALL
                .iter()
                .map(|&g| (g, Arc::new(Notify::new())))
                .collect(),
            last_forced_sync: Mutex::new(None),
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Wakes the worker of `group` whenever its queue may have become runnable.
    pub fn notifier(&self, group: JobGroup) -> Arc<Notify> {
        self.notifiers
            .get(&group)
            .cloned()
            .unwrap_or_else(|| Arc::new(Notify::new()))
    }

    fn wake(&self, group: JobGroup) {
        if let Some(notify) = self.notifiers.get(&group) {
            notify.notify_one();
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Suspends or resumes network jobs. Suspension consumes no attempts.
    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::SeqCst);
        if online && !was {
            tracing::info!("network available, resuming jobs");
            for group in JobGroup::ALL {
                self.wake(group);
            }
        } else if !online && was {
            tracing::info!("network unavailable, suspending jobs");
        }
    }

    /// Persisted jobs in queue order.
    pub fn pending(&self) -> Result<Vec<JobRecord>> {
        Ok(self.db.read(|s| s.jobs())?)
    }

    /// Validates `payload`, applies its local step and persists it.
    ///
    /// A deduplicated payload whose key has a queued instance replaces that
    /// instance's payload and returns its id.
    pub fn enqueue(&self, payload: JobPayload) -> Result<JobId> {
        let now = self.clock.now();
        let group = payload.group();
        let kind = payload.kind();

        let id = self.db.transaction(|s| {
            let mut payload = payload;
            if let Some(key) = payload.dedup_key() {
                if let Some(mut existing) = s.queued_by_dedup_key(key)? {
                    existing.payload = payload.to_json()?;
                    s.update_job(&existing)?;
                    tracing::debug!(job = %existing.id, kind, "replaced queued duplicate");
                    return Ok(existing.id);
                }
            }

            payload.validate(s)?;
            let id = JobId::generate();
            payload.apply_local(s, &id, now)?;
            let mut record = JobRecord::new(id.clone(), kind, payload.to_json()?, group, now);
            if let Some(key) = payload.dedup_key() {
                record = record.with_dedup_key(key);
            }
            s.insert_job(&mut record)?;
            Ok(id)
        })?;

        tracing::info!(job = %id, kind, group = %group, "enqueued job");
        self.wake(group);
        Ok(id)
    }

    /// Enqueues a full sync.
    pub fn request_sync(&self, manual: bool) -> Result<JobId> {
        self.enqueue(JobPayload::Sync(SyncJob { manual }))
    }

    /// Enqueues a sync on behalf of a stuck job, at most once per debounce window.
    fn force_sync(&self) -> Result<()> {
        let now = self.clock.now();
        {
            let mut last = self
                .last_forced_sync
                .lock()
                .unwrap_or_else(|p| p.into_inner());
            if let Some(at) = *last {
                let window = chrono::Duration::from_std(self.config.sync_debounce())
                    .unwrap_or(chrono::Duration::MAX);
                if at.checked_add_signed(window).is_none_or(|until| now < until) {
                    tracing::debug!("forced sync debounced");
                    return Ok(());
                }
            }
            *last = Some(now);
        }
        self.request_sync(false)?;
        Ok(())
    }

    /// Cancels a job. A queued job is reverted at once and `true` returned;
    /// a running job is cancelled when its remote step returns.
    pub fn cancel(&self, id: &JobId) -> Result<bool> {
        let cancelled = self.db.transaction(|s| {
            let mut record = s
                .job(id)?
                .ok_or_else(|| ol_core::Error::JobNotFound(id.to_string()))?;
            match record.state {
                JobState::Queued => {
                    revert(s, &record)?;
                    s.delete_job(id)?;
                    Ok(Some(record))
                }
                JobState::Running => {
                    record.cancel_requested = true;
                    s.update_job(&record)?;
                    Ok(None)
                }
            }
        })?;

        match cancelled {
            Some(record) => {
                tracing::info!(job = %id, "cancelled queued job");
                self.emit_cancelled(&record, "cancelled");
                self.wake(record.group);
                Ok(true)
            }
            None => {
                tracing::info!(job = %id, "cancellation requested for running job");
                Ok(false)
            }
        }
    }

    /// Runs the head job of `group` if it is due.
    pub fn run_next(&self, group: JobGroup) -> Result<Step> {
        if !self.is_online() {
            let queued = self.db.read(|s| s.head_job(group))?.is_some();
            return Ok(if queued { Step::Offline } else { Step::Idle });
        }

        let now = self.clock.now();
        let claim = self.db.transaction(|s| {
            let Some(mut record) = s.head_job(group)? else {
                return Ok(Claim::Idle);
            };
            if !record.is_due(now) {
                return Ok(Claim::Waiting(record.not_before));
            }
            record.run_count += 1;
            record.state = JobState::Running;
            s.update_job(&record)?;
            Ok(Claim::Claimed(record))
        })?;
        let mut record = match claim {
            Claim::Idle => return Ok(Step::Idle),
            Claim::Waiting(until) => return Ok(Step::Waiting(until)),
            Claim::Claimed(record) => record,
        };

        let payload = match JobPayload::parse(&record.payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(job = %record.id, error = %e, "unreadable job payload");
                self.db.transaction(|s| {
                    s.release(&record.id)?;
                    s.delete_job(&record.id)?;
                    Ok(())
                })?;
                self.emit_cancelled(&record, &e.to_string());
                return Ok(Step::Ran {
                    job: record.id,
                    outcome: JobOutcome::Cancelled,
                });
            }
        };

        tracing::info!(job = %record.id, kind = %record.kind, attempt = record.run_count, "running job");
        let result = self.execute(&payload, &record);

        let outcome = match result {
            Ok(()) => {
                tracing::info!(job = %record.id, kind = %record.kind, "job completed");
                if record.group == JobGroup::Items {
                    self.events.emit(Event::MutationSucceeded {
                        job: record.id.clone(),
                        kind: record.kind.clone(),
                    });
                }
                JobOutcome::Completed
            }
            Err(err) => self.fail(&payload, &mut record, &err)?,
        };

        Ok(Step::Ran {
            job: record.id,
            outcome,
        })
    }

    /// Runs the remote step and, on success, completes the job in one transaction.
    fn execute(&self, payload: &JobPayload, record: &JobRecord) -> Result<()> {
        let ctx = JobContext {
            db: &self.db,
            remote: self.remote.as_ref(),
            limiter: &self.limiter,
            events: self.events.as_ref(),
            markers: &self.markers,
            clock: self.clock.as_ref(),
            job: record,
        };
        payload.run_remote(&ctx)?;
        self.db.transaction(|s| {
            payload.complete(s, &record.id, self.clock.now())?;
            s.delete_job(&record.id)?;
            Ok(())
        })?;
        Ok(())
    }

    fn fail(&self, payload: &JobPayload, record: &mut JobRecord, err: &Error) -> Result<JobOutcome> {
        match err {
            Error::AuthenticationRejected | Error::NotAuthenticated
                if record.group != JobGroup::Auth =>
            {
                self.events.emit(Event::AuthenticationRequired);
            }
            Error::DependentResourceMissing => self.events.emit(Event::InboxNotConfigured),
            Error::TargetNotYetIdentified(_) => self.force_sync()?,
            _ => {}
        }

        let decision = payload.policy(&self.config).decide(err, record.run_count);
        if let Decision::Retry { delay, consumed } = decision {
            if !consumed {
                record.run_count = record.run_count.saturating_sub(1);
            }
            let now = self.clock.now();
            let not_before = chrono::Duration::from_std(delay)
                .ok()
                .and_then(|d| now.checked_add_signed(d))
                .unwrap_or(now + chrono::Duration::days(365));
            record.state = JobState::Queued;
            record.not_before = not_before;

            let requeued = self.db.transaction(|s| {
                let cancel_requested = s.job(&record.id)?.is_none_or(|j| j.cancel_requested);
                if cancel_requested {
                    return Ok(false);
                }
                s.update_job(record)?;
                Ok(true)
            })?;
            if requeued {
                tracing::warn!(
                    job = %record.id,
                    kind = %record.kind,
                    error = %err,
                    retry_at = %not_before,
                    "job failed, will retry"
                );
                return Ok(JobOutcome::Retrying { not_before });
            }
        }

        tracing::warn!(job = %record.id, kind = %record.kind, error = %err, "job cancelled");
        self.db.transaction(|s| {
            revert(s, record)?;
            s.delete_job(&record.id)?;
            Ok(())
        })?;
        self.emit_cancelled(record, &err.to_string());
        Ok(JobOutcome::Cancelled)
    }

    fn emit_cancelled(&self, record: &JobRecord, reason: &str) {
        let event = match record.group {
            JobGroup::Items => Event::MutationFailed {
                job: record.id.clone(),
                kind: record.kind.clone(),
                reason: reason.to_string(),
            },
            JobGroup::Sync => Event::SyncStatus {
                status: SyncStatus::FailedAfterRetries,
            },
            JobGroup::Auth => Event::Authenticated { success: false },
        };
        self.events.emit(event);
        if record.group == JobGroup::Sync {
            self.events.emit(Event::SyncStatus {
                status: SyncStatus::Idle,
            });
        }
    }
}

/// Reverts a job's local step and clears every marker it left.
fn revert(store: &ol_core::Store<'_>, record: &JobRecord) -> ol_core::Result<()> {
    match JobPayload::parse(&record.payload) {
        Ok(payload) => payload.revert(store, &record.id)?,
        Err(e) => tracing::warn!(job = %record.id, error = %e, "reverting unreadable job"),
    }
    store.release(&record.id)?;
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

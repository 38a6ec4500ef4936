// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod jobs;
pub mod login;
pub mod ls;
pub mod outline;
pub mod run;
pub mod sync;

use ol_core::{Database, JobGroup, JobId, SystemClock};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::events::LogSink;
use crate::queue::{JobOutcome, JobQueue, Step};
use crate::remote::{HttpRemote, ThreadSleeper};

/// Helper to open the store and the job queue over the HTTP remote.
pub fn open_queue(config: &Config) -> Result<Arc<JobQueue>> {
    let db = Database::open(&config.db_path())?;
    let queue = JobQueue::open(
        Arc::new(db),
        Arc::new(HttpRemote::new(config.api_url.clone())),
        Arc::new(LogSink),
        Arc::new(SystemClock),
        Arc::new(ThreadSleeper),
        config,
    )?;
    Ok(Arc::new(queue))
}

/// Runs `group` until `job` has run once.
///
/// Returns `None` when the group stops making progress first (offline,
/// or a job ahead of it is waiting to retry).
pub(crate) fn run_until(
    queue: &JobQueue,
    group: JobGroup,
    job: &JobId,
) -> Result<Option<JobOutcome>> {
    loop {
        match queue.run_next(group)? {
            Step::Ran { job: ran, outcome } if &ran == job => return Ok(Some(outcome)),
            Step::Ran { .. } => continue,
            Step::Waiting(_) | Step::Offline | Step::Idle => return Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ol_core::db::{META_LAST_SYNC, META_TOKEN};
use ol_core::JobGroup;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::queue::{JobOutcome, JobQueue};

use super::{open_queue, run_until};

pub fn run(config: &Config) -> Result<()> {
    let queue = open_queue(config)?;
    println!("{}", run_impl(&queue)?);
    Ok(())
}

pub(crate) fn run_impl(queue: &JobQueue) -> Result<String> {
    if queue.db().meta(META_TOKEN)?.is_none() {
        return Err(Error::NotAuthenticated);
    }
    let job = queue.request_sync(true)?;
    match run_until(queue, JobGroup::Sync, &job)? {
        Some(JobOutcome::Completed) => {
            let nodes = queue.db().read(|s| s.all())?.len();
            let at = queue.db().meta(META_LAST_SYNC)?.unwrap_or_default();
            Ok(format!("synced {} nodes at {}", nodes, at))
        }
        Some(JobOutcome::Retrying { not_before }) => Ok(format!(
            "sync failed; retrying after {}",
            not_before.format("%Y-%m-%d %H:%M:%S")
        )),
        Some(JobOutcome::Cancelled) => Err(Error::GenericBackendFailure(
            "sync failed after retries".to_string(),
        )),
        None => Ok("sync queued behind a waiting retry; run 'ol run' later".to_string()),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

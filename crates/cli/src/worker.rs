// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue workers.
//!
//! One tokio task per job group. Remote steps are blocking, so each
//! `run_next` call goes to the blocking pool; between jobs a worker waits
//! for its group's notifier, the head's due time or shutdown.

use ol_core::{JobGroup, JobId};
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::queue::{JobOutcome, JobQueue, Step};

/// Pause after the store itself failed.
const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Spawns one worker per group. Workers exit when `cancel` fires.
pub fn spawn_workers(queue: Arc<JobQueue>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
    JobGroup::ALL
        .iter()
        .map(|&group| tokio::spawn(run_worker(Arc::clone(&queue), group, cancel.clone())))
        .collect()
}

async fn run_worker(queue: Arc<JobQueue>, group: JobGroup, cancel: CancellationToken) {
    let notify = queue.notifier(group);
    tracing::debug!(group = %group, "worker started");

    while !cancel.is_cancelled() {
        let q = Arc::clone(&queue);
        let step = tokio::task::spawn_blocking(move || q.run_next(group)).await;

        let wait = match step {
            Ok(Ok(Step::Ran { .. })) => continue,
            Ok(Ok(Step::Waiting(until))) => Some(
                (until - queue.now())
                    .to_std()
                    .unwrap_or(Duration::ZERO),
            ),
            Ok(Ok(Step::Offline | Step::Idle)) => None,
            Ok(Err(e)) => {
                tracing::error!(group = %group, error = %e, "queue step failed");
                Some(ERROR_PAUSE)
            }
            Err(e) => {
                tracing::error!(group = %group, error = %e, "worker task failed");
                break;
            }
        };

        let pause = async {
            match wait {
                Some(delay) => tokio::time::sleep(delay).await,
                None => future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = notify.notified() => {}
            _ = pause => {}
        }
    }
    tracing::debug!(group = %group, "worker stopped");
}

/// Runs due jobs of every group until none can make progress.
pub fn drain(queue: &JobQueue) -> Result<Vec<(JobId, JobOutcome)>> {
    let mut ran = Vec::new();
    loop {
        let mut progressed = false;
        for group in JobGroup::ALL {
            if let Step::Ran { job, outcome } = queue.run_next(group)? {
                ran.push((job, outcome));
                progressed = true;
            }
        }
        if !progressed {
            return Ok(ran);
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ol_core::db::META_TOKEN;
use ol_core::JobId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::queue::{JobOutcome, JobQueue};
use crate::worker::{drain, spawn_workers};

use super::open_queue;

pub fn run(config: &Config, watch: bool) -> Result<()> {
    let queue = open_queue(config)?;
    if watch {
        watch_until_interrupted(queue)
    } else {
        print!("{}", run_impl(&queue)?);
        Ok(())
    }
}

/// Runs every due job once and summarizes what happened.
pub(crate) fn run_impl(queue: &JobQueue) -> Result<String> {
    let ran = drain(queue)?;
    let left = queue.pending()?.len();
    Ok(summarize(&ran, left))
}

pub(crate) fn summarize(ran: &[(JobId, JobOutcome)], left: usize) -> String {
    let mut out = String::new();
    if ran.is_empty() {
        out.push_str("nothing to run\n");
    }
    for (job, outcome) in ran {
        let line = match outcome {
            JobOutcome::Completed => format!("{} completed\n", job),
            JobOutcome::Retrying { not_before } => format!(
                "{} failed, retrying after {}\n",
                job,
                not_before.format("%Y-%m-%d %H:%M:%S")
            ),
            JobOutcome::Cancelled => format!("{} cancelled\n", job),
        };
        out.push_str(&line);
    }
    if left > 0 {
        out.push_str(&format!("{} job(s) still queued\n", left));
    }
    out
}

/// Keeps one worker per group alive until Ctrl-C. When logged in, a sync
/// is queued on start so the local copy catches up.
fn watch_until_interrupted(queue: Arc<JobQueue>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    rt.block_on(async move {
        let cancel = CancellationToken::new();
        if queue.db().meta(META_TOKEN)?.is_some() {
            queue.request_sync(false)?;
        }
        let workers = spawn_workers(Arc::clone(&queue), cancel.clone());
        println!("running jobs, press Ctrl-C to stop");

        tokio::signal::ctrl_c().await?;
        tracing::info!("interrupted, stopping workers");
        cancel.cancel();
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "worker panicked");
            }
        }
        Ok::<(), Error>(())
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

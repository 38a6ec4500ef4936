// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, JobRecord, JobState};

use crate::config::Config;
use crate::error::Result;
use crate::queue::JobQueue;

use super::open_queue;

pub fn list(config: &Config) -> Result<()> {
    let queue = open_queue(config)?;
    let jobs = queue.pending()?;
    if jobs.is_empty() {
        println!("no queued jobs");
    }
    let now = queue.now();
    for job in &jobs {
        println!("{}", format_job(job, now));
    }
    Ok(())
}

/// `id  group  kind  state`, plus the attempt count and retry time once
/// the job has failed.
pub(crate) fn format_job(job: &JobRecord, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{}  {:<5}  {:<12}  {}",
        job.id,
        job.group.as_str(),
        job.kind,
        job.state.as_str()
    );
    if job.run_count > 0 {
        line.push_str(&format!("  attempts={}", job.run_count));
    }
    if job.state == JobState::Queued && !job.is_due(now) {
        line.push_str(&format!(
            "  retry at {}",
            job.not_before.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    if job.cancel_requested {
        line.push_str("  cancelling");
    }
    line
}

pub fn cancel(config: &Config, job: &JobId) -> Result<()> {
    let queue = open_queue(config)?;
    println!("{}", cancel_impl(&queue, job)?);
    Ok(())
}

pub(crate) fn cancel_impl(queue: &JobQueue, job: &JobId) -> Result<String> {
    if queue.cancel(job)? {
        Ok(format!("cancelled {}", job))
    } else {
        Ok(format!("{} is running; it will be cancelled when it returns", job))
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;

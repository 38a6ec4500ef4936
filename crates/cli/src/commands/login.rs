// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ol_core::JobGroup;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::jobs::{JobPayload, VerifyTokenJob};
use crate::queue::{JobOutcome, JobQueue};

use super::{open_queue, run_until};

pub fn run(config: &Config, token: String) -> Result<()> {
    let queue = open_queue(config)?;
    println!("{}", run_impl(&queue, token)?);
    Ok(())
}

/// Verifies `token` right away. A token the service rejects is an error;
/// one that cannot be checked yet stays queued.
pub(crate) fn run_impl(queue: &JobQueue, token: String) -> Result<String> {
    let job = queue.enqueue(JobPayload::VerifyToken(VerifyTokenJob {
        token: token.trim().to_string(),
    }))?;
    match run_until(queue, JobGroup::Auth, &job)? {
        Some(JobOutcome::Completed) => Ok("logged in".to_string()),
        Some(JobOutcome::Cancelled) => Err(Error::AuthenticationRejected),
        Some(JobOutcome::Retrying { .. }) | None => Ok(format!(
            "could not reach the service; token check {} stays queued for 'ol run'",
            job
        )),
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;

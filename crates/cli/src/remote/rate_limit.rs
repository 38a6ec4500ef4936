// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-retry wrapper for rate-limited requests.

use std::sync::Arc;
use std::time::Duration;

use super::RemoteResponse;
use crate::error::Result;

/// Blocking pause, injectable so tests do not wait.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Retries a rate-limited request exactly once after a fixed pause.
///
/// A response that is rate limited again is returned as-is; translating it
/// yields a generic backend failure.
#[derive(Clone)]
pub struct RateLimiter {
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimiter {
    pub fn new(delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        RateLimiter { delay, sleeper }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `call`; on a rate-limit response notifies `on_delay`, sleeps and
    /// runs it once more.
    pub fn execute<T>(
        &self,
        mut call: impl FnMut() -> Result<RemoteResponse<T>>,
        on_delay: impl FnOnce(Duration),
    ) -> Result<RemoteResponse<T>> {
        let response = call()?;
        if !response.is_rate_limited() {
            return Ok(response);
        }

        tracing::warn!(delay_secs = self.delay.as_secs(), "rate limit exceeded, pausing");
        on_delay(self.delay);
        self.sleeper.sleep(self.delay);
        call()
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry decisions per failure kind.

use std::time::Duration;

use crate::config::QueueConfig;
use crate::error::Error;

/// What the queue does with a job whose remote step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Run again after `delay`. Unconsumed attempts are given back.
    Retry { delay: Duration, consumed: bool },
    /// Give up: revert and clear markers.
    Cancel,
}

/// Retry limits and delays of one job kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
    pub identify_attempts: u32,
    pub missing_resource_delay: Duration,
    pub network_retry_delay: Duration,
}

impl RetryPolicy {
    /// Policy of the mutation jobs.
    pub fn mutation(config: &QueueConfig) -> Self {
        RetryPolicy {
            base_delay: Duration::from_secs(config.base_delay_secs),
            max_attempts: config.max_attempts,
            identify_attempts: config.identify_attempts,
            missing_resource_delay: Duration::from_secs(config.missing_resource_delay_secs),
            network_retry_delay: config.network_retry_delay(),
        }
    }

    /// Policy of the full sync.
    pub fn sync(config: &QueueConfig) -> Self {
        RetryPolicy {
            base_delay: Duration::from_secs(config.sync_base_delay_secs),
            max_attempts: config.sync_max_attempts,
            ..Self::mutation(config)
        }
    }

    /// Token verification runs once.
    pub fn verify(config: &QueueConfig) -> Self {
        RetryPolicy {
            max_attempts: 1,
            ..Self::mutation(config)
        }
    }

    /// Exponential backoff after the given attempt: `base * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Decides after `attempt` (1-based, the failed run included) failed with `error`.
    pub fn decide(&self, error: &Error, attempt: u32) -> Decision {
        if error.is_transient() {
            return Decision::Retry {
                delay: self.network_retry_delay,
                consumed: false,
            };
        }
        match error {
            Error::InvalidRequest(_) | Error::AuthenticationRejected => Decision::Cancel,
            _ if attempt >= self.max_attempts => Decision::Cancel,
            Error::TargetNotYetIdentified(_) if attempt >= self.identify_attempts => {
                Decision::Cancel
            }
            Error::DependentResourceMissing => Decision::Retry {
                delay: self.missing_resource_delay,
                consumed: true,
            },
            _ => Decision::Retry {
                delay: self.backoff(attempt),
                consumed: true,
            },
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

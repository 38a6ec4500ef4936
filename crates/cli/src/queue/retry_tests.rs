// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ol_core::LocalId;
use yare::parameterized;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn mutation() -> RetryPolicy {
    RetryPolicy::mutation(&QueueConfig::default())
}

#[parameterized(
    first = { 1, 10 },
    second = { 2, 20 },
    third = { 3, 40 },
    fifth = { 5, 160 },
)]
fn mutation_backoff_doubles(attempt: u32, expected_secs: u64) {
    assert_eq!(
        mutation().decide(&Error::GenericBackendFailure("x".into()), attempt),
        Decision::Retry { delay: secs(expected_secs), consumed: true }
    );
}

#[test]
fn backend_failure_cancels_at_attempt_cap() {
    let policy = mutation();
    let err = Error::GenericBackendFailure("x".into());
    assert!(matches!(policy.decide(&err, 12), Decision::Retry { .. }));
    assert_eq!(policy.decide(&err, 13), Decision::Cancel);
}

#[parameterized(
    invalid = { Error::InvalidRequest("NotFound".into()) },
    auth = { Error::AuthenticationRejected },
)]
fn unrecoverable_failures_cancel_immediately(err: Error) {
    assert_eq!(mutation().decide(&err, 1), Decision::Cancel);
}

#[test]
fn missing_inbox_waits_fixed_delay() {
    let policy = mutation();
    for attempt in [1, 4, 9] {
        assert_eq!(
            policy.decide(&Error::DependentResourceMissing, attempt),
            Decision::Retry { delay: secs(60), consumed: true }
        );
    }
}

#[test]
fn unidentified_target_gives_up_after_identify_attempts() {
    let policy = mutation();
    let err = Error::TargetNotYetIdentified(LocalId(1));
    assert_eq!(
        policy.decide(&err, 2),
        Decision::Retry { delay: secs(20), consumed: true }
    );
    assert_eq!(policy.decide(&err, 3), Decision::Cancel);
}

#[parameterized(
    transport = { Error::Transport("down".into()) },
    not_authenticated = { Error::NotAuthenticated },
)]
fn transient_failures_do_not_consume_attempts(err: Error) {
    assert_eq!(
        mutation().decide(&err, 13),
        Decision::Retry { delay: secs(5), consumed: false }
    );
}

#[test]
fn sync_policy_gives_up_after_two_attempts() {
    let policy = RetryPolicy::sync(&QueueConfig::default());
    let err = Error::GenericBackendFailure("x".into());
    assert_eq!(
        policy.decide(&err, 1),
        Decision::Retry { delay: secs(10), consumed: true }
    );
    assert_eq!(policy.decide(&err, 2), Decision::Cancel);
}

#[test]
fn verify_policy_never_retries() {
    let policy = RetryPolicy::verify(&QueueConfig::default());
    assert_eq!(
        policy.decide(&Error::GenericBackendFailure("x".into()), 1),
        Decision::Cancel
    );
}

#[test]
fn backoff_saturates() {
    assert!(mutation().backoff(u32::MAX) >= secs(10));
}

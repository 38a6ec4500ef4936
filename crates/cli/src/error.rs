// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ol_core::LocalId;
use thiserror::Error;

/// All possible errors that can occur in the olsync library.
///
/// The first six variants form the failure taxonomy of remote work; the
/// queue's retry policy decides what each of them means for a job.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network unavailable: {0}")]
    Transport(String),

    #[error("authentication rejected\n  hint: run 'ol login <token>' with a valid API token")]
    AuthenticationRejected,

    #[error("request cannot be fulfilled: {0}")]
    InvalidRequest(String),

    #[error("inbox is not configured on the remote service\n  hint: choose an inbox location in the outliner settings")]
    DependentResourceMissing,

    #[error("node {0} has no remote identity yet")]
    TargetNotYetIdentified(LocalId),

    #[error("backend failure: {0}")]
    GenericBackendFailure(String),

    #[error("not logged in\n  hint: run 'ol login <token>' first")]
    NotAuthenticated,

    #[error("{0}")]
    Store(#[from] ol_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for olsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true for failures that say nothing about the job itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::NotAuthenticated)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ol-core operations.

use thiserror::Error;

/// All possible errors that can occur in ol-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("node not found: {0}")]
    NodeNotFound(i64),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid job group: '{0}'\n  hint: valid groups are: items, sync, auth")]
    InvalidGroup(String),

    #[error("invalid job state: '{0}'\n  hint: valid states are: queued, running")]
    InvalidState(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for ol-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! olsync - An offline-first client for a remote outliner.
//!
//! Edits apply to a local SQLite copy of the outline immediately and are
//! persisted as jobs. A queue engine replays them against the remote
//! service with retries, and a sync job merges remote snapshots back
//! without clobbering changes that are still in flight.
//!
//! # Main Components
//!
//! - [`Remote`] - The remote service, with [`HttpRemote`] over its JSON API
//! - [`JobQueue`] - Durable per-group FIFO queue with retry policies
//! - [`jobs`] - Mutation jobs (create, edit, move, delete, duplicate, bulk edit)
//! - [`SyncEngine`] - Fetches every document and reconciles it locally
//! - [`worker`] - Tokio tasks that drive the queue
//!
//! ```rust,ignore
//! use olsync::{commands, jobs::{CreateJob, JobPayload}, Config};
//!
//! let config = Config::load(&olsync::config::default_config_path())?;
//! let queue = commands::open_queue(&config)?;
//! queue.enqueue(JobPayload::Create(CreateJob::new(inbox, "Call the bank")))?;
//! olsync::worker::drain(&queue)?;
//! ```

mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod jobs;
pub mod queue;
pub mod remote;
pub mod sync;
pub mod worker;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{Event, EventSink, SyncStatus};
pub use queue::{JobOutcome, JobQueue, Step};
pub use remote::{HttpRemote, Remote};
pub use sync::SyncEngine;

/// Execute a CLI command against the given configuration.
pub fn run(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Login { token } => commands::login::run(config, token),
        Command::Sync => commands::sync::run(config),
        Command::Add { text, note, parent } => commands::outline::add(config, text, note, parent),
        Command::Edit {
            id,
            content,
            note,
            checked,
            unchecked,
        } => commands::outline::edit(config, id, content, note, checked, unchecked),
        Command::Mv {
            id,
            parent,
            position,
        } => commands::outline::mv(config, id, parent, position),
        Command::Rm { id } => commands::outline::rm(config, id),
        Command::Dup { id } => commands::outline::dup(config, id),
        Command::Check { ids } => commands::outline::set_checked(config, &ids, true),
        Command::Uncheck { ids } => commands::outline::set_checked(config, &ids, false),
        Command::Ls { id, bookmarks } => commands::ls::run(config, id, bookmarks),
        Command::Jobs => commands::jobs::list(config),
        Command::Cancel { job } => commands::jobs::cancel(config, &job),
        Command::Run { watch } => commands::run::run(config, watch),
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ol-core: Shared library for the olsync outliner client
//!
//! This crate provides the node model, the SQLite node store and job table,
//! remote snapshot types, identity resolution and snapshot reconciliation.

pub mod clock;
pub mod db;
pub mod error;
pub mod identity;
pub mod job;
pub mod markers;
pub mod node;
pub mod reconcile;
pub mod snapshot;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use db::{Database, Store};
pub use error::{Error, Result};
pub use identity::IdentityResolver;
pub use job::{JobGroup, JobId, JobRecord, JobState};
pub use markers::Markers;
pub use node::{LocalId, Node, RemoteId};
pub use reconcile::{reconcile, ReconcileReport};
pub use snapshot::{FileEntry, RemoteFile, RemoteNode, RemoteSnapshot};

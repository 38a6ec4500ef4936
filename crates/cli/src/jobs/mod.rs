// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Job payloads.
//!
//! Every payload has two halves:
//! - a [`LocalStep`], applied optimistically inside the enqueue transaction,
//!   which stamps every node it touches with the job id
//! - a [`RemoteStep`], run later by the queue, which performs the remote
//!   call and translates its response
//!
//! Remote steps always re-read their targets from the store; a target that
//! has no remote identity yet yields [`Error::TargetNotYetIdentified`].

mod bulk_edit;
mod create;
mod delete;
mod duplicate;
mod edit;
mod move_node;
mod sync;
mod tree;
mod verify_token;

pub use bulk_edit::{BulkEditJob, NodeFields};
pub use create::CreateJob;
pub use delete::DeleteJob;
pub use duplicate::DuplicateJob;
pub use edit::{EditJob, Fields};
pub use move_node::MoveJob;
pub use sync::SyncJob;
pub use tree::insert_subtree;
pub use verify_token::VerifyTokenJob;

use chrono::{DateTime, Utc};
use ol_core::db::META_TOKEN;
use ol_core::{ClockSource, Database, JobGroup, JobId, JobRecord, LocalId, Markers, Node, RemoteId, Store};
use serde::{Deserialize, Serialize};

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use crate::queue::RetryPolicy;
use crate::remote::{NodeEdit, RateLimiter, Remote, RemoteResponse};

/// Optimistic local half of a job.
pub trait LocalStep {
    /// Rejects payloads that can never succeed. Runs before `apply_local`.
    fn validate(&self, _store: &Store<'_>) -> ol_core::Result<()> {
        Ok(())
    }

    /// Applies the change locally and marks the affected nodes with `job`.
    ///
    /// May record local ids in the payload; the payload is persisted after
    /// this returns.
    fn apply_local(&mut self, store: &Store<'_>, job: &JobId, now: DateTime<Utc>)
        -> ol_core::Result<()>;

    /// Undoes the local change of a cancelled job. Must clear every marker.
    fn revert(&self, store: &Store<'_>, job: &JobId) -> ol_core::Result<()> {
        store.release(job)?;
        Ok(())
    }
}

/// Remote half of a job.
pub trait RemoteStep {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()>;

    /// Finalizes a successful job. Must clear every marker.
    ///
    /// Released nodes are stamped with `now`, so a snapshot fetched before
    /// the job finished cannot overwrite them.
    fn complete(&self, store: &Store<'_>, job: &JobId, now: DateTime<Utc>) -> ol_core::Result<()> {
        for mut node in store.by_pending(job)? {
            node.release(job);
            node.touch(now);
            store.put(&mut node)?;
        }
        Ok(())
    }
}

/// Everything a remote step may use.
pub struct JobContext<'a> {
    pub db: &'a Database,
    pub remote: &'a dyn Remote,
    pub limiter: &'a RateLimiter,
    pub events: &'a dyn EventSink,
    pub markers: &'a Markers,
    pub clock: &'a dyn ClockSource,
    pub job: &'a JobRecord,
}

impl JobContext<'_> {
    /// The persisted API token.
    pub fn token(&self) -> Result<String> {
        self.db.meta(META_TOKEN)?.ok_or(Error::NotAuthenticated)
    }

    /// Calls the remote service with the persisted token.
    pub fn call<T>(
        &self,
        f: impl Fn(&dyn Remote, &str) -> Result<RemoteResponse<T>>,
    ) -> Result<T> {
        let token = self.token()?;
        self.call_as(&token, f)
    }

    /// Calls the remote service with `token` through the rate limiter and
    /// translates the response.
    pub fn call_as<T>(
        &self,
        token: &str,
        f: impl Fn(&dyn Remote, &str) -> Result<RemoteResponse<T>>,
    ) -> Result<T> {
        let group = self.job.group;
        self.limiter
            .execute(
                || f(self.remote, token),
                |delay| self.events.emit(Event::RateLimitDelay { delay, group }),
            )?
            .into_result()
    }

    /// Re-reads a target node. A vanished node makes the request invalid.
    pub fn node(&self, id: LocalId) -> Result<Node> {
        self.db
            .get(id)?
            .ok_or_else(|| Error::InvalidRequest(format!("node {} no longer exists", id)))
    }

    /// Persists a remote identity assigned to a local node.
    pub fn link(&self, id: LocalId, remote: RemoteId) -> Result<()> {
        let now = self.clock.now();
        self.db.transaction(|s| {
            if let Some(mut node) = s.get(id)? {
                node.set_remote_id(remote);
                node.touch(now);
                s.put(&mut node)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// Remote identity of `node`, or the error that makes the job wait for it.
pub fn remote_id_of(node: &Node) -> Result<RemoteId> {
    node.remote_id().ok_or(Error::TargetNotYetIdentified(node.id))
}

/// Edit request carrying the node's current values.
pub fn edit_of(node: &Node, remote: &RemoteId) -> NodeEdit {
    NodeEdit {
        node_id: remote.item_id.clone(),
        content: node.content.clone(),
        note: node.note.clone(),
        checked: node.checked,
        checkbox: node.checklist,
    }
}

/// Fails unless the node exists and is not being deleted.
pub(crate) fn live_node(store: &Store<'_>, id: LocalId) -> ol_core::Result<Node> {
    let node = store.node(id)?;
    if node.hidden {
        return Err(ol_core::Error::InvalidInput(format!(
            "node {} is being deleted",
            id
        )));
    }
    Ok(node)
}

/// A persisted job payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPayload {
    Create(CreateJob),
    Edit(EditJob),
    Move(MoveJob),
    Delete(DeleteJob),
    Duplicate(DuplicateJob),
    BulkEdit(BulkEditJob),
    Sync(SyncJob),
    VerifyToken(VerifyTokenJob),
}

impl JobPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            JobPayload::Create(_) => "create",
            JobPayload::Edit(_) => "edit",
            JobPayload::Move(_) => "move",
            JobPayload::Delete(_) => "delete",
            JobPayload::Duplicate(_) => "duplicate",
            JobPayload::BulkEdit(_) => "bulk_edit",
            JobPayload::Sync(_) => "sync",
            JobPayload::VerifyToken(_) => "verify_token",
        }
    }

    pub fn group(&self) -> JobGroup {
        match self {
            JobPayload::Sync(_) => JobGroup::Sync,
            JobPayload::VerifyToken(_) => JobGroup::Auth,
            _ => JobGroup::Items,
        }
    }

    /// Auxiliary jobs keep at most one queued instance.
    pub fn dedup_key(&self) -> Option<&'static str> {
        match self {
            JobPayload::Sync(_) => Some("sync"),
            JobPayload::VerifyToken(_) => Some("verify_token"),
            _ => None,
        }
    }

    pub fn policy(&self, config: &QueueConfig) -> RetryPolicy {
        match self.group() {
            JobGroup::Items => RetryPolicy::mutation(config),
            JobGroup::Sync => RetryPolicy::sync(config),
            JobGroup::Auth => RetryPolicy::verify(config),
        }
    }

    pub fn parse(payload: &str) -> ol_core::Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn to_json(&self) -> ol_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn local(&self) -> &dyn LocalStep {
        match self {
            JobPayload::Create(job) => job,
            JobPayload::Edit(job) => job,
            JobPayload::Move(job) => job,
            JobPayload::Delete(job) => job,
            JobPayload::Duplicate(job) => job,
            JobPayload::BulkEdit(job) => job,
            JobPayload::Sync(job) => job,
            JobPayload::VerifyToken(job) => job,
        }
    }

    fn local_mut(&mut self) -> &mut dyn LocalStep {
        match self {
            JobPayload::Create(job) => job,
            JobPayload::Edit(job) => job,
            JobPayload::Move(job) => job,
            JobPayload::Delete(job) => job,
            JobPayload::Duplicate(job) => job,
            JobPayload::BulkEdit(job) => job,
            JobPayload::Sync(job) => job,
            JobPayload::VerifyToken(job) => job,
        }
    }

    fn remote(&self) -> &dyn RemoteStep {
        match self {
            JobPayload::Create(job) => job,
            JobPayload::Edit(job) => job,
            JobPayload::Move(job) => job,
            JobPayload::Delete(job) => job,
            JobPayload::Duplicate(job) => job,
            JobPayload::BulkEdit(job) => job,
            JobPayload::Sync(job) => job,
            JobPayload::VerifyToken(job) => job,
        }
    }
}

impl LocalStep for JobPayload {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        self.local().validate(store)
    }

    fn apply_local(
        &mut self,
        store: &Store<'_>,
        job: &JobId,
        now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        self.local_mut().apply_local(store, job, now)
    }

    fn revert(&self, store: &Store<'_>, job: &JobId) -> ol_core::Result<()> {
        self.local().revert(store, job)
    }
}

impl RemoteStep for JobPayload {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        self.remote().run_remote(ctx)
    }

    fn complete(&self, store: &Store<'_>, job: &JobId, now: DateTime<Utc>) -> ol_core::Result<()> {
        self.remote().complete(store, job, now)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

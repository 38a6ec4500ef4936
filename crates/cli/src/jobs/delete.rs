// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, LocalId, Store};
use serde::{Deserialize, Serialize};

use super::{live_node, remote_id_of, JobContext, LocalStep, RemoteStep};
use crate::error::Result;

/// Deletes a node and its descendants.
///
/// The subtree is hidden locally until the remote delete succeeds; only
/// then are the rows removed, leaving tombstones for their identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteJob {
    pub node: LocalId,
}

impl LocalStep for DeleteJob {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        let node = live_node(store, self.node)?;
        if node.is_inbox {
            return Err(ol_core::Error::InvalidInput(
                "the inbox cannot be deleted".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_local(
        &mut self,
        store: &Store<'_>,
        job: &JobId,
        now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        for mut node in store.subtree(self.node)? {
            node.hidden = true;
            node.touch(now);
            node.pending = Some(job.clone());
            store.put(&mut node)?;
        }
        Ok(())
    }

    fn revert(&self, store: &Store<'_>, job: &JobId) -> ol_core::Result<()> {
        for mut node in store.by_pending(job)? {
            node.hidden = false;
            node.release(job);
            store.put(&mut node)?;
        }
        Ok(())
    }
}

impl RemoteStep for DeleteJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let node = ctx.node(self.node)?;
        let remote = remote_id_of(&node)?;
        ctx.call(|r, token| r.delete_node(token, &remote.file_id, &remote.item_id))
    }

    fn complete(&self, store: &Store<'_>, job: &JobId, now: DateTime<Utc>) -> ol_core::Result<()> {
        let doomed = store.by_pending(job)?;
        for remote in doomed.iter().filter_map(|n| n.remote_id()) {
            store.bury(&remote, now)?;
        }
        let ids: Vec<LocalId> = doomed.iter().map(|n| n.id).collect();
        store.remove(&ids)?;
        Ok(())
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, LocalId, Node, Store};
use serde::{Deserialize, Serialize};

use super::{insert_subtree, live_node, remote_id_of, JobContext, LocalStep, RemoteStep};
use crate::error::{Error, Result};

/// Moves a node under a new parent.
///
/// Within one file this is a single remote move. Across files the node is
/// deleted remotely and its subtree re-inserted under the new parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveJob {
    pub node: LocalId,
    pub parent: LocalId,
    /// Target index; `None` appends. Resolved by the local step.
    #[serde(default)]
    pub position: Option<u32>,
    /// Set by the local step when source and target files differ.
    #[serde(default)]
    pub cross_file: bool,
}

impl MoveJob {
    pub fn new(node: LocalId, parent: LocalId, position: Option<u32>) -> Self {
        MoveJob {
            node,
            parent,
            position,
            cross_file: false,
        }
    }
}

fn to_position(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Writes dense positions. The moved node is always marked; siblings only
/// when their position changed and no other job owns them.
fn renumber(
    store: &Store<'_>,
    siblings: &mut [Node],
    moved: LocalId,
    job: &JobId,
    now: DateTime<Utc>,
) -> ol_core::Result<()> {
    for (index, sibling) in siblings.iter_mut().enumerate() {
        let position = to_position(index);
        if sibling.id == moved {
            sibling.touch(now);
            sibling.pending = Some(job.clone());
        } else if sibling.position == position {
            continue;
        } else if !sibling.is_pending() {
            sibling.pending = Some(job.clone());
        }
        sibling.position = position;
        store.put(sibling)?;
    }
    Ok(())
}

impl LocalStep for MoveJob {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        let node = live_node(store, self.node)?;
        live_node(store, self.parent)?;
        if node.parent.is_none() {
            return Err(ol_core::Error::InvalidInput(
                "a document root cannot be moved".to_string(),
            ));
        }
        // The target must not lie inside the moved subtree
        let mut cursor = Some(self.parent);
        while let Some(id) = cursor {
            if id == self.node {
                return Err(ol_core::Error::InvalidInput(format!(
                    "cannot move node {} into its own subtree",
                    self.node
                )));
            }
            cursor = store.node(id)?.parent;
        }
        Ok(())
    }

    fn apply_local(
        &mut self,
        store: &Store<'_>,
        job: &JobId,
        now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        let mut node = store.node(self.node)?;
        let target = store.node(self.parent)?;
        self.cross_file = node.file_id != target.file_id;

        let old_parent = node.parent;
        let mut old_siblings: Vec<Node> = store
            .children(old_parent)?
            .into_iter()
            .filter(|n| n.id != node.id)
            .collect();
        node.parent = Some(target.id);

        let position = if old_parent == Some(target.id) {
            let position = self.position.unwrap_or(u32::MAX).min(to_position(old_siblings.len()));
            old_siblings.insert(position as usize, node);
            renumber(store, &mut old_siblings, self.node, job, now)?;
            position
        } else {
            let mut new_siblings = store.children(Some(target.id))?;
            let position = self.position.unwrap_or(u32::MAX).min(to_position(new_siblings.len()));
            new_siblings.insert(position as usize, node);
            renumber(store, &mut old_siblings, self.node, job, now)?;
            renumber(store, &mut new_siblings, self.node, job, now)?;
            position
        };
        self.position = Some(position);
        Ok(())
    }
}

impl MoveJob {
    /// Deletes the node from its old file and detaches the local subtree
    /// from its old identities, ready for re-insertion into `file_id`.
    fn detach(&self, ctx: &JobContext<'_>, node: &Node, file_id: &str) -> Result<()> {
        let old = remote_id_of(node)?;
        ctx.call(|r, token| r.delete_node(token, &old.file_id, &old.item_id))?;
        let now = ctx.clock.now();
        ctx.db.transaction(|s| {
            for mut n in s.subtree(node.id)? {
                if let Some(remote) = n.remote_id() {
                    s.bury(&remote, now)?;
                }
                n.touch(now);
                n.item_id = None;
                n.file_id = Some(file_id.to_string());
                if !n.is_pending() {
                    n.pending = Some(ctx.job.id.clone());
                }
                s.put(&mut n)?;
            }
            Ok(())
        })?;
        tracing::debug!(id = %node.id, from = %old.file_id, to = file_id, "detached subtree for cross-file move");
        Ok(())
    }
}

impl RemoteStep for MoveJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let node = ctx.node(self.node)?;
        let parent_id = node
            .parent
            .ok_or_else(|| Error::InvalidRequest(format!("node {} has no parent", node.id)))?;
        let target = remote_id_of(&ctx.node(parent_id)?)?;

        match node.remote_id() {
            Some(current) if current.file_id == target.file_id => ctx.call(|r, token| {
                r.move_node(
                    token,
                    &current.file_id,
                    &current.item_id,
                    &target.item_id,
                    node.position,
                )
            }),
            Some(_) => {
                self.detach(ctx, &node, &target.file_id)?;
                insert_subtree(ctx, node.id)
            }
            // Detached by an earlier attempt
            None if self.cross_file && node.file_id.as_deref() == Some(target.file_id.as_str()) => {
                insert_subtree(ctx, node.id)
            }
            None => Err(Error::TargetNotYetIdentified(node.id)),
        }
    }
}

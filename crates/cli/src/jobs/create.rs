// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, LocalId, Node, RemoteId, Store};
use serde::{Deserialize, Serialize};

use super::{live_node, remote_id_of, JobContext, LocalStep, RemoteStep};
use crate::error::{Error, Result};
use crate::remote::NewNode;

/// Adds a node as the last child of `parent`.
///
/// Under the inbox the node goes through the remote inbox endpoint, which
/// also works while the local inbox is a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJob {
    pub parent: LocalId,
    pub content: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub checked: bool,
    /// The local node, recorded by the local step.
    #[serde(default)]
    pub node: Option<LocalId>,
}

impl CreateJob {
    pub fn new(parent: LocalId, content: impl Into<String>) -> Self {
        CreateJob {
            parent,
            content: content.into(),
            note: String::new(),
            checked: false,
            node: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

impl LocalStep for CreateJob {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        live_node(store, self.parent)?;
        Ok(())
    }

    fn apply_local(
        &mut self,
        store: &Store<'_>,
        job: &JobId,
        now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        let parent = store.node(self.parent)?;
        let position = store.child_count(parent.id)?;
        let mut node = Node::new(self.content.clone(), now)
            .with_note(self.note.clone())
            .with_parent(parent.id, position);
        node.checked = self.checked;
        node.file_id = parent.file_id.clone();
        node.pending = Some(job.clone());
        store.put(&mut node)?;
        self.node = Some(node.id);
        Ok(())
    }
}

impl RemoteStep for CreateJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let id = self
            .node
            .ok_or_else(|| Error::InvalidRequest("create job without local node".to_string()))?;
        let node = ctx.node(id)?;
        if node.remote_id().is_some() {
            return Ok(());
        }
        let parent_id = node
            .parent
            .ok_or_else(|| Error::InvalidRequest(format!("node {} has no parent", id)))?;
        let parent = ctx.node(parent_id)?;

        let remote = if parent.is_inbox {
            ctx.call(|r, token| r.add_to_inbox(token, &node.content, &node.note))?
        } else {
            let target = remote_id_of(&parent)?;
            let new = NewNode {
                parent_id: target.item_id.clone(),
                content: node.content.clone(),
                note: node.note.clone(),
                checked: node.checked,
                checkbox: node.checklist,
                index: None,
            };
            let ids = ctx.call(|r, token| {
                r.insert_nodes(token, &target.file_id, std::slice::from_ref(&new))
            })?;
            let item = ids.into_iter().next().ok_or_else(|| {
                Error::GenericBackendFailure("insert returned no node id".to_string())
            })?;
            RemoteId::new(target.file_id, item)
        };
        tracing::debug!(id = %id, remote = %remote, "created remote node");
        ctx.link(id, remote)
    }
}

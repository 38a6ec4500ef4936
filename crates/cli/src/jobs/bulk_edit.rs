// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, LocalId, Store};
use serde::{Deserialize, Serialize};

use super::{edit_of, live_node, remote_id_of, Fields, JobContext, LocalStep, RemoteStep};
use crate::error::{Error, Result};

/// One entry of a bulk edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFields {
    pub node: LocalId,
    pub fields: Fields,
}

/// Edits several nodes of one file with a single remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEditJob {
    pub edits: Vec<NodeFields>,
}

impl BulkEditJob {
    /// Applies the same fields to every node in `nodes`.
    pub fn uniform(nodes: &[LocalId], fields: Fields) -> Self {
        BulkEditJob {
            edits: nodes
                .iter()
                .map(|&node| NodeFields {
                    node,
                    fields: fields.clone(),
                })
                .collect(),
        }
    }
}

impl LocalStep for BulkEditJob {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        let mut file: Option<String> = None;
        for edit in &self.edits {
            let node = live_node(store, edit.node)?;
            let Some(node_file) = node.file_id else {
                return Err(ol_core::Error::InvalidInput(format!(
                    "node {} does not belong to a remote file yet",
                    edit.node
                )));
            };
            match &file {
                None => file = Some(node_file),
                Some(first) if *first != node_file => {
                    return Err(ol_core::Error::InvalidInput(
                        "bulk edit nodes must belong to one file".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }
        if file.is_none() {
            return Err(ol_core::Error::InvalidInput("nothing to edit".to_string()));
        }
        Ok(())
    }

    fn apply_local(
        &mut self,
        store: &Store<'_>,
        job: &JobId,
        now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        for edit in &self.edits {
            let mut node = store.node(edit.node)?;
            edit.fields.apply(&mut node);
            node.touch(now);
            node.pending = Some(job.clone());
            store.put(&mut node)?;
        }
        Ok(())
    }
}

impl RemoteStep for BulkEditJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let mut file_id: Option<String> = None;
        let mut edits = Vec::with_capacity(self.edits.len());
        for entry in &self.edits {
            let node = ctx.node(entry.node)?;
            let remote = remote_id_of(&node)?;
            let first = file_id.get_or_insert_with(|| remote.file_id.clone());
            if *first != remote.file_id {
                return Err(Error::InvalidRequest(
                    "bulk edit nodes span several files".to_string(),
                ));
            }
            edits.push(edit_of(&node, &remote));
        }
        let Some(file_id) = file_id else {
            return Ok(());
        };
        ctx.call(|r, token| r.edit_nodes(token, &file_id, &edits))
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, LocalId, Node, Store};
use serde::{Deserialize, Serialize};

use super::{edit_of, live_node, remote_id_of, JobContext, LocalStep, RemoteStep};
use crate::error::Result;

/// Field values to overwrite. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Fields {
    pub fn checked(checked: bool) -> Self {
        Fields {
            checked: Some(checked),
            ..Fields::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.note.is_none() && self.checked.is_none()
    }

    pub fn apply(&self, node: &mut Node) {
        if let Some(content) = &self.content {
            node.content.clone_from(content);
        }
        if let Some(note) = &self.note {
            node.note.clone_from(note);
        }
        if let Some(checked) = self.checked {
            node.checked = checked;
        }
    }
}

/// Overwrites content, note and checked state of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditJob {
    pub node: LocalId,
    pub fields: Fields,
}

impl LocalStep for EditJob {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        if self.fields.is_empty() {
            return Err(ol_core::Error::InvalidInput("nothing to edit".to_string()));
        }
        live_node(store, self.node)?;
        Ok(())
    }

    fn apply_local(
        &mut self,
        store: &Store<'_>,
        job: &JobId,
        now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        let mut node = store.node(self.node)?;
        self.fields.apply(&mut node);
        node.touch(now);
        node.pending = Some(job.clone());
        store.put(&mut node)?;
        Ok(())
    }
}

impl RemoteStep for EditJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let node = ctx.node(self.node)?;
        let remote = remote_id_of(&node)?;
        let edit = edit_of(&node, &remote);
        ctx.call(|r, token| r.edit_nodes(token, &remote.file_id, std::slice::from_ref(&edit)))
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, LocalId, Node, Store};
use serde::{Deserialize, Serialize};

use super::{insert_subtree, live_node, JobContext, LocalStep, RemoteStep};
use crate::error::{Error, Result};

/// Deep-copies a subtree as the last child of the source's parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateJob {
    pub source: LocalId,
    /// Root of the copy, recorded by the local step.
    #[serde(default)]
    pub copy: Option<LocalId>,
}

impl DuplicateJob {
    pub fn new(source: LocalId) -> Self {
        DuplicateJob { source, copy: None }
    }
}

fn copy_tree(
    store: &Store<'_>,
    original: &Node,
    parent: LocalId,
    position: u32,
    job: &JobId,
    now: DateTime<Utc>,
) -> ol_core::Result<LocalId> {
    let mut copy = Node::new(original.content.clone(), now)
        .with_note(original.note.clone())
        .with_parent(parent, position);
    copy.checked = original.checked;
    copy.checklist = original.checklist;
    copy.is_bookmark = original.is_bookmark;
    copy.file_id = original.file_id.clone();
    copy.pending = Some(job.clone());
    store.put(&mut copy)?;

    let children = store.children(Some(original.id))?;
    for (index, child) in children.iter().filter(|c| !c.hidden).enumerate() {
        let position = u32::try_from(index).unwrap_or(u32::MAX);
        copy_tree(store, child, copy.id, position, job, now)?;
    }
    Ok(copy.id)
}

impl LocalStep for DuplicateJob {
    fn validate(&self, store: &Store<'_>) -> ol_core::Result<()> {
        let source = live_node(store, self.source)?;
        if source.parent.is_none() {
            return Err(ol_core::Error::InvalidInput(
                "a document root cannot be duplicated".to_string(),
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
        let source = store.node(self.source)?;
        let parent = source.parent.ok_or_else(|| {
            ol_core::Error::InvalidInput("a document root cannot be duplicated".to_string())
        })?;
        let position = store.child_count(parent)?;
        self.copy = Some(copy_tree(store, &source, parent, position, job, now)?);
        Ok(())
    }
}

impl RemoteStep for DuplicateJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let copy = self
            .copy
            .ok_or_else(|| Error::InvalidRequest("duplicate job without local copy".to_string()))?;
        insert_subtree(ctx, copy)
    }
}

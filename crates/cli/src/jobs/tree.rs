// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Insertion of a local subtree into the remote service.
//!
//! The root goes first, then each parent's missing children as one batch in
//! position order, depth-first. Every assigned identity is persisted right
//! after its call, so a retried job skips what already exists remotely.

use ol_core::{LocalId, Node, RemoteId};

use super::{remote_id_of, JobContext};
use crate::error::{Error, Result};
use crate::remote::NewNode;

fn new_node(node: &Node, parent: &RemoteId) -> NewNode {
    NewNode {
        parent_id: parent.item_id.clone(),
        content: node.content.clone(),
        note: node.note.clone(),
        checked: node.checked,
        checkbox: node.checklist,
        index: Some(node.position),
    }
}

/// Inserts every unidentified node of the subtree rooted at `root`.
pub fn insert_subtree(ctx: &JobContext<'_>, root: LocalId) -> Result<()> {
    let node = ctx.node(root)?;
    if node.item_id.is_none() {
        let parent_id = node
            .parent
            .ok_or_else(|| Error::InvalidRequest(format!("node {} has no parent", root)))?;
        let target = remote_id_of(&ctx.node(parent_id)?)?;
        insert_batch(ctx, &target, &[node])?;
    }
    insert_children(ctx, root)
}

fn insert_children(ctx: &JobContext<'_>, parent_id: LocalId) -> Result<()> {
    let children: Vec<Node> = ctx
        .db
        .children(Some(parent_id))?
        .into_iter()
        .filter(|n| !n.hidden)
        .collect();
    if children.is_empty() {
        return Ok(());
    }

    let missing: Vec<Node> = children
        .iter()
        .filter(|n| n.item_id.is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        let target = remote_id_of(&ctx.node(parent_id)?)?;
        insert_batch(ctx, &target, &missing)?;
    }

    for child in &children {
        insert_children(ctx, child.id)?;
    }
    Ok(())
}

fn insert_batch(ctx: &JobContext<'_>, parent: &RemoteId, nodes: &[Node]) -> Result<()> {
    let batch: Vec<NewNode> = nodes.iter().map(|n| new_node(n, parent)).collect();
    let ids = ctx.call(|r, token| r.insert_nodes(token, &parent.file_id, &batch))?;
    let assigned = ids.len();

    let now = ctx.clock.now();
    ctx.db.transaction(|s| {
        for (node, item) in nodes.iter().zip(ids) {
            if let Some(mut stored) = s.get(node.id)? {
                stored.set_remote_id(RemoteId::new(parent.file_id.clone(), item));
                stored.touch(now);
                s.put(&mut stored)?;
            }
        }
        Ok(())
    })?;
    tracing::debug!(parent = %parent, count = assigned, "inserted remote nodes");

    if assigned < nodes.len() {
        return Err(Error::GenericBackendFailure(format!(
            "insert returned {} of {} node ids",
            assigned,
            nodes.len()
        )));
    }
    Ok(())
}

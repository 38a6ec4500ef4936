// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identity resolution between remote nodes and cached local nodes.
//!
//! The resolver indexes a slice of local nodes once and then answers, for
//! each remote node in turn, which local node (by index into that slice)
//! represents it:
//!
//! 1. exact match on the `(file_id, item_id)` remote identity;
//! 2. otherwise, exact content equality against a node that has no item id
//!    yet and lives in the same file (or in no file). Ties resolve in
//!    ascending local id order.
//!
//! Every local node matches at most once per pass. The previous inbox is
//! only eligible through its remote identity, never through its content.

use std::collections::HashMap;

use crate::node::{Node, RemoteId};
use crate::snapshot::RemoteNode;

/// Matches remote nodes to local nodes for one reconciliation pass.
#[derive(Debug)]
pub struct IdentityResolver {
    by_remote: HashMap<RemoteId, usize>,
    /// Content -> candidate indexes, ascending local id.
    by_content: HashMap<String, Vec<usize>>,
    file_ids: Vec<Option<String>>,
    matched: Vec<bool>,
    previous_inbox: Option<usize>,
}

impl IdentityResolver {
    /// Builds the indexes over `nodes`. Returned indexes refer to this slice.
    pub fn new(nodes: &[Node]) -> Self {
        let previous_inbox = nodes.iter().position(|n| n.is_inbox);

        let mut by_remote = HashMap::new();
        let mut by_content: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            if let Some(remote) = node.remote_id() {
                by_remote.entry(remote).or_insert(idx);
            } else if node.item_id.is_none() && Some(idx) != previous_inbox {
                by_content.entry(node.content.clone()).or_default().push(idx);
            }
        }
        for candidates in by_content.values_mut() {
            candidates.sort_by_key(|&idx| nodes[idx].id);
        }

        IdentityResolver {
            by_remote,
            by_content,
            file_ids: nodes.iter().map(|n| n.file_id.clone()).collect(),
            matched: vec![false; nodes.len()],
            previous_inbox,
        }
    }

    /// Resolves one remote node of `file_id`. Marks the returned node matched.
    pub fn resolve(&mut self, file_id: &str, remote: &RemoteNode) -> Option<usize> {
        let key = RemoteId::new(file_id, remote.id.clone());
        if let Some(&idx) = self.by_remote.get(&key) {
            if !self.matched[idx] {
                self.matched[idx] = true;
                return Some(idx);
            }
        }

        let candidates = self.by_content.get(&remote.content)?;
        let idx = candidates.iter().copied().find(|&idx| {
            !self.matched[idx]
                && self.file_ids[idx]
                    .as_deref()
                    .is_none_or(|file| file == file_id)
        })?;
        self.matched[idx] = true;
        Some(idx)
    }

    /// Returns true if the node at `idx` was matched in this pass.
    pub fn is_matched(&self, idx: usize) -> bool {
        self.matched.get(idx).copied().unwrap_or(false)
    }

    /// Index of the node flagged as inbox before this pass, if any.
    pub fn previous_inbox(&self) -> Option<usize> {
        self.previous_inbox
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Merge a remote snapshot into the local node cache.
//!
//! Reconciliation rules:
//! - Remote nodes are matched to local nodes by remote identity, falling
//!   back to content for nodes the remote service has not identified yet
//!   (see [`IdentityResolver`]).
//! - Matched nodes take the remote value unless they are held: a pending
//!   marker, or a local change newer than the start of the fetch. Held
//!   nodes keep their local value and only receive a missing remote
//!   identity.
//! - Structure comes from the remote children lists. Held children keep
//!   their local parent and position.
//! - Identities deleted locally after the fetch started are not recreated.
//! - Nodes of documents skipped as unchanged are left alone.
//! - Exactly one node carries the inbox flag afterwards.
//! - Other unmatched nodes are deleted unless held or the inbox.
//!
//! The whole merge runs in one store transaction, so a pending marker
//! observed here cannot be set or cleared concurrently.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::db::{Database, Store};
use crate::error::Result;
use crate::identity::IdentityResolver;
use crate::markers::Markers;
use crate::node::{LocalId, Node, RemoteId};
use crate::snapshot::{RemoteNode, RemoteSnapshot};

/// Summary of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Remote nodes with no local counterpart.
    pub created: usize,
    /// Local nodes overwritten with remote values.
    pub updated: usize,
    /// Matched nodes kept as-is because a job owns them or they changed
    /// during the fetch.
    pub preserved: usize,
    /// Local nodes removed.
    pub deleted: usize,
    /// The primary inbox after reconciliation.
    pub inbox: LocalId,
    /// Bookmarked nodes, excluding the inbox.
    pub bookmarks: Vec<LocalId>,
}

/// Reconciles `snapshot` into `db` in one transaction.
///
/// `fetched_at` is the time the snapshot fetch started. Local changes after
/// it are newer than anything the snapshot can show.
pub fn reconcile(
    db: &Database,
    snapshot: &RemoteSnapshot,
    markers: &Markers,
    fetched_at: DateTime<Utc>,
) -> Result<ReconcileReport> {
    let report = db.transaction(|store| reconcile_in(store, snapshot, markers, fetched_at))?;
    tracing::info!(
        created = report.created,
        updated = report.updated,
        preserved = report.preserved,
        deleted = report.deleted,
        unchanged_files = snapshot.unchanged.len(),
        "reconciled remote snapshot"
    );
    Ok(report)
}

/// Remote timestamps never read as local changes.
fn millis(ms: Option<i64>, fetched_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
        .map(|t| t.min(fetched_at))
}

fn is_held(node: &Node, fetched_at: DateTime<Utc>) -> bool {
    node.is_pending() || node.modified > fetched_at
}

fn apply_remote(
    node: &mut Node,
    remote: &RemoteNode,
    remote_id: RemoteId,
    fetched_at: DateTime<Utc>,
) {
    node.content.clone_from(&remote.content);
    node.note.clone_from(&remote.note);
    node.checked = remote.checked;
    node.checklist = remote.checkbox;
    node.hidden = false;
    node.set_remote_id(remote_id);
    if let Some(modified) = millis(remote.modified, fetched_at) {
        node.modified = modified;
    }
    node.is_inbox = false;
}

/// Reconciles inside an already open transaction.
pub fn reconcile_in(
    store: &Store<'_>,
    snapshot: &RemoteSnapshot,
    markers: &Markers,
    fetched_at: DateTime<Utc>,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    let mut nodes = store.all()?;
    let existing = nodes.len();
    let mut resolver = IdentityResolver::new(&nodes);
    let buried = store.buried_since(fetched_at)?;

    // Remote identity -> arena index, filled in snapshot order.
    let mut resolved: HashMap<RemoteId, usize> = HashMap::new();
    let mut order: Vec<usize> = Vec::with_capacity(snapshot.node_count());
    let mut remote_inbox: Option<usize> = None;

    for file in &snapshot.files {
        for remote in &file.nodes {
            let remote_id = RemoteId::new(file.id.clone(), remote.id.clone());
            let idx = match resolver.resolve(&file.id, remote) {
                Some(idx) if is_held(&nodes[idx], fetched_at) => {
                    let node = &mut nodes[idx];
                    if node.item_id.is_none() {
                        node.set_remote_id(remote_id.clone());
                    }
                    node.checklist = remote.checkbox;
                    node.is_bookmark = markers.is_bookmark(&node.content, &node.note);
                    tracing::debug!(id = %node.id, remote = %remote_id, "preserving held node");
                    report.preserved += 1;
                    idx
                }
                Some(idx) => {
                    let node = &mut nodes[idx];
                    apply_remote(node, remote, remote_id.clone(), fetched_at);
                    node.is_bookmark = markers.is_bookmark(&node.content, &node.note);
                    report.updated += 1;
                    idx
                }
                None if buried.contains(&remote_id) => {
                    tracing::debug!(remote = %remote_id, "skipping node deleted during fetch");
                    continue;
                }
                None => {
                    let created = millis(remote.created, fetched_at).unwrap_or(fetched_at);
                    let mut node = Node::new(remote.content.clone(), created)
                        .with_note(remote.note.clone())
                        .with_remote_id(remote_id.clone());
                    node.checked = remote.checked;
                    node.checklist = remote.checkbox;
                    node.modified = millis(remote.modified, fetched_at).unwrap_or(created);
                    node.is_bookmark = markers.is_bookmark(&node.content, &node.note);
                    // Rows get ids now so children can point at them.
                    store.put(&mut node)?;
                    nodes.push(node);
                    report.created += 1;
                    nodes.len() - 1
                }
            };

            if remote_inbox.is_none() && markers.is_inbox(&remote.content, &remote.note) {
                remote_inbox = Some(idx);
            }
            resolved.insert(remote_id, idx);
            order.push(idx);
        }
    }

    // Structure: children lists re-parent every node they name, and
    // unlisted nodes become roots.
    let mut listed: HashSet<usize> = HashSet::new();
    for file in &snapshot.files {
        for remote in &file.nodes {
            let Some(&parent_idx) = resolved.get(&RemoteId::new(file.id.clone(), remote.id.clone()))
            else {
                continue;
            };
            let parent_id = nodes[parent_idx].id;
            for (position, child) in remote.children.iter().enumerate() {
                let Some(&child_idx) = resolved.get(&RemoteId::new(file.id.clone(), child.clone()))
                else {
                    continue;
                };
                if !listed.insert(child_idx) || is_held(&nodes[child_idx], fetched_at) {
                    continue;
                }
                let node = &mut nodes[child_idx];
                node.parent = Some(parent_id);
                node.position = u32::try_from(position).unwrap_or(u32::MAX);
            }
        }
    }
    for &idx in &order {
        if !listed.contains(&idx) && !is_held(&nodes[idx], fetched_at) {
            nodes[idx].parent = None;
        }
    }

    // Canonical inbox
    let matched: HashSet<usize> = order.iter().copied().collect();
    let inbox_idx = match remote_inbox {
        Some(idx) => idx,
        None => match resolver.previous_inbox() {
            Some(idx) if !matched.contains(&idx) && !nodes[idx].is_pending() => idx,
            _ => {
                let mut inbox = Node::new(markers.default_inbox_name.clone(), fetched_at);
                inbox.is_inbox = true;
                inbox.is_bookmark = true;
                store.put(&mut inbox)?;
                tracing::debug!(id = %inbox.id, "synthesized default inbox");
                nodes.push(inbox);
                nodes.len() - 1
            }
        },
    };
    for (idx, node) in nodes.iter_mut().enumerate() {
        node.is_inbox = idx == inbox_idx;
    }
    nodes[inbox_idx].is_bookmark = true;

    // Commit
    let mut kept = Vec::with_capacity(nodes.len());
    let mut doomed = Vec::new();
    for (idx, node) in nodes.into_iter().enumerate() {
        let untouched_file = node
            .file_id
            .as_deref()
            .is_some_and(|file| snapshot.is_unchanged(file));
        let keep = idx >= existing
            || resolver.is_matched(idx)
            || is_held(&node, fetched_at)
            || untouched_file
            || idx == inbox_idx;
        if keep {
            kept.push(node);
        } else {
            tracing::debug!(id = %node.id, "deleting node missing from remote");
            doomed.push(node.id);
        }
    }
    renumber_roots(&mut kept, &snapshot.document_order());
    for node in &mut kept {
        store.put(node)?;
    }
    report.deleted = store.remove(&doomed)?;

    if !snapshot.catalog.is_empty() {
        store.replace_files(&snapshot.catalog)?;
    }
    store.prune_tombstones(fetched_at)?;

    report.inbox = inbox_of(&kept);
    report.bookmarks = store
        .bookmarks()?
        .into_iter()
        .filter(|n| !n.is_inbox)
        .map(|n| n.id)
        .collect();

    Ok(report)
}

fn inbox_of(nodes: &[Node]) -> LocalId {
    nodes
        .iter()
        .find(|n| n.is_inbox)
        .map(|n| n.id)
        .unwrap_or_default()
}

/// Roots get dense positions in document order; nodes of unknown files
/// (the local inbox) come last.
fn renumber_roots(nodes: &mut [Node], documents: &[&str]) {
    let rank = |node: &Node| {
        node.file_id
            .as_deref()
            .and_then(|file| documents.iter().position(|d| *d == file))
            .unwrap_or(usize::MAX)
    };
    let mut roots: Vec<usize> = (0..nodes.len())
        .filter(|&i| nodes[i].parent.is_none())
        .collect();
    roots.sort_by_key(|&i| (rank(&nodes[i]), nodes[i].position, nodes[i].id));
    for (position, idx) in roots.into_iter().enumerate() {
        nodes[idx].position = u32::try_from(position).unwrap_or(u32::MAX);
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;

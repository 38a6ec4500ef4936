// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outline node types.
//!
//! A [`Node`] is one element of the locally cached outline. Structure is
//! stored arena-style: every node records its parent's [`LocalId`] and its
//! position among siblings, and children are found by querying the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::job::JobId;

/// Store-assigned identifier of a node.
///
/// `LocalId::UNSAVED` (also the default) marks a node that has not been
/// written yet; the store assigns a fresh id on first `put`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocalId(pub i64);

impl LocalId {
    /// Id carried by nodes that were never written to the store.
    pub const UNSAVED: LocalId = LocalId(0);

    /// Returns true once the store has assigned this id.
    pub fn is_saved(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(LocalId)
            .ok_or_else(|| Error::InvalidInput(format!("invalid node id: '{s}'")))
    }
}

/// The `(file, item)` pair identifying a node on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId {
    pub file_id: String,
    pub item_id: String,
}

impl RemoteId {
    pub fn new(file_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        RemoteId {
            file_id: file_id.into(),
            item_id: item_id.into(),
        }
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.file_id, self.item_id)
    }
}

/// A locally cached outline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: LocalId,
    /// Remote file this node lives in. Set from the parent for local-only nodes.
    pub file_id: Option<String>,
    /// Remote item id, absent until the remote service has assigned one.
    pub item_id: Option<String>,
    pub parent: Option<LocalId>,
    /// Position among the parent's children, dense from zero.
    pub position: u32,
    pub content: String,
    pub note: String,
    pub checked: bool,
    /// Soft-deleted, awaiting remote confirmation.
    pub hidden: bool,
    /// Rendered with a checkbox.
    pub checklist: bool,
    pub is_inbox: bool,
    pub is_bookmark: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// The in-flight job that owns this node's authoritative value.
    pub pending: Option<JobId>,
}

impl Node {
    /// Creates an unsaved, local-only node.
    pub fn new(content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Node {
            id: LocalId::UNSAVED,
            file_id: None,
            item_id: None,
            parent: None,
            position: 0,
            content: content.into(),
            note: String::new(),
            checked: false,
            hidden: false,
            checklist: false,
            is_inbox: false,
            is_bookmark: false,
            created: now,
            modified: now,
            pending: None,
        }
    }

    /// Builder: attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Builder: attach a remote identity.
    pub fn with_remote_id(mut self, remote: RemoteId) -> Self {
        self.set_remote_id(remote);
        self
    }

    /// Builder: place under a parent at a position.
    pub fn with_parent(mut self, parent: LocalId, position: u32) -> Self {
        self.parent = Some(parent);
        self.position = position;
        self
    }

    /// Returns the remote identity once both halves are known.
    pub fn remote_id(&self) -> Option<RemoteId> {
        match (&self.file_id, &self.item_id) {
            (Some(file), Some(item)) => Some(RemoteId::new(file.clone(), item.clone())),
            _ => None,
        }
    }

    pub fn set_remote_id(&mut self, remote: RemoteId) {
        self.file_id = Some(remote.file_id);
        self.item_id = Some(remote.item_id);
    }

    /// Returns true if an in-flight job owns this node.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns true if the given job owns this node.
    pub fn is_pending_for(&self, job: &JobId) -> bool {
        self.pending.as_ref() == Some(job)
    }

    /// Clears the pending marker if it belongs to `job`. Returns whether it did.
    pub fn release(&mut self, job: &JobId) -> bool {
        if self.is_pending_for(job) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Updates the modification timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified = now;
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;

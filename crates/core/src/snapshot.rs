// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote snapshot types.
//!
//! A snapshot is the remote state at one point in time: the file catalog
//! and every editable document that changed since it was last read, each
//! with its flat node list. Documents whose version did not change are only
//! named, and their cached nodes are left alone. Parent pointers reported
//! by the remote API are not trusted; structure is derived from each node's
//! children list.

use serde::{Deserialize, Serialize};

/// One node as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub checked: bool,
    /// Rendered with a checkbox.
    #[serde(default)]
    pub checkbox: bool,
    /// Creation time in milliseconds since Unix epoch.
    #[serde(default)]
    pub created: Option<i64>,
    /// Modification time in milliseconds since Unix epoch.
    #[serde(default)]
    pub modified: Option<i64>,
    /// Ordered child item ids.
    #[serde(default)]
    pub children: Vec<String>,
}

impl RemoteNode {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        RemoteNode {
            id: id.into(),
            content: content.into(),
            note: String::new(),
            checked: false,
            checkbox: false,
            created: None,
            modified: None,
            children: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn checkbox(mut self, checkbox: bool) -> Self {
        self.checkbox = checkbox;
        self
    }
}

/// One remote document with its nodes in remote order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub nodes: Vec<RemoteNode>,
}

impl RemoteFile {
    pub fn new(id: impl Into<String>, nodes: Vec<RemoteNode>) -> Self {
        RemoteFile {
            id: id.into(),
            title: String::new(),
            nodes,
        }
    }
}

/// One entry of the remote file catalog: a document or a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub title: String,
    pub is_folder: bool,
    /// Enclosing folder, `None` at the top level.
    pub parent: Option<String>,
    /// Content version of a synced document.
    pub version: Option<u64>,
}

impl FileEntry {
    pub fn document(id: impl Into<String>, title: impl Into<String>, version: Option<u64>) -> Self {
        FileEntry {
            id: id.into(),
            title: title.into(),
            is_folder: false,
            parent: None,
            version,
        }
    }

    pub fn folder(id: impl Into<String>, title: impl Into<String>) -> Self {
        FileEntry {
            id: id.into(),
            title: title.into(),
            is_folder: true,
            parent: None,
            version: None,
        }
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.parent = Some(folder.into());
        self
    }
}

/// The remote forest as fetched in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    /// Documents read in this pass.
    pub files: Vec<RemoteFile>,
    /// Documents unchanged since their cached version; not read.
    #[serde(default)]
    pub unchanged: Vec<String>,
    /// Every listed file in catalog order. Empty when the catalog is not tracked.
    #[serde(default)]
    pub catalog: Vec<FileEntry>,
}

impl RemoteSnapshot {
    /// A snapshot of fully read documents without a catalog.
    pub fn new(files: Vec<RemoteFile>) -> Self {
        RemoteSnapshot {
            files,
            unchanged: Vec::new(),
            catalog: Vec::new(),
        }
    }

    /// Builder: attach the catalog and the documents that were not re-read.
    pub fn with_catalog(mut self, catalog: Vec<FileEntry>, unchanged: Vec<String>) -> Self {
        self.catalog = catalog;
        self.unchanged = unchanged;
        self
    }

    /// Returns true if `file_id` was skipped as unchanged.
    pub fn is_unchanged(&self, file_id: &str) -> bool {
        self.unchanged.iter().any(|id| id == file_id)
    }

    /// Documents in display order: catalog order when known, else read order.
    pub fn document_order(&self) -> Vec<&str> {
        if self.catalog.is_empty() {
            self.files.iter().map(|f| f.id.as_str()).collect()
        } else {
            self.catalog
                .iter()
                .filter(|e| !e.is_folder)
                .map(|e| e.id.as_str())
                .collect()
        }
    }

    /// Total number of remote nodes across files.
    pub fn node_count(&self) -> usize {
        self.files.iter().map(|f| f.nodes.len()).sum()
    }
}

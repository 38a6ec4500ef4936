// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox and bookmark markers.
//!
//! Designated nodes are recognized by tags in their content or note. A node
//! tagged with the inbox tag is the primary inbox and also counts as a
//! bookmark; any of the bookmark tags makes a node a bookmark.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Tags start at a word boundary and must not end in a digit run, so
// "#2024" or "issue #12" are not tags.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(?:^|\s)([#@][^\s]*[^\s\d]+)") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });

/// Extracts the lowercased tags of a text.
pub fn tags(text: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Tag conventions for designated nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Tag marking the primary inbox.
    pub inbox_tag: String,
    /// Tags marking bookmarks.
    pub bookmark_tags: Vec<String>,
    /// Content of the inbox node synthesized when no remote inbox exists.
    pub default_inbox_name: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            inbox_tag: "#inbox".to_string(),
            bookmark_tags: vec!["#bookmark".to_string(), "#quickdynalist".to_string()],
            default_inbox_name: "Inbox".to_string(),
        }
    }
}

impl Markers {
    /// Returns true if the node is marked as the primary inbox.
    pub fn is_inbox(&self, content: &str, note: &str) -> bool {
        let inbox = self.inbox_tag.to_lowercase();
        tags(content).iter().chain(tags(note).iter()).any(|t| *t == inbox)
    }

    /// Returns true if the node is marked as a bookmark (the inbox tag included).
    pub fn is_bookmark(&self, content: &str, note: &str) -> bool {
        let wanted: Vec<String> = self
            .bookmark_tags
            .iter()
            .chain(std::iter::once(&self.inbox_tag))
            .map(|t| t.to_lowercase())
            .collect();
        tags(content)
            .iter()
            .chain(tags(note).iter())
            .any(|t| wanted.contains(t))
    }
}

#[cfg(test)]
#[path = "markers_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ol_core::{Database, FileEntry, LocalId, Node};
use std::collections::HashMap;
use std::fmt::Write;

use crate::config::Config;
use crate::error::Result;

use super::open_queue;

pub fn run(config: &Config, id: Option<LocalId>, bookmarks: bool) -> Result<()> {
    let queue = open_queue(config)?;
    if bookmarks {
        print!("{}", render_bookmarks(queue.db())?);
    } else {
        print!("{}", render(queue.db(), id)?);
    }
    Ok(())
}

/// Folder path and title of a document, e.g. `Household/Shopping`.
fn document_path(files: &HashMap<&str, &FileEntry>, file_id: &str) -> Option<String> {
    let mut entry = *files.get(file_id)?;
    let mut parts = vec![entry.title.as_str()];
    // Folder nesting is bounded by the catalog size
    for _ in 0..files.len() {
        let Some(parent) = entry.parent.as_deref().and_then(|p| files.get(p)) else {
            break;
        };
        entry = parent;
        parts.push(entry.title.as_str());
    }
    parts.reverse();
    Some(parts.join("/"))
}

/// Renders the outline below `root`, or every document when `root` is `None`.
///
/// Documents known to the file catalog get a `[folder/title]` header.
pub(crate) fn render(db: &Database, root: Option<LocalId>) -> Result<String> {
    let mut out = String::new();
    match root {
        Some(id) => {
            let node = db.node(id)?;
            render_node(db, &node, 0, &mut out)?;
        }
        None => {
            let catalog = db.files()?;
            let files: HashMap<&str, &FileEntry> =
                catalog.iter().map(|f| (f.id.as_str(), f)).collect();
            for node in db.children(None)? {
                let path = node
                    .file_id
                    .as_deref()
                    .and_then(|file| document_path(&files, file));
                if let Some(path) = path {
                    let _ = writeln!(out, "[{}]", path);
                }
                render_node(db, &node, 0, &mut out)?;
            }
        }
    }
    Ok(out)
}

/// Lists the inbox first, then every bookmarked node.
pub(crate) fn render_bookmarks(db: &Database) -> Result<String> {
    let mut out = String::new();
    for node in db.read(|s| s.bookmarks())? {
        if !node.hidden {
            let _ = writeln!(out, "{}", format_line(&node));
        }
    }
    Ok(out)
}

fn render_node(db: &Database, node: &Node, depth: usize, out: &mut String) -> Result<()> {
    if node.hidden {
        return Ok(());
    }
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), format_line(node));
    for child in db.children(Some(node.id))? {
        render_node(db, &child, depth + 1, out)?;
    }
    Ok(())
}

/// One outline row: `[x] content  #id`, with markers for the inbox and
/// for changes not yet confirmed by the remote service.
pub(crate) fn format_line(node: &Node) -> String {
    let mut line = String::new();
    if node.checked {
        line.push_str("[x] ");
    }
    line.push_str(&node.content);
    let _ = write!(line, "  #{}", node.id);
    if node.is_inbox {
        line.push_str(" (inbox)");
    }
    if node.is_pending() {
        line.push_str(" *");
    }
    line
}

#[cfg(test)]
#[path = "ls_tests.rs"]
mod tests;

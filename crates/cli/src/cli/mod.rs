// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};
use ol_core::{JobId, LocalId};
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn node_id(s: &str) -> Result<LocalId, String> {
    s.parse().map_err(|e: ol_core::Error| e.to_string())
}

fn job_id(s: &str) -> Result<JobId, String> {
    non_empty_string(s).map(|s| JobId::from(s.trim()))
}

#[derive(Parser)]
#[command(name = "ol")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An offline-first client for a remote outliner")]
#[command(
    long_about = "An offline-first client for a remote outliner.\n\n\
    Edits apply to the local copy at once and are queued for the remote service.\n\
    Run 'ol run' to flush the queue, or 'ol run --watch' to keep it flowing."
)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify an API token and store it
    #[command(after_help = "\
Examples:
  ol login 4f2a...          Store the token once the service accepts it")]
    Login {
        #[arg(value_parser = non_empty_string)]
        token: String,
    },

    /// Fetch every document and merge it into the local copy
    Sync,

    /// Add a node, to the inbox unless a parent is given
    #[command(after_help = "\
Examples:
  ol add \"Call the bank\"             Capture into the inbox
  ol add \"Milk\" --parent 12          Append under node 12
  ol add \"Read\" --note \"chapter 3\"   Add with a note")]
    Add {
        #[arg(value_parser = non_empty_string)]
        text: String,

        /// Note attached to the node
        #[arg(long)]
        note: Option<String>,

        /// Parent node id (default: the inbox)
        #[arg(long, value_parser = node_id)]
        parent: Option<LocalId>,
    },

    /// Change the content, note or checked state of a node
    Edit {
        #[arg(value_parser = node_id)]
        id: LocalId,

        /// New content
        #[arg(long, value_parser = non_empty_string)]
        content: Option<String>,

        /// New note (empty clears it)
        #[arg(long)]
        note: Option<String>,

        /// Mark the node checked
        #[arg(long, conflicts_with = "unchecked")]
        checked: bool,

        /// Mark the node unchecked
        #[arg(long)]
        unchecked: bool,
    },

    /// Move a node under a new parent
    #[command(after_help = "\
Examples:
  ol mv 14 3                 Append node 14 to node 3's children
  ol mv 14 3 --position 0    Make node 14 the first child of node 3")]
    Mv {
        #[arg(value_parser = node_id)]
        id: LocalId,

        #[arg(value_parser = node_id)]
        parent: LocalId,

        /// Index among the new siblings (default: last)
        #[arg(long)]
        position: Option<u32>,
    },

    /// Delete a node and its subtree
    Rm {
        #[arg(value_parser = node_id)]
        id: LocalId,
    },

    /// Copy a node and its subtree next to it
    Dup {
        #[arg(value_parser = node_id)]
        id: LocalId,
    },

    /// Check one or more nodes of the same document
    Check {
        #[arg(required = true, value_parser = node_id)]
        ids: Vec<LocalId>,
    },

    /// Uncheck one or more nodes of the same document
    Uncheck {
        #[arg(required = true, value_parser = node_id)]
        ids: Vec<LocalId>,
    },

    /// Show the local outline, or the subtree of a node
    Ls {
        #[arg(value_parser = node_id, conflicts_with = "bookmarks")]
        id: Option<LocalId>,

        /// List the inbox and bookmarked nodes only
        #[arg(long, short)]
        bookmarks: bool,
    },

    /// List queued jobs
    Jobs,

    /// Cancel a job and undo its local change
    Cancel {
        #[arg(value_parser = job_id)]
        job: JobId,
    },

    /// Send queued jobs to the remote service
    #[command(after_help = "\
Examples:
  ol run            Run every due job, then exit
  ol run --watch    Keep running jobs as they become due, until Ctrl-C")]
    Run {
        /// Keep workers alive until interrupted
        #[arg(long)]
        watch: bool,
    },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

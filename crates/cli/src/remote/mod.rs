// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote outliner API.
//!
//! Provides a trait-based client layer that enables:
//! - A blocking HTTP client for production ([`HttpRemote`])
//! - Scripted fakes for unit testing
//!
//! Every call returns a [`RemoteResponse`] carrying the service's response
//! code; only failures to reach the service at all surface as
//! [`Error::Transport`]. [`RemoteResponse::into_result`] translates the
//! codes into the error taxonomy.

mod http;
mod rate_limit;

pub use http::HttpRemote;
pub use rate_limit::{RateLimiter, Sleeper, ThreadSleeper};

use ol_core::{RemoteId, RemoteNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Response code reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    InvalidToken,
    /// The request can never succeed (`Unauthorized`, `NotFound`, `NodeNotFound`).
    RequestUnfulfillable,
    InboxNotConfigured,
    RateLimitExceeded,
    /// Any other code.
    NotOk(String),
}

impl ResponseCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "Ok" => ResponseCode::Ok,
            "InvalidToken" => ResponseCode::InvalidToken,
            "Unauthorized" | "NotFound" | "NodeNotFound" => ResponseCode::RequestUnfulfillable,
            "NoInbox" => ResponseCode::InboxNotConfigured,
            "TooManyRequests" => ResponseCode::RateLimitExceeded,
            other => ResponseCode::NotOk(other.to_string()),
        }
    }
}

/// A response of the remote service: its code and, on success, a body.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse<T> {
    pub code: ResponseCode,
    pub message: Option<String>,
    pub body: Option<T>,
}

impl<T> RemoteResponse<T> {
    pub fn ok(body: T) -> Self {
        RemoteResponse {
            code: ResponseCode::Ok,
            message: None,
            body: Some(body),
        }
    }

    pub fn failure(code: ResponseCode, message: impl Into<String>) -> Self {
        RemoteResponse {
            code,
            message: Some(message.into()),
            body: None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.code == ResponseCode::RateLimitExceeded
    }

    fn describe(&self) -> String {
        let code = match &self.code {
            ResponseCode::Ok => "Ok",
            ResponseCode::InvalidToken => "InvalidToken",
            ResponseCode::RequestUnfulfillable => "RequestUnfulfillable",
            ResponseCode::InboxNotConfigured => "NoInbox",
            ResponseCode::RateLimitExceeded => "TooManyRequests",
            ResponseCode::NotOk(code) => code,
        };
        format!(
            "Code: {}; Message: {}",
            code,
            self.message.as_deref().unwrap_or("")
        )
    }

    /// Translates the response code into the error taxonomy.
    pub fn into_result(self) -> Result<T> {
        match self.code {
            ResponseCode::Ok => match self.body {
                Some(body) => Ok(body),
                None => Err(Error::GenericBackendFailure(
                    "response without body".to_string(),
                )),
            },
            ResponseCode::InvalidToken => Err(Error::AuthenticationRejected),
            ResponseCode::InboxNotConfigured => Err(Error::DependentResourceMissing),
            ResponseCode::RequestUnfulfillable => Err(Error::InvalidRequest(self.describe())),
            ResponseCode::RateLimitExceeded | ResponseCode::NotOk(_) => {
                Err(Error::GenericBackendFailure(self.describe()))
            }
        }
    }
}

/// A remote file as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `document` or `folder`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub permission: u8,
    /// Ids of the files inside a folder, in display order.
    #[serde(default)]
    pub children: Vec<String>,
}

impl FileInfo {
    pub fn document(id: impl Into<String>, title: impl Into<String>) -> Self {
        FileInfo {
            id: id.into(),
            title: title.into(),
            kind: "document".to_string(),
            permission: 4,
            children: Vec::new(),
        }
    }

    pub fn folder<I, S>(id: impl Into<String>, title: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FileInfo {
            id: id.into(),
            title: title.into(),
            kind: "folder".to_string(),
            permission: 4,
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == "folder"
    }

    /// Documents the token may edit are the only ones synced.
    pub fn is_editable_document(&self) -> bool {
        self.kind == "document" && self.permission >= 2
    }
}

/// A node to insert under an existing remote parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    pub parent_id: String,
    pub content: String,
    pub note: String,
    pub checked: bool,
    pub checkbox: bool,
    /// Index among the parent's children; `None` appends.
    pub index: Option<u32>,
}

/// New values for an existing remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEdit {
    pub node_id: String,
    pub content: String,
    pub note: String,
    pub checked: bool,
    pub checkbox: bool,
}

/// Blocking client of the remote outliner service.
///
/// Implementations return `Err` only for [`Error::Transport`]; every answer
/// of the service, failures included, is a [`RemoteResponse`].
pub trait Remote: Send + Sync {
    /// Lists all files visible to the token.
    fn list_files(&self, token: &str) -> Result<RemoteResponse<Vec<FileInfo>>>;

    /// Current content versions of the given documents, keyed by file id.
    fn check_versions(
        &self,
        token: &str,
        file_ids: &[String],
    ) -> Result<RemoteResponse<HashMap<String, u64>>>;

    /// Reads the flat node list of one document.
    fn read_document(&self, token: &str, file_id: &str) -> Result<RemoteResponse<Vec<RemoteNode>>>;

    /// Appends a node to the account's configured inbox.
    fn add_to_inbox(&self, token: &str, content: &str, note: &str)
        -> Result<RemoteResponse<RemoteId>>;

    /// Inserts nodes into a document. Returns the new item ids in order.
    fn insert_nodes(
        &self,
        token: &str,
        file_id: &str,
        nodes: &[NewNode],
    ) -> Result<RemoteResponse<Vec<String>>>;

    /// Overwrites content, note and checked state of nodes in one document.
    fn edit_nodes(&self, token: &str, file_id: &str, edits: &[NodeEdit])
        -> Result<RemoteResponse<()>>;

    /// Moves a node under a new parent within one document.
    fn move_node(
        &self,
        token: &str,
        file_id: &str,
        node_id: &str,
        parent_id: &str,
        index: u32,
    ) -> Result<RemoteResponse<()>>;

    /// Deletes a node and its descendants.
    fn delete_node(&self, token: &str, file_id: &str, node_id: &str) -> Result<RemoteResponse<()>>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

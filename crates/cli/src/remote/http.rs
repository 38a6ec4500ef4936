// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP client of the outliner API.
//!
//! Every endpoint is a JSON `POST` carrying the token in its body. Responses
//! share an envelope with `_code` and `_msg`; the endpoint-specific fields
//! sit next to them.

use ol_core::{RemoteId, RemoteNode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use super::{FileInfo, NewNode, NodeEdit, Remote, RemoteResponse, ResponseCode};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "_code", default)]
    code: Option<String>,
    #[serde(rename = "_msg", default)]
    message: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Default, Deserialize)]
struct FilesBody {
    #[serde(default)]
    files: Vec<FileInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct VersionsBody {
    #[serde(default)]
    versions: HashMap<String, u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentBody {
    #[serde(default)]
    nodes: Vec<RemoteNode>,
}

#[derive(Debug, Default, Deserialize)]
struct InboxBody {
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    node_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InsertBody {
    #[serde(default)]
    new_node_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EmptyBody {}

/// Parses a response envelope, applying `extract` to the body of `Ok` responses.
fn parse_envelope<B: DeserializeOwned, T>(
    json: &str,
    extract: impl FnOnce(B) -> Option<T>,
) -> Result<RemoteResponse<T>> {
    let envelope: Envelope<B> = serde_json::from_str(json)?;
    let code = ResponseCode::from_code(envelope.code.as_deref().unwrap_or(""));
    let body = match code {
        ResponseCode::Ok => extract(envelope.body),
        _ => None,
    };
    Ok(RemoteResponse {
        code,
        message: envelope.message,
        body,
    })
}

fn insert_change(node: &NewNode) -> Value {
    json!({
        "action": "insert",
        "parent_id": node.parent_id,
        "content": node.content,
        "note": node.note,
        "checked": node.checked,
        "checkbox": node.checkbox,
        "index": node.index.map_or(-1, i64::from),
    })
}

fn edit_change(edit: &NodeEdit) -> Value {
    json!({
        "action": "edit",
        "node_id": edit.node_id,
        "content": edit.content,
        "note": edit.note,
        "checked": edit.checked,
        "checkbox": edit.checkbox,
    })
}

fn edit_request(token: &str, file_id: &str, changes: Vec<Value>) -> Value {
    json!({ "token": token, "file_id": file_id, "changes": changes })
}

/// Remote client speaking HTTP via `ureq`.
pub struct HttpRemote {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        HttpRemote {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Posts `body` to `path` and returns the raw response text.
    fn post(&self, path: &str, body: Value) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "remote request");
        match self.agent.post(&url).send_json(body) {
            Ok(response) => response.into_string().map_err(|e| Error::Transport(e.to_string())),
            // The service reports failures in the envelope; a bare HTTP
            // status is turned into an envelope of its own.
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                if serde_json::from_str::<Value>(&text).is_ok() {
                    Ok(text)
                } else {
                    let code = if status == 429 { "TooManyRequests" } else { "HttpError" };
                    Ok(json!({ "_code": code, "_msg": format!("HTTP {status}") }).to_string())
                }
            }
            Err(ureq::Error::Transport(e)) => Err(Error::Transport(e.to_string())),
        }
    }

    fn call<B: DeserializeOwned, T>(
        &self,
        path: &str,
        body: Value,
        extract: impl FnOnce(B) -> Option<T>,
    ) -> Result<RemoteResponse<T>> {
        let text = self.post(path, body)?;
        // Garbage from the service is a backend failure, not a transport one
        match parse_envelope(&text, extract) {
            Ok(response) => Ok(response),
            Err(e) => Ok(RemoteResponse::failure(
                ResponseCode::NotOk("MalformedResponse".to_string()),
                e.to_string(),
            )),
        }
    }
}

impl Remote for HttpRemote {
    fn list_files(&self, token: &str) -> Result<RemoteResponse<Vec<FileInfo>>> {
        self.call("file/list", json!({ "token": token }), |b: FilesBody| {
            Some(b.files)
        })
    }

    fn check_versions(
        &self,
        token: &str,
        file_ids: &[String],
    ) -> Result<RemoteResponse<HashMap<String, u64>>> {
        self.call(
            "doc/check_for_updates",
            json!({ "token": token, "file_ids": file_ids }),
            |b: VersionsBody| Some(b.versions),
        )
    }

    fn read_document(&self, token: &str, file_id: &str) -> Result<RemoteResponse<Vec<RemoteNode>>> {
        self.call(
            "doc/read",
            json!({ "token": token, "file_id": file_id }),
            |b: DocumentBody| Some(b.nodes),
        )
    }

    fn add_to_inbox(
        &self,
        token: &str,
        content: &str,
        note: &str,
    ) -> Result<RemoteResponse<RemoteId>> {
        self.call(
            "inbox/add",
            json!({ "token": token, "content": content, "note": note }),
            |b: InboxBody| match (b.file_id, b.node_id) {
                (Some(file), Some(node)) => Some(RemoteId::new(file, node)),
                _ => None,
            },
        )
    }

    fn insert_nodes(
        &self,
        token: &str,
        file_id: &str,
        nodes: &[NewNode],
    ) -> Result<RemoteResponse<Vec<String>>> {
        let changes = nodes.iter().map(insert_change).collect();
        self.call(
            "doc/edit",
            edit_request(token, file_id, changes),
            |b: InsertBody| Some(b.new_node_ids),
        )
    }

    fn edit_nodes(
        &self,
        token: &str,
        file_id: &str,
        edits: &[NodeEdit],
    ) -> Result<RemoteResponse<()>> {
        let changes = edits.iter().map(edit_change).collect();
        self.call(
            "doc/edit",
            edit_request(token, file_id, changes),
            |_: EmptyBody| Some(()),
        )
    }

    fn move_node(
        &self,
        token: &str,
        file_id: &str,
        node_id: &str,
        parent_id: &str,
        index: u32,
    ) -> Result<RemoteResponse<()>> {
        let change = json!({
            "action": "move",
            "node_id": node_id,
            "parent_id": parent_id,
            "index": index,
        });
        self.call(
            "doc/edit",
            edit_request(token, file_id, vec![change]),
            |_: EmptyBody| Some(()),
        )
    }

    fn delete_node(&self, token: &str, file_id: &str, node_id: &str) -> Result<RemoteResponse<()>> {
        let change = json!({ "action": "delete", "node_id": node_id });
        self.call(
            "doc/edit",
            edit_request(token, file_id, vec![change]),
            |_: EmptyBody| Some(()),
        )
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fakes and fixtures for unit tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use chrono::{DateTime, TimeZone, Utc};
use ol_core::db::META_TOKEN;
use ol_core::{
    reconcile, ClockSource, Database, JobGroup, JobId, ManualClock, Markers, Node, RemoteId,
    RemoteFile, RemoteNode, RemoteSnapshot,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::RecordingSink;
use crate::jobs::JobPayload;
use crate::queue::{JobQueue, Step};
use crate::remote::{
    FileInfo, NewNode, NodeEdit, Remote, RemoteResponse, ResponseCode, Sleeper,
};

pub const INBOX_FILE: &str = "inbox-file";

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListFiles,
    CheckVersions(Vec<String>),
    ReadDocument(String),
    AddToInbox(String),
    InsertNodes { file_id: String, nodes: Vec<NewNode> },
    EditNodes { file_id: String, edits: Vec<NodeEdit> },
    MoveNode { file_id: String, node_id: String, parent_id: String, index: u32 },
    DeleteNode { file_id: String, node_id: String },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    script: VecDeque<Option<ResponseCode>>,
    offline: bool,
    next_id: u32,
    documents: Vec<(FileInfo, Vec<RemoteNode>)>,
    versions: HashMap<String, u64>,
    valid_token: Option<String>,
}

/// Scripted remote service. Accepts any token unless one is required.
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_document(self, file_id: &str, nodes: Vec<RemoteNode>) -> Self {
        self.with_file(FileInfo::document(file_id, file_id), nodes)
    }

    pub fn with_file(self, info: FileInfo, nodes: Vec<RemoteNode>) -> Self {
        {
            let mut state = self.lock();
            state.bump(&info.id);
            state.documents.push((info, nodes));
        }
        self
    }

    /// Replaces a document's nodes, as an edit made elsewhere would.
    pub fn set_document(&self, file_id: &str, nodes: Vec<RemoteNode>) {
        let mut state = self.lock();
        state.bump(file_id);
        if let Some(doc) = state.documents.iter_mut().find(|(info, _)| info.id == file_id) {
            doc.1 = nodes;
        }
    }

    pub fn remove_document(&self, file_id: &str) {
        let mut state = self.lock();
        state.documents.retain(|(info, _)| info.id != file_id);
        state.versions.remove(file_id);
    }

    /// Ids of the documents read so far.
    pub fn reads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ReadDocument(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn require_token(&self, token: &str) {
        self.lock().valid_token = Some(token.to_string());
    }

    /// The next unscripted call answers with `code` instead of succeeding.
    pub fn fail_next(&self, code: ResponseCode) {
        self.lock().script.push_back(Some(code));
    }

    /// The next unscripted call succeeds; lets a later call fail.
    pub fn succeed_next(&self) {
        self.lock().script.push_back(None);
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn respond<T>(
        &self,
        call: Call,
        token: &str,
        ok: impl FnOnce(&mut FakeState) -> T,
    ) -> Result<RemoteResponse<T>> {
        let mut state = self.lock();
        if state.offline {
            return Err(Error::Transport("connection refused".to_string()));
        }
        state.calls.push(call);
        if let Some(Some(code)) = state.script.pop_front() {
            return Ok(RemoteResponse::failure(code, "scripted failure"));
        }
        if state.valid_token.as_deref().is_some_and(|valid| valid != token) {
            return Ok(RemoteResponse::failure(ResponseCode::InvalidToken, "bad token"));
        }
        Ok(RemoteResponse::ok(ok(&mut state)))
    }
}

impl FakeState {
    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("n{}", self.next_id)
    }

    fn bump(&mut self, file_id: &str) {
        *self.versions.entry(file_id.to_string()).or_insert(0) += 1;
    }
}

impl Remote for FakeRemote {
    fn list_files(&self, token: &str) -> Result<RemoteResponse<Vec<FileInfo>>> {
        self.respond(Call::ListFiles, token, |s| {
            s.documents.iter().map(|(info, _)| info.clone()).collect()
        })
    }

    fn check_versions(
        &self,
        token: &str,
        file_ids: &[String],
    ) -> Result<RemoteResponse<HashMap<String, u64>>> {
        self.respond(Call::CheckVersions(file_ids.to_vec()), token, |s| {
            file_ids
                .iter()
                .filter_map(|id| s.versions.get(id).map(|v| (id.clone(), *v)))
                .collect()
        })
    }

    fn read_document(&self, token: &str, file_id: &str) -> Result<RemoteResponse<Vec<RemoteNode>>> {
        self.respond(Call::ReadDocument(file_id.to_string()), token, |s| {
            s.documents
                .iter()
                .find(|(info, _)| info.id == file_id)
                .map(|(_, nodes)| nodes.clone())
                .unwrap_or_default()
        })
    }

    fn add_to_inbox(
        &self,
        token: &str,
        content: &str,
        _note: &str,
    ) -> Result<RemoteResponse<RemoteId>> {
        self.respond(Call::AddToInbox(content.to_string()), token, |s| {
            s.bump(INBOX_FILE);
            RemoteId::new(INBOX_FILE, s.fresh_id())
        })
    }

    fn insert_nodes(
        &self,
        token: &str,
        file_id: &str,
        nodes: &[NewNode],
    ) -> Result<RemoteResponse<Vec<String>>> {
        let call = Call::InsertNodes {
            file_id: file_id.to_string(),
            nodes: nodes.to_vec(),
        };
        self.respond(call, token, |s| {
            s.bump(file_id);
            nodes.iter().map(|_| s.fresh_id()).collect()
        })
    }

    fn edit_nodes(
        &self,
        token: &str,
        file_id: &str,
        edits: &[NodeEdit],
    ) -> Result<RemoteResponse<()>> {
        let call = Call::EditNodes {
            file_id: file_id.to_string(),
            edits: edits.to_vec(),
        };
        self.respond(call, token, |s| s.bump(file_id))
    }

    fn move_node(
        &self,
        token: &str,
        file_id: &str,
        node_id: &str,
        parent_id: &str,
        index: u32,
    ) -> Result<RemoteResponse<()>> {
        let call = Call::MoveNode {
            file_id: file_id.to_string(),
            node_id: node_id.to_string(),
            parent_id: parent_id.to_string(),
            index,
        };
        self.respond(call, token, |s| s.bump(file_id))
    }

    fn delete_node(&self, token: &str, file_id: &str, node_id: &str) -> Result<RemoteResponse<()>> {
        let call = Call::DeleteNode {
            file_id: file_id.to_string(),
            node_id: node_id.to_string(),
        };
        self.respond(call, token, |s| s.bump(file_id))
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Two documents: `f` holds "Groceries" with "Milk" and "Eggs", `g` holds
/// "Hardware" with "Nails".
pub fn seed_documents() -> Vec<(&'static str, Vec<RemoteNode>)> {
    vec![
        (
            "f",
            vec![
                RemoteNode::new("a", "Groceries").with_children(["b", "c"]),
                RemoteNode::new("b", "Milk"),
                RemoteNode::new("c", "Eggs"),
            ],
        ),
        (
            "g",
            vec![
                RemoteNode::new("x", "Hardware").with_children(["y"]),
                RemoteNode::new("y", "Nails"),
            ],
        ),
    ]
}

/// A queue over an in-memory store, a fake remote and a manual clock.
pub struct Harness {
    pub db: Arc<Database>,
    pub remote: Arc<FakeRemote>,
    pub events: Arc<RecordingSink>,
    pub clock: Arc<ManualClock>,
    pub sleeper: Arc<RecordingSleeper>,
    pub queue: Arc<JobQueue>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_remote(FakeRemote::new(), Config::default())
    }

    pub fn with_remote(remote: FakeRemote, config: Config) -> Self {
        let db = Arc::new(Database::open_in_memory().unwrap());
        Self::over(db, Arc::new(remote), config)
    }

    /// Opens a queue over an existing store, as after a restart.
    pub fn over(db: Arc<Database>, remote: Arc<FakeRemote>, config: Config) -> Self {
        let events = Arc::new(RecordingSink::new());
        let clock = Arc::new(ManualClock::new(start_time()));
        let sleeper = Arc::new(RecordingSleeper::default());
        let queue = Arc::new(
            JobQueue::open(
                Arc::clone(&db),
                remote.clone(),
                events.clone(),
                clock.clone(),
                sleeper.clone(),
                &config,
            )
            .unwrap(),
        );
        Harness {
            db,
            remote,
            events,
            clock,
            sleeper,
            queue,
        }
    }

    /// Logged in, with the seed documents served remotely and reconciled
    /// into the store.
    pub fn seeded() -> Self {
        Self::seeded_with(Config::default())
    }

    pub fn seeded_with(config: Config) -> Self {
        let remote = seed_documents()
            .into_iter()
            .fold(FakeRemote::new(), |remote, (id, nodes)| remote.with_document(id, nodes));
        let harness = Self::with_remote(remote, config);
        harness.login();
        let files = seed_documents()
            .into_iter()
            .map(|(id, nodes)| RemoteFile::new(id, nodes))
            .collect();
        reconcile(
            &harness.db,
            &RemoteSnapshot::new(files),
            &Markers::default(),
            harness.clock.now(),
        )
        .unwrap();
        harness
    }

    pub fn login(&self) {
        self.db.set_meta(META_TOKEN, "secret").unwrap();
    }

    /// The first node with the given content.
    pub fn node(&self, content: &str) -> Node {
        self.db
            .read(|s| s.all())
            .unwrap()
            .into_iter()
            .find(|n| n.content == content)
            .unwrap_or_else(|| panic!("no node with content {content:?}"))
    }

    pub fn children(&self, parent: &Node) -> Vec<Node> {
        self.db.children(Some(parent.id)).unwrap()
    }

    pub fn contents(&self, parent: &Node) -> Vec<String> {
        self.children(parent).into_iter().map(|n| n.content).collect()
    }

    pub fn enqueue(&self, payload: JobPayload) -> JobId {
        self.queue.enqueue(payload).unwrap()
    }

    pub fn run(&self, group: JobGroup) -> Step {
        self.queue.run_next(group).unwrap()
    }

    pub fn run_items(&self) -> Step {
        self.run(JobGroup::Items)
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(chrono::Duration::seconds(secs));
    }

    /// Pending markers left on any node.
    pub fn marked(&self) -> Vec<Node> {
        self.db
            .read(|s| s.all())
            .unwrap()
            .into_iter()
            .filter(|n| n.is_pending())
            .collect()
    }
}

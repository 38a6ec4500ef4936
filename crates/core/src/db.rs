// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed node store.
//!
//! The [`Database`] owns one connection behind a mutex. Every access goes
//! through [`Database::read`] or [`Database::transaction`], which hand out a
//! [`Store`] borrowing the connection; multi-node writes must use
//! `transaction` so partial states are never observable.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::job::{JobGroup, JobId, JobRecord, JobState};
use crate::node::{LocalId, Node, RemoteId};
use crate::snapshot::FileEntry;

/// SQL schema for the node cache and the job queue.
pub const SCHEMA: &str = r#"
-- Cached outline nodes; structure lives in parent_id/position only
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id TEXT,
    item_id TEXT,
    parent_id INTEGER,
    position INTEGER NOT NULL DEFAULT 0,
    content TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    checked INTEGER NOT NULL DEFAULT 0,
    hidden INTEGER NOT NULL DEFAULT 0,
    checklist INTEGER NOT NULL DEFAULT 0,
    is_inbox INTEGER NOT NULL DEFAULT 0,
    is_bookmark INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    modified_at TEXT NOT NULL,
    pending_job TEXT
);

-- Durable jobs; seq defines FIFO order within a group
CREATE TABLE IF NOT EXISTS jobs (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    group_key TEXT NOT NULL,
    dedup_key TEXT,
    run_count INTEGER NOT NULL DEFAULT 0,
    state TEXT NOT NULL DEFAULT 'queued',
    not_before TEXT NOT NULL,
    cancel_requested INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Remote file catalog in listing order; version is set for synced documents
CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    is_folder INTEGER NOT NULL DEFAULT 0,
    parent_id TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    version INTEGER
);

-- Remote identities deleted locally, until a snapshot newer than the delete
CREATE TABLE IF NOT EXISTS tombstones (
    file_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    deleted_at TEXT NOT NULL,
    PRIMARY KEY (file_id, item_id)
);

-- Key/value state (credential, last sync time)
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id, position);
CREATE INDEX IF NOT EXISTS idx_nodes_remote ON nodes(file_id, item_id);
CREATE INDEX IF NOT EXISTS idx_nodes_pending ON nodes(pending_job);
CREATE INDEX IF NOT EXISTS idx_jobs_group ON jobs(group_key, seq);
CREATE INDEX IF NOT EXISTS idx_jobs_dedup ON jobs(dedup_key);
"#;

/// Meta key holding the API token.
pub const META_TOKEN: &str = "token";
/// Meta key holding the time of the last completed full sync.
pub const META_LAST_SYNC: &str = "last_full_sync";

const NODE_COLUMNS: &str = "id, file_id, item_id, parent_id, position, content, note, checked,
     hidden, checklist, is_inbox, is_bookmark, created_at, modified_at, pending_job";

const JOB_COLUMNS: &str = "seq, id, kind, payload, group_key, dedup_key, run_count, state,
     not_before, cancel_requested, created_at";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn node_from_row(row: &Row<'_>) -> std::result::Result<Node, rusqlite::Error> {
    let created: String = row.get(12)?;
    let modified: String = row.get(13)?;
    let pending: Option<String> = row.get(14)?;
    Ok(Node {
        id: LocalId(row.get(0)?),
        file_id: row.get(1)?,
        item_id: row.get(2)?,
        parent: row.get::<_, Option<i64>>(3)?.map(LocalId),
        position: row.get(4)?,
        content: row.get(5)?,
        note: row.get(6)?,
        checked: row.get(7)?,
        hidden: row.get(8)?,
        checklist: row.get(9)?,
        is_inbox: row.get(10)?,
        is_bookmark: row.get(11)?,
        created: parse_timestamp(&created, "created_at")?,
        modified: parse_timestamp(&modified, "modified_at")?,
        pending: pending.map(JobId::from),
    })
}

fn job_from_row(row: &Row<'_>) -> std::result::Result<JobRecord, rusqlite::Error> {
    let group: String = row.get(4)?;
    let state: String = row.get(7)?;
    let not_before: String = row.get(8)?;
    let created: String = row.get(10)?;
    Ok(JobRecord {
        seq: row.get(0)?,
        id: JobId::from(row.get::<_, String>(1)?),
        kind: row.get(2)?,
        payload: row.get(3)?,
        group: parse_db::<JobGroup>(&group, "group_key")?,
        dedup_key: row.get(5)?,
        run_count: row.get(6)?,
        state: parse_db::<JobState>(&state, "state")?,
        not_before: parse_timestamp(&not_before, "not_before")?,
        cancel_requested: row.get(9)?,
        created: parse_timestamp(&created, "created_at")?,
    })
}

fn file_from_row(row: &Row<'_>) -> std::result::Result<FileEntry, rusqlite::Error> {
    Ok(FileEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        is_folder: row.get(2)?,
        parent: row.get(3)?,
        version: row
            .get::<_, Option<i64>>(4)?
            .and_then(|v| u64::try_from(v).ok()),
    })
}

/// Create the schema on a database connection. Every statement is idempotent.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database holding the node cache, the job queue and meta state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL so readers don't block the worker's writes
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        run_migrations(&conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves no partial transaction behind
        // (rollback on drop), so the connection is still usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` against the store without a transaction.
    pub fn read<T>(&self, f: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        f(&Store { conn: &conn })
    }

    /// Runs `f` inside one transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn transaction<T>(&self, f: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;
        let out = f(&Store { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }

    /// Get a node by id.
    pub fn get(&self, id: LocalId) -> Result<Option<Node>> {
        self.read(|s| s.get(id))
    }

    /// Get a node by id, failing if it does not exist.
    pub fn node(&self, id: LocalId) -> Result<Node> {
        self.read(|s| s.node(id))
    }

    /// Children of a parent (`None` for roots), ordered by position.
    pub fn children(&self, parent: Option<LocalId>) -> Result<Vec<Node>> {
        self.read(|s| s.children(parent))
    }

    /// Nodes currently owned by a job.
    pub fn by_pending(&self, job: &JobId) -> Result<Vec<Node>> {
        self.read(|s| s.by_pending(job))
    }

    /// The inbox node, if any.
    pub fn inbox(&self) -> Result<Option<Node>> {
        self.read(|s| s.inbox())
    }

    /// Read a meta value.
    pub fn meta(&self, key: &str) -> Result<Option<String>> {
        self.read(|s| s.meta(key))
    }

    /// Write a meta value.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.read(|s| s.set_meta(key, value))
    }

    /// The cached file catalog.
    pub fn files(&self) -> Result<Vec<FileEntry>> {
        self.read(|s| s.files())
    }
}

/// Store operations on a borrowed connection (plain or transactional).
pub struct Store<'c> {
    conn: &'c Connection,
}

impl Store<'_> {
    // ─────────────────────────────────────────────────────────────────────
    // Nodes
    // ─────────────────────────────────────────────────────────────────────

    /// Get a node by id.
    pub fn get(&self, id: LocalId) -> Result<Option<Node>> {
        let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], node_from_row)
            .optional()?)
    }

    /// Get a node by id, failing if it does not exist.
    pub fn node(&self, id: LocalId) -> Result<Node> {
        self.get(id)?.ok_or(Error::NodeNotFound(id.0))
    }

    fn query_nodes(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(sql)?;
        let nodes = stmt
            .query_map(params, node_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    /// Children of a parent (`None` for roots), ordered by position.
    pub fn children(&self, parent: Option<LocalId>) -> Result<Vec<Node>> {
        match parent {
            Some(p) => self.query_nodes(
                &format!(
                    "SELECT {NODE_COLUMNS} FROM nodes WHERE parent_id = ?1 ORDER BY position, id"
                ),
                params![p.0],
            ),
            None => self.query_nodes(
                &format!(
                    "SELECT {NODE_COLUMNS} FROM nodes WHERE parent_id IS NULL ORDER BY position, id"
                ),
                [],
            ),
        }
    }

    /// Number of children of a parent.
    pub fn child_count(&self, parent: LocalId) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE parent_id = ?1",
            params![parent.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// The node and all its descendants, parent before children, siblings by position.
    pub fn subtree(&self, root: LocalId) -> Result<Vec<Node>> {
        let mut out = Vec::new();
        let mut stack = vec![self.node(root)?];
        while let Some(node) = stack.pop() {
            let children = self.children(Some(node.id))?;
            out.push(node);
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    /// Find a node by its remote identity.
    pub fn by_remote_id(&self, remote: &RemoteId) -> Result<Option<Node>> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE file_id = ?1 AND item_id = ?2 ORDER BY id LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![remote.file_id, remote.item_id], node_from_row)
            .optional()?)
    }

    /// Nodes whose pending marker belongs to `job`.
    pub fn by_pending(&self, job: &JobId) -> Result<Vec<Node>> {
        self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE pending_job = ?1 ORDER BY id"),
            params![job.as_str()],
        )
    }

    /// All cached nodes, ordered by id.
    pub fn all(&self) -> Result<Vec<Node>> {
        self.query_nodes(&format!("SELECT {NODE_COLUMNS} FROM nodes ORDER BY id"), [])
    }

    /// The inbox node, if any.
    pub fn inbox(&self) -> Result<Option<Node>> {
        let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE is_inbox = 1 ORDER BY id LIMIT 1");
        Ok(self.conn.query_row(&sql, [], node_from_row).optional()?)
    }

    /// Bookmarked nodes, the inbox included.
    pub fn bookmarks(&self) -> Result<Vec<Node>> {
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM nodes WHERE is_bookmark = 1 OR is_inbox = 1
                 ORDER BY is_inbox DESC, id"
            ),
            [],
        )
    }

    /// Insert or update a node. Unsaved nodes receive a fresh id.
    pub fn put(&self, node: &mut Node) -> Result<LocalId> {
        let created = node.created.to_rfc3339();
        let modified = node.modified.to_rfc3339();
        let pending = node.pending.as_ref().map(|j| j.as_str().to_string());

        if node.id.is_saved() {
            let affected = self.conn.execute(
                "UPDATE nodes SET file_id = ?1, item_id = ?2, parent_id = ?3, position = ?4,
                 content = ?5, note = ?6, checked = ?7, hidden = ?8, checklist = ?9,
                 is_inbox = ?10, is_bookmark = ?11, created_at = ?12, modified_at = ?13,
                 pending_job = ?14
                 WHERE id = ?15",
                params![
                    node.file_id,
                    node.item_id,
                    node.parent.map(|p| p.0),
                    node.position,
                    node.content,
                    node.note,
                    node.checked,
                    node.hidden,
                    node.checklist,
                    node.is_inbox,
                    node.is_bookmark,
                    created,
                    modified,
                    pending,
                    node.id.0,
                ],
            )?;
            if affected == 0 {
                return Err(Error::NodeNotFound(node.id.0));
            }
        } else {
            self.conn.execute(
                "INSERT INTO nodes (file_id, item_id, parent_id, position, content, note,
                 checked, hidden, checklist, is_inbox, is_bookmark, created_at, modified_at,
                 pending_job)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    node.file_id,
                    node.item_id,
                    node.parent.map(|p| p.0),
                    node.position,
                    node.content,
                    node.note,
                    node.checked,
                    node.hidden,
                    node.checklist,
                    node.is_inbox,
                    node.is_bookmark,
                    created,
                    modified,
                    pending,
                ],
            )?;
            node.id = LocalId(self.conn.last_insert_rowid());
        }
        Ok(node.id)
    }

    /// Insert or update several nodes.
    pub fn put_all(&self, nodes: &mut [Node]) -> Result<()> {
        for node in nodes.iter_mut() {
            self.put(node)?;
        }
        Ok(())
    }

    /// Delete nodes by id. Returns the number of rows removed.
    pub fn remove(&self, ids: &[LocalId]) -> Result<usize> {
        let mut stmt = self.conn.prepare("DELETE FROM nodes WHERE id = ?1")?;
        let mut removed = 0;
        for id in ids {
            removed += stmt.execute(params![id.0])?;
        }
        Ok(removed)
    }

    /// Clear every pending marker owned by `job`. Returns the number of nodes released.
    pub fn release(&self, job: &JobId) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE nodes SET pending_job = NULL WHERE pending_job = ?1",
            params![job.as_str()],
        )?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Jobs
    // ─────────────────────────────────────────────────────────────────────

    /// Persist a new job record. Assigns its sequence number.
    pub fn insert_job(&self, job: &mut JobRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO jobs (id, kind, payload, group_key, dedup_key, run_count, state,
             not_before, cancel_requested, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                job.id.as_str(),
                job.kind,
                job.payload,
                job.group.as_str(),
                job.dedup_key,
                job.run_count,
                job.state.as_str(),
                job.not_before.to_rfc3339(),
                job.cancel_requested,
                job.created.to_rfc3339(),
            ],
        )?;
        job.seq = self.conn.last_insert_rowid();
        Ok(())
    }

    /// Update the mutable fields of a job record.
    pub fn update_job(&self, job: &JobRecord) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE jobs SET payload = ?1, run_count = ?2, state = ?3, not_before = ?4,
             cancel_requested = ?5
             WHERE id = ?6",
            params![
                job.payload,
                job.run_count,
                job.state.as_str(),
                job.not_before.to_rfc3339(),
                job.cancel_requested,
                job.id.as_str(),
            ],
        )?;
        if affected == 0 {
            return Err(Error::JobNotFound(job.id.to_string()));
        }
        Ok(())
    }

    /// Get a job record by id.
    pub fn job(&self, id: &JobId) -> Result<Option<JobRecord>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.as_str()], job_from_row)
            .optional()?)
    }

    /// Delete a job record. Returns whether it existed.
    pub fn delete_job(&self, id: &JobId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM jobs WHERE id = ?1", params![id.as_str()])?;
        Ok(affected > 0)
    }

    /// All job records in FIFO order.
    pub fn jobs(&self) -> Result<Vec<JobRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY seq"))?;
        let jobs = stmt
            .query_map([], job_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    /// The oldest job of a group, regardless of whether it is due.
    pub fn head_job(&self, group: JobGroup) -> Result<Option<JobRecord>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE group_key = ?1 ORDER BY seq LIMIT 1");
        Ok(self
            .conn
            .query_row(&sql, params![group.as_str()], job_from_row)
            .optional()?)
    }

    /// The queued (not running) instance carrying a dedup key, if any.
    pub fn queued_by_dedup_key(&self, key: &str) -> Result<Option<JobRecord>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE dedup_key = ?1 AND state = 'queued'
             ORDER BY seq LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![key], job_from_row)
            .optional()?)
    }

    /// Move running jobs back to queued after a restart. Run counts are kept.
    pub fn requeue_running(&self) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE jobs SET state = 'queued' WHERE state = 'running'",
            [],
        )?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Files and tombstones
    // ─────────────────────────────────────────────────────────────────────

    /// The file catalog in listing order.
    pub fn files(&self) -> Result<Vec<FileEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, is_folder, parent_id, version FROM files ORDER BY position",
        )?;
        let files = stmt
            .query_map([], file_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(files)
    }

    /// Replaces the file catalog.
    pub fn replace_files(&self, files: &[FileEntry]) -> Result<()> {
        self.conn.execute("DELETE FROM files", [])?;
        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO files (id, title, is_folder, parent_id, position, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (position, file) in files.iter().enumerate() {
            stmt.execute(params![
                file.id,
                file.title,
                file.is_folder,
                file.parent,
                i64::try_from(position).unwrap_or(i64::MAX),
                file.version.and_then(|v| i64::try_from(v).ok()),
            ])?;
        }
        Ok(())
    }

    /// Records that `remote` was deleted at `at`.
    pub fn bury(&self, remote: &RemoteId, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tombstones (file_id, item_id, deleted_at) VALUES (?1, ?2, ?3)",
            params![remote.file_id, remote.item_id, at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn tombstones(&self) -> Result<Vec<(RemoteId, DateTime<Utc>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_id, item_id, deleted_at FROM tombstones")?;
        let rows = stmt
            .query_map([], |row| {
                let deleted: String = row.get(2)?;
                Ok((
                    RemoteId::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                    parse_timestamp(&deleted, "deleted_at")?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Identities deleted after `since`.
    pub fn buried_since(&self, since: DateTime<Utc>) -> Result<HashSet<RemoteId>> {
        Ok(self
            .tombstones()?
            .into_iter()
            .filter(|(_, at)| *at > since)
            .map(|(remote, _)| remote)
            .collect())
    }

    /// Drops tombstones recorded at or before `through`. Returns how many.
    pub fn prune_tombstones(&self, through: DateTime<Utc>) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM tombstones WHERE file_id = ?1 AND item_id = ?2")?;
        let mut removed = 0;
        for (remote, at) in self.tombstones()? {
            if at <= through {
                removed += stmt.execute(params![remote.file_id, remote.item_id])?;
            }
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Meta
    // ─────────────────────────────────────────────────────────────────────

    /// Read a meta value.
    pub fn meta(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// Write a meta value.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;

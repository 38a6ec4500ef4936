// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Full synchronization with the remote service.
//!
//! ```text
//! ┌─────────────┐  list_files   ┌─────────────┐
//! │ SyncEngine  │──────────────►│   Remote    │
//! │             │◄──────────────│  (trait)    │
//! └─────────────┘ check_versions└─────────────┘
//!        │        read_document
//!        ▼ RemoteSnapshot
//! ┌─────────────┐
//! │  reconcile  │  (one store transaction)
//! └─────────────┘
//! ```
//!
//! Only documents whose version differs from the cached one are read.
//! The engine does not retry; the sync job's policy does.

use chrono::SecondsFormat;
use ol_core::db::{META_LAST_SYNC, META_TOKEN};
use ol_core::{
    reconcile, ClockSource, Database, FileEntry, JobGroup, Markers, ReconcileReport, RemoteFile,
    RemoteSnapshot,
};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::events::{Event, EventSink, SyncStatus};
use crate::jobs::JobContext;
use crate::remote::{FileInfo, RateLimiter, Remote, RemoteResponse};

/// Fetches the remote forest and merges it into the local store.
pub struct SyncEngine<'a> {
    db: &'a Database,
    remote: &'a dyn Remote,
    limiter: &'a RateLimiter,
    events: &'a dyn EventSink,
    markers: &'a Markers,
    clock: &'a dyn ClockSource,
}

/// Builds the catalog in listing order, with folder parents and versions.
fn catalog(listing: &[FileInfo], versions: &HashMap<String, u64>) -> Vec<FileEntry> {
    let parents: HashMap<&str, &str> = listing
        .iter()
        .filter(|f| f.is_folder())
        .flat_map(|folder| {
            folder
                .children
                .iter()
                .map(move |child| (child.as_str(), folder.id.as_str()))
        })
        .collect();
    listing
        .iter()
        .map(|info| FileEntry {
            id: info.id.clone(),
            title: info.title.clone(),
            is_folder: info.is_folder(),
            parent: parents.get(info.id.as_str()).map(|p| (*p).to_string()),
            version: versions.get(&info.id).copied(),
        })
        .collect()
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        db: &'a Database,
        remote: &'a dyn Remote,
        limiter: &'a RateLimiter,
        events: &'a dyn EventSink,
        markers: &'a Markers,
        clock: &'a dyn ClockSource,
    ) -> Self {
        SyncEngine {
            db,
            remote,
            limiter,
            events,
            markers,
            clock,
        }
    }

    pub fn from_context(ctx: &JobContext<'a>) -> Self {
        SyncEngine::new(
            ctx.db,
            ctx.remote,
            ctx.limiter,
            ctx.events,
            ctx.markers,
            ctx.clock,
        )
    }

    fn call<T>(
        &self,
        token: &str,
        f: impl Fn(&dyn Remote, &str) -> Result<RemoteResponse<T>>,
    ) -> Result<T> {
        self.limiter
            .execute(
                || f(self.remote, token),
                |delay| {
                    self.events.emit(Event::RateLimitDelay {
                        delay,
                        group: JobGroup::Sync,
                    })
                },
            )?
            .into_result()
    }

    fn status(&self, status: SyncStatus) {
        self.events.emit(Event::SyncStatus { status });
    }

    /// Reads every editable document that changed since it was last cached,
    /// reporting progress per document.
    pub fn fetch_snapshot(&self) -> Result<RemoteSnapshot> {
        let token = self.db.meta(META_TOKEN)?.ok_or(Error::NotAuthenticated)?;
        let listing = self.call(&token, |r, t| r.list_files(t))?;
        let documents: Vec<&FileInfo> = listing
            .iter()
            .filter(|f| f.is_editable_document())
            .collect();

        let ids: Vec<String> = documents.iter().map(|f| f.id.clone()).collect();
        let versions = if ids.is_empty() {
            HashMap::new()
        } else {
            self.call(&token, |r, t| r.check_versions(t, &ids))?
        };
        let cached: HashMap<String, u64> = self
            .db
            .files()?
            .into_iter()
            .filter_map(|f| f.version.map(|v| (f.id, v)))
            .collect();

        let total = documents.len();
        let mut files = Vec::new();
        let mut unchanged = Vec::new();
        for (index, info) in documents.into_iter().enumerate() {
            let version = versions.get(&info.id);
            if version.is_some() && version == cached.get(&info.id) {
                tracing::debug!(file = %info.id, "document unchanged");
                unchanged.push(info.id.clone());
            } else {
                let nodes = self.call(&token, |r, t| r.read_document(t, &info.id))?;
                tracing::debug!(file = %info.id, nodes = nodes.len(), "read document");
                let mut file = RemoteFile::new(info.id.clone(), nodes);
                file.title.clone_from(&info.title);
                files.push(file);
            }
            self.events.emit(Event::SyncProgress {
                progress: (index + 1) as f32 / total as f32,
            });
        }
        Ok(RemoteSnapshot::new(files).with_catalog(catalog(&listing, &versions), unchanged))
    }

    /// Fetches, reconciles and records the sync time. The status returns to
    /// idle whatever the outcome.
    pub fn sync(&self) -> Result<ReconcileReport> {
        self.status(SyncStatus::Running);
        let result = self.fetch_and_reconcile();
        if result.is_ok() {
            self.status(SyncStatus::Succeeded);
        }
        self.status(SyncStatus::Idle);
        result
    }

    fn fetch_and_reconcile(&self) -> Result<ReconcileReport> {
        // Local changes after this instant are newer than the snapshot
        let fetched_at = self.clock.now();
        let snapshot = self.fetch_snapshot()?;
        let report = reconcile(self.db, &snapshot, self.markers, fetched_at)?;
        let now = self.clock.now();
        self.db
            .set_meta(META_LAST_SYNC, &now.to_rfc3339_opts(SecondsFormat::Millis, true))?;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands that change the outline. Each one applies its change locally,
//! queues the matching job and prints the job id.

use ol_core::{JobId, LocalId};

use crate::config::Config;
use crate::error::Result;
use crate::jobs::{
    BulkEditJob, CreateJob, DeleteJob, DuplicateJob, EditJob, Fields, JobPayload, MoveJob,
};
use crate::queue::JobQueue;

use super::open_queue;

fn report(payload: &JobPayload, id: &JobId) {
    println!("queued {} job {}", payload.kind(), id);
}

fn submit(config: &Config, payload: JobPayload) -> Result<()> {
    let queue = open_queue(config)?;
    let id = queue.enqueue(payload.clone())?;
    report(&payload, &id);
    Ok(())
}

pub fn add(
    config: &Config,
    text: String,
    note: Option<String>,
    parent: Option<LocalId>,
) -> Result<()> {
    let queue = open_queue(config)?;
    let payload = add_payload(&queue, text, note, parent)?;
    let id = queue.enqueue(payload.clone())?;
    report(&payload, &id);
    Ok(())
}

/// Builds the create job, resolving a missing parent to the inbox.
pub(crate) fn add_payload(
    queue: &JobQueue,
    text: String,
    note: Option<String>,
    parent: Option<LocalId>,
) -> Result<JobPayload> {
    let parent = match parent {
        Some(parent) => parent,
        None => {
            let inbox = queue.db().inbox()?.ok_or_else(|| {
                ol_core::Error::InvalidInput(
                    "no inbox yet\n  hint: run 'ol sync' to fetch the outline first".to_string(),
                )
            })?;
            inbox.id
        }
    };
    let mut job = CreateJob::new(parent, text);
    if let Some(note) = note {
        job = job.with_note(note);
    }
    Ok(JobPayload::Create(job))
}

pub fn edit(
    config: &Config,
    id: LocalId,
    content: Option<String>,
    note: Option<String>,
    checked: bool,
    unchecked: bool,
) -> Result<()> {
    submit(config, edit_payload(id, content, note, checked, unchecked))
}

pub(crate) fn edit_payload(
    id: LocalId,
    content: Option<String>,
    note: Option<String>,
    checked: bool,
    unchecked: bool,
) -> JobPayload {
    let checked = match (checked, unchecked) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    JobPayload::Edit(EditJob {
        node: id,
        fields: Fields {
            content,
            note,
            checked,
        },
    })
}

pub fn mv(config: &Config, id: LocalId, parent: LocalId, position: Option<u32>) -> Result<()> {
    submit(config, JobPayload::Move(MoveJob::new(id, parent, position)))
}

pub fn rm(config: &Config, id: LocalId) -> Result<()> {
    submit(config, JobPayload::Delete(DeleteJob { node: id }))
}

pub fn dup(config: &Config, id: LocalId) -> Result<()> {
    submit(config, JobPayload::Duplicate(DuplicateJob::new(id)))
}

/// Checks or unchecks several nodes with one bulk edit.
pub fn set_checked(config: &Config, ids: &[LocalId], checked: bool) -> Result<()> {
    submit(
        config,
        JobPayload::BulkEdit(BulkEditJob::uniform(ids, Fields::checked(checked))),
    )
}

#[cfg(test)]
#[path = "outline_tests.rs"]
mod tests;

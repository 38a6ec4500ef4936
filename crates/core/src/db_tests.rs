// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{Duration, Utc};

fn insert(db: &Database, node: Node) -> Node {
    db.transaction(|s| {
        let mut node = node;
        s.put(&mut node)?;
        Ok(node)
    })
    .unwrap()
}

#[test]
fn put_assigns_id_and_get_round_trips() {
    let db = Database::open_in_memory().unwrap();
    let node = insert(
        &db,
        Node::new("Buy milk", Utc::now()).with_remote_id(RemoteId::new("f1", "i1")),
    );

    assert!(node.id.is_saved());
    let stored = db.node(node.id).unwrap();
    assert_eq!(stored, node);
}

#[test]
fn put_updates_existing_node() {
    let db = Database::open_in_memory().unwrap();
    let mut node = insert(&db, Node::new("draft", Utc::now()));
    node.content = "final".into();
    node.checked = true;
    db.transaction(|s| s.put(&mut node)).unwrap();

    let stored = db.node(node.id).unwrap();
    assert_eq!(stored.content, "final");
    assert!(stored.checked);
}

#[test]
fn put_missing_saved_node_fails() {
    let db = Database::open_in_memory().unwrap();
    let mut node = Node::new("ghost", Utc::now());
    node.id = LocalId(42);
    let err = db.transaction(|s| s.put(&mut node)).unwrap_err();
    assert!(matches!(err, Error::NodeNotFound(42)));
}

#[test]
fn get_missing_node_is_none() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get(LocalId(7)).unwrap().is_none());
    assert!(matches!(db.node(LocalId(7)), Err(Error::NodeNotFound(7))));
}

#[test]
fn children_are_ordered_by_position() {
    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();
    let root = insert(&db, Node::new("root", now));
    insert(&db, Node::new("c", now).with_parent(root.id, 2));
    insert(&db, Node::new("a", now).with_parent(root.id, 0));
    insert(&db, Node::new("b", now).with_parent(root.id, 1));

    let names: Vec<String> = db
        .children(Some(root.id))
        .unwrap()
        .into_iter()
        .map(|n| n.content)
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let roots = db.children(None).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, root.id);
}

#[test]
fn subtree_is_depth_first_parent_first() {
    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();
    let root = insert(&db, Node::new("root", now));
    let a = insert(&db, Node::new("a", now).with_parent(root.id, 0));
    insert(&db, Node::new("b", now).with_parent(root.id, 1));
    insert(&db, Node::new("a1", now).with_parent(a.id, 0));

    let names: Vec<String> = db
        .read(|s| s.subtree(root.id))
        .unwrap()
        .into_iter()
        .map(|n| n.content)
        .collect();
    assert_eq!(names, vec!["root", "a", "a1", "b"]);
}

#[test]
fn by_remote_id_finds_node() {
    let db = Database::open_in_memory().unwrap();
    let node = insert(
        &db,
        Node::new("x", Utc::now()).with_remote_id(RemoteId::new("f", "i")),
    );
    let found = db
        .read(|s| s.by_remote_id(&RemoteId::new("f", "i")))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, node.id);
    assert!(db
        .read(|s| s.by_remote_id(&RemoteId::new("f", "other")))
        .unwrap()
        .is_none());
}

#[test]
fn release_clears_only_owned_markers() {
    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();
    let job = JobId::from("job-1");
    let other = JobId::from("job-2");

    let mut a = Node::new("a", now);
    a.pending = Some(job.clone());
    let mut b = Node::new("b", now);
    b.pending = Some(other.clone());
    let a = insert(&db, a);
    let b = insert(&db, b);

    assert_eq!(db.by_pending(&job).unwrap().len(), 1);
    let released = db.transaction(|s| s.release(&job)).unwrap();
    assert_eq!(released, 1);

    assert!(db.node(a.id).unwrap().pending.is_none());
    assert_eq!(db.node(b.id).unwrap().pending, Some(other));
}

#[test]
fn remove_deletes_rows() {
    let db = Database::open_in_memory().unwrap();
    let a = insert(&db, Node::new("a", Utc::now()));
    let removed = db.transaction(|s| s.remove(&[a.id, LocalId(999)])).unwrap();
    assert_eq!(removed, 1);
    assert!(db.get(a.id).unwrap().is_none());
}

#[test]
fn failed_transaction_rolls_back() {
    let db = Database::open_in_memory().unwrap();
    let result: Result<()> = db.transaction(|s| {
        let mut node = Node::new("doomed", Utc::now());
        s.put(&mut node)?;
        Err(Error::InvalidInput("abort".into()))
    });
    assert!(result.is_err());
    assert!(db.read(|s| s.all()).unwrap().is_empty());
}

#[test]
fn inbox_and_bookmarks() {
    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();
    let mut inbox = Node::new("Inbox", now);
    inbox.is_inbox = true;
    let mut mark = Node::new("Reading #bookmark", now);
    mark.is_bookmark = true;
    let inbox = insert(&db, inbox);
    let mark = insert(&db, mark);
    insert(&db, Node::new("plain", now));

    assert_eq!(db.inbox().unwrap().unwrap().id, inbox.id);
    let ids: Vec<LocalId> = db
        .read(|s| s.bookmarks())
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec![inbox.id, mark.id]);
}

fn record(id: &str, group: JobGroup) -> JobRecord {
    JobRecord::new(JobId::from(id), "edit", "{}".into(), group, Utc::now())
}

#[test]
fn jobs_keep_fifo_order_per_group() {
    let db = Database::open_in_memory().unwrap();
    db.transaction(|s| {
        s.insert_job(&mut record("a", JobGroup::Items))?;
        s.insert_job(&mut record("s", JobGroup::Sync))?;
        s.insert_job(&mut record("b", JobGroup::Items))?;
        Ok(())
    })
    .unwrap();

    let head = db.read(|s| s.head_job(JobGroup::Items)).unwrap().unwrap();
    assert_eq!(head.id.as_str(), "a");
    let head = db.read(|s| s.head_job(JobGroup::Sync)).unwrap().unwrap();
    assert_eq!(head.id.as_str(), "s");
    assert!(db.read(|s| s.head_job(JobGroup::Auth)).unwrap().is_none());

    let all: Vec<String> = db
        .read(|s| s.jobs())
        .unwrap()
        .into_iter()
        .map(|j| j.id.to_string())
        .collect();
    assert_eq!(all, vec!["a", "s", "b"]);
}

#[test]
fn update_job_persists_mutable_fields() {
    let db = Database::open_in_memory().unwrap();
    let mut job = record("a", JobGroup::Items);
    db.transaction(|s| s.insert_job(&mut job)).unwrap();

    job.run_count = 3;
    job.state = JobState::Running;
    job.not_before = job.created + Duration::seconds(40);
    job.cancel_requested = true;
    db.transaction(|s| s.update_job(&job)).unwrap();

    let stored = db.read(|s| s.job(&job.id)).unwrap().unwrap();
    assert_eq!(stored, job);
}

#[test]
fn update_missing_job_fails() {
    let db = Database::open_in_memory().unwrap();
    let job = record("nope", JobGroup::Items);
    assert!(matches!(
        db.transaction(|s| s.update_job(&job)),
        Err(Error::JobNotFound(_))
    ));
}

#[test]
fn dedup_lookup_ignores_running_jobs() {
    let db = Database::open_in_memory().unwrap();
    let mut job = record("sync-1", JobGroup::Sync).with_dedup_key("sync");
    db.transaction(|s| s.insert_job(&mut job)).unwrap();
    assert!(db
        .read(|s| s.queued_by_dedup_key("sync"))
        .unwrap()
        .is_some());

    job.state = JobState::Running;
    db.transaction(|s| s.update_job(&job)).unwrap();
    assert!(db
        .read(|s| s.queued_by_dedup_key("sync"))
        .unwrap()
        .is_none());
}

#[test]
fn requeue_running_keeps_run_count() {
    let db = Database::open_in_memory().unwrap();
    let mut job = record("a", JobGroup::Items);
    db.transaction(|s| s.insert_job(&mut job)).unwrap();
    job.state = JobState::Running;
    job.run_count = 2;
    db.transaction(|s| s.update_job(&job)).unwrap();

    assert_eq!(db.transaction(|s| s.requeue_running()).unwrap(), 1);
    let stored = db.read(|s| s.job(&job.id)).unwrap().unwrap();
    assert_eq!(stored.state, JobState::Queued);
    assert_eq!(stored.run_count, 2);
}

#[test]
fn delete_job_reports_existence() {
    let db = Database::open_in_memory().unwrap();
    let mut job = record("a", JobGroup::Items);
    db.transaction(|s| s.insert_job(&mut job)).unwrap();
    assert!(db.transaction(|s| s.delete_job(&job.id)).unwrap());
    assert!(!db.transaction(|s| s.delete_job(&job.id)).unwrap());
}

#[test]
fn meta_upserts() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.meta(META_TOKEN).unwrap().is_none());
    db.set_meta(META_TOKEN, "one").unwrap();
    db.set_meta(META_TOKEN, "two").unwrap();
    assert_eq!(db.meta(META_TOKEN).unwrap().as_deref(), Some("two"));
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("outline.db");
    let id = {
        let db = Database::open(&path).unwrap();
        let mut job = record("persisted", JobGroup::Items);
        db.transaction(|s| s.insert_job(&mut job)).unwrap();
        insert(&db, Node::new("kept", Utc::now())).id
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.node(id).unwrap().content, "kept");
    assert_eq!(db.read(|s| s.jobs()).unwrap().len(), 1);
}

#[test]
fn migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
}

#[test]
fn checklist_flag_round_trips() {
    let db = Database::open_in_memory().unwrap();
    let mut node = Node::new("Packing list", Utc::now());
    node.checklist = true;
    let node = insert(&db, node);
    assert!(db.node(node.id).unwrap().checklist);
}

#[test]
fn file_catalog_is_replaced_in_order() {
    let db = Database::open_in_memory().unwrap();
    let catalog = vec![
        FileEntry::folder("dir", "Work"),
        FileEntry::document("f", "Plans", Some(7)).in_folder("dir"),
        FileEntry::document("g", "Notes", None),
    ];
    db.transaction(|s| s.replace_files(&catalog)).unwrap();
    assert_eq!(db.files().unwrap(), catalog);

    let shorter = vec![FileEntry::document("g", "Notes", Some(2))];
    db.transaction(|s| s.replace_files(&shorter)).unwrap();
    assert_eq!(db.files().unwrap(), shorter);
}

#[test]
fn tombstones_expire_with_newer_snapshots() {
    let db = Database::open_in_memory().unwrap();
    let t0 = Utc::now();
    let gone = RemoteId::new("f", "b");
    db.transaction(|s| s.bury(&gone, t0 + Duration::seconds(5)))
        .unwrap();

    let buried = db.read(|s| s.buried_since(t0)).unwrap();
    assert!(buried.contains(&gone));
    assert!(db
        .read(|s| s.buried_since(t0 + Duration::seconds(5)))
        .unwrap()
        .is_empty());

    assert_eq!(db.read(|s| s.prune_tombstones(t0)).unwrap(), 0);
    assert_eq!(
        db.read(|s| s.prune_tombstones(t0 + Duration::seconds(10)))
            .unwrap(),
        1
    );
    assert!(db.read(|s| s.buried_since(t0)).unwrap().is_empty());
}

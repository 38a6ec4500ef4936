// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::job::JobId;
use crate::snapshot::{FileEntry, RemoteFile, RemoteNode};
use chrono::Duration;

fn test_db() -> Database {
    Database::open_in_memory().unwrap()
}

fn one_file(nodes: Vec<RemoteNode>) -> RemoteSnapshot {
    RemoteSnapshot::new(vec![RemoteFile::new("f", nodes)])
}

fn basic_tree() -> RemoteSnapshot {
    one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b", "c"]),
        RemoteNode::new("b", "Milk"),
        RemoteNode::new("c", "Eggs"),
    ])
}

fn by_content(db: &Database, content: &str) -> Node {
    db.read(|s| s.all())
        .unwrap()
        .into_iter()
        .find(|n| n.content == content)
        .unwrap()
}

fn put(db: &Database, node: Node) -> Node {
    db.transaction(|s| {
        let mut node = node;
        s.put(&mut node)?;
        Ok(node)
    })
    .unwrap()
}

fn inbox_count(db: &Database) -> usize {
    db.read(|s| s.all())
        .unwrap()
        .iter()
        .filter(|n| n.is_inbox)
        .count()
}

#[test]
fn builds_tree_from_children_lists() {
    let db = test_db();
    let report = reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();
    assert_eq!(report.created, 3);
    assert_eq!(report.deleted, 0);

    let root = by_content(&db, "Groceries");
    assert_eq!(root.parent, None);
    assert_eq!(root.remote_id(), Some(RemoteId::new("f", "a")));

    let children: Vec<String> = db
        .children(Some(root.id))
        .unwrap()
        .into_iter()
        .map(|n| n.content)
        .collect();
    assert_eq!(children, vec!["Milk", "Eggs"]);
    assert_eq!(by_content(&db, "Eggs").position, 1);
}

#[test]
fn synthesizes_inbox_when_none_is_tagged() {
    let db = test_db();
    let report = reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();

    let inbox = db.inbox().unwrap().unwrap();
    assert_eq!(inbox.id, report.inbox);
    assert_eq!(inbox.content, "Inbox");
    assert!(inbox.remote_id().is_none());
    assert!(inbox.is_bookmark);
}

#[test]
fn reconciliation_is_idempotent() {
    let db = test_db();
    let markers = Markers::default();
    let now = Utc::now();
    reconcile(&db, &basic_tree(), &markers, now).unwrap();
    let before = db.read(|s| s.all()).unwrap();

    let report = reconcile(&db, &basic_tree(), &markers, now).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.updated, 3);
    assert_eq!(db.read(|s| s.all()).unwrap(), before);
}

#[test]
fn tagged_remote_node_becomes_the_only_inbox() {
    let db = test_db();
    let markers = Markers::default();
    reconcile(&db, &basic_tree(), &markers, Utc::now()).unwrap();
    assert_eq!(db.inbox().unwrap().unwrap().content, "Inbox");

    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b", "c"]),
        RemoteNode::new("b", "Milk"),
        RemoteNode::new("c", "Eggs"),
        RemoteNode::new("d", "Capture #inbox"),
        RemoteNode::new("e", "Reading").with_note("#bookmark"),
    ]);
    let report = reconcile(&db, &snapshot, &markers, Utc::now()).unwrap();

    let inbox = by_content(&db, "Capture #inbox");
    assert_eq!(report.inbox, inbox.id);
    assert!(inbox.is_inbox);
    assert!(inbox.is_bookmark);
    assert_eq!(inbox_count(&db), 1);
    // The synthesized placeholder is gone
    assert_eq!(report.deleted, 1);
    assert_eq!(report.bookmarks, vec![by_content(&db, "Reading").id]);
}

#[test]
fn pending_node_keeps_local_edit() {
    let db = test_db();
    reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();

    let mut milk = by_content(&db, "Milk");
    milk.content = "Oat milk".into();
    milk.checked = true;
    milk.pending = Some(JobId::from("edit-1"));
    db.transaction(|s| s.put(&mut milk)).unwrap();

    let report = reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();
    assert_eq!(report.preserved, 1);

    let stored = db.node(milk.id).unwrap();
    assert_eq!(stored.content, "Oat milk");
    assert!(stored.checked);
    assert_eq!(stored.pending, Some(JobId::from("edit-1")));
}

#[test]
fn pending_node_survives_remote_removal() {
    let db = test_db();
    reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();

    let mut eggs = by_content(&db, "Eggs");
    eggs.pending = Some(JobId::from("edit-2"));
    db.transaction(|s| s.put(&mut eggs)).unwrap();

    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b"]),
        RemoteNode::new("b", "Milk"),
    ]);
    let report = reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();
    assert_eq!(report.deleted, 0);
    assert!(db.get(eggs.id).unwrap().is_some());
}

#[test]
fn unmatched_nodes_are_deleted() {
    let db = test_db();
    reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();
    let eggs = by_content(&db, "Eggs");

    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b"]),
        RemoteNode::new("b", "Milk"),
    ]);
    let report = reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();
    assert_eq!(report.deleted, 1);
    assert!(db.get(eggs.id).unwrap().is_none());
}

#[test]
fn content_fallback_links_unidentified_node() {
    let db = test_db();
    let now = Utc::now();
    reconcile(&db, &basic_tree(), &Markers::default(), now).unwrap();
    let root = by_content(&db, "Groceries");

    let mut local = Node::new("Bread", now).with_parent(root.id, 2);
    local.file_id = Some("f".into());
    let local = put(&db, local);

    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b", "c", "d"]),
        RemoteNode::new("b", "Milk"),
        RemoteNode::new("c", "Eggs"),
        RemoteNode::new("d", "Bread"),
    ]);
    let report = reconcile(&db, &snapshot, &Markers::default(), now).unwrap();
    assert_eq!(report.created, 0);

    let stored = db.node(local.id).unwrap();
    assert_eq!(stored.remote_id(), Some(RemoteId::new("f", "d")));
}

#[test]
fn pending_child_keeps_local_parent() {
    let db = test_db();
    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["c"]),
        RemoteNode::new("b", "Hardware"),
        RemoteNode::new("c", "Nails"),
    ]);
    reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();

    // Locally moved under Hardware, not yet confirmed
    let hardware = by_content(&db, "Hardware");
    let mut nails = by_content(&db, "Nails");
    nails.parent = Some(hardware.id);
    nails.position = 0;
    nails.pending = Some(JobId::from("move-1"));
    db.transaction(|s| s.put(&mut nails)).unwrap();

    reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();
    let stored = db.node(nails.id).unwrap();
    assert_eq!(stored.parent, Some(hardware.id));
}

#[test]
fn orphan_local_inbox_is_kept() {
    let db = test_db();
    let mut inbox = Node::new("My inbox", Utc::now());
    inbox.is_inbox = true;
    let inbox = put(&db, inbox);

    let report = reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();
    assert_eq!(report.inbox, inbox.id);
    assert_eq!(report.deleted, 0);
    assert_eq!(inbox_count(&db), 1);
}

#[test]
fn remote_values_overwrite_idle_nodes() {
    let db = test_db();
    reconcile(&db, &basic_tree(), &Markers::default(), Utc::now()).unwrap();
    let milk = by_content(&db, "Milk");

    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b", "c"]),
        RemoteNode::new("b", "Whole milk").checked(true),
        RemoteNode::new("c", "Eggs"),
    ]);
    reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();

    let stored = db.node(milk.id).unwrap();
    assert_eq!(stored.content, "Whole milk");
    assert!(stored.checked);
}

#[test]
fn roots_of_all_files_get_dense_positions() {
    let db = test_db();
    let snapshot = RemoteSnapshot::new(vec![
        RemoteFile::new("f1", vec![RemoteNode::new("a", "One")]),
        RemoteFile::new("f2", vec![RemoteNode::new("a", "Two")]),
    ]);
    reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();

    assert_eq!(by_content(&db, "One").position, 0);
    assert_eq!(by_content(&db, "Two").position, 1);
    assert_eq!(
        by_content(&db, "Two").remote_id(),
        Some(RemoteId::new("f2", "a"))
    );
}

#[test]
fn node_changed_during_fetch_survives_stale_snapshot() {
    let db = test_db();
    let t0 = Utc::now();
    reconcile(&db, &basic_tree(), &Markers::default(), t0).unwrap();
    let root = by_content(&db, "Groceries");
    let fetched_at = t0 + Duration::seconds(10);

    // Confirmed remotely after the fetch started, marker already released
    let mut bread = Node::new("Bread", fetched_at + Duration::seconds(1))
        .with_parent(root.id, 2)
        .with_remote_id(RemoteId::new("f", "d"));
    bread.file_id = Some("f".into());
    let bread = put(&db, bread);
    let mut milk = by_content(&db, "Milk");
    milk.content = "Oat milk".into();
    milk.touch(fetched_at + Duration::seconds(1));
    db.transaction(|s| s.put(&mut milk)).unwrap();

    let report = reconcile(&db, &basic_tree(), &Markers::default(), fetched_at).unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.preserved, 1);
    assert_eq!(db.node(bread.id).unwrap().parent, Some(root.id));
    assert_eq!(db.node(milk.id).unwrap().content, "Oat milk");

    // A later snapshot that includes the changes settles them
    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b", "c", "d"]),
        RemoteNode::new("b", "Oat milk"),
        RemoteNode::new("c", "Eggs"),
        RemoteNode::new("d", "Bread"),
    ]);
    let later = fetched_at + Duration::seconds(60);
    let report = reconcile(&db, &snapshot, &Markers::default(), later).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 4);
}

#[test]
fn identity_deleted_during_fetch_is_not_recreated() {
    let db = test_db();
    let t0 = Utc::now();
    reconcile(&db, &basic_tree(), &Markers::default(), t0).unwrap();
    let eggs = by_content(&db, "Eggs");
    let fetched_at = t0 + Duration::seconds(10);
    db.transaction(|s| {
        s.bury(&RemoteId::new("f", "c"), fetched_at + Duration::seconds(1))?;
        s.remove(&[eggs.id])
    })
    .unwrap();

    let report = reconcile(&db, &basic_tree(), &Markers::default(), fetched_at).unwrap();
    assert_eq!(report.created, 0);
    let root = by_content(&db, "Groceries");
    let children: Vec<String> = db
        .children(Some(root.id))
        .unwrap()
        .into_iter()
        .map(|n| n.content)
        .collect();
    assert_eq!(children, vec!["Milk"]);

    // Once a snapshot postdates the delete, the tombstone is dropped
    let later = fetched_at + Duration::seconds(60);
    reconcile(&db, &basic_tree(), &Markers::default(), later).unwrap();
    assert!(db.read(|s| s.buried_since(t0)).unwrap().is_empty());
}

#[test]
fn remote_timestamps_are_capped_at_fetch_start() {
    let db = test_db();
    let fetched_at = Utc::now();
    let future = (fetched_at + Duration::hours(1)).timestamp_millis();
    let mut milk = RemoteNode::new("b", "Milk");
    milk.modified = Some(future);
    let snapshot = one_file(vec![
        RemoteNode::new("a", "Groceries").with_children(["b"]),
        milk,
    ]);
    reconcile(&db, &snapshot, &Markers::default(), fetched_at).unwrap();
    assert_eq!(by_content(&db, "Milk").modified, fetched_at);
}

fn two_files(g_nodes: Vec<RemoteNode>) -> Vec<RemoteFile> {
    vec![
        RemoteFile::new(
            "f",
            vec![
                RemoteNode::new("a", "Groceries").with_children(["b"]),
                RemoteNode::new("b", "Milk"),
            ],
        ),
        RemoteFile::new("g", g_nodes),
    ]
}

#[test]
fn unchanged_documents_are_left_alone() {
    let db = test_db();
    let hardware = vec![
        RemoteNode::new("x", "Hardware").with_children(["y"]),
        RemoteNode::new("y", "Nails"),
    ];
    let catalog = vec![
        FileEntry::document("f", "Shopping", Some(1)),
        FileEntry::document("g", "Workshop", Some(1)),
    ];
    let full = RemoteSnapshot::new(two_files(hardware)).with_catalog(catalog, vec![]);
    reconcile(&db, &full, &Markers::default(), Utc::now()).unwrap();

    // Only `f` changed; `g` is named but not read
    let catalog = vec![
        FileEntry::document("f", "Shopping", Some(2)),
        FileEntry::document("g", "Workshop", Some(1)),
    ];
    let partial = RemoteSnapshot::new(vec![RemoteFile::new(
        "f",
        vec![
            RemoteNode::new("a", "Groceries").with_children(["b"]),
            RemoteNode::new("b", "Whole milk"),
        ],
    )])
    .with_catalog(catalog.clone(), vec!["g".into()]);
    let report = reconcile(&db, &partial, &Markers::default(), Utc::now()).unwrap();

    assert_eq!(report.deleted, 0);
    assert_eq!(by_content(&db, "Whole milk").remote_id(), Some(RemoteId::new("f", "b")));
    assert_eq!(by_content(&db, "Nails").parent, Some(by_content(&db, "Hardware").id));
    assert_eq!(by_content(&db, "Groceries").position, 0);
    assert_eq!(by_content(&db, "Hardware").position, 1);
    assert_eq!(db.inbox().unwrap().unwrap().position, 2);
    assert_eq!(db.files().unwrap(), catalog);
}

#[test]
fn vanished_documents_lose_their_nodes() {
    let db = test_db();
    let hardware = vec![
        RemoteNode::new("x", "Hardware").with_children(["y"]),
        RemoteNode::new("y", "Nails"),
    ];
    reconcile(&db, &RemoteSnapshot::new(two_files(hardware)), &Markers::default(), Utc::now())
        .unwrap();

    let catalog = vec![FileEntry::document("f", "Shopping", Some(1))];
    let snapshot = RemoteSnapshot::new(vec![]).with_catalog(catalog, vec!["f".into()]);
    let report = reconcile(&db, &snapshot, &Markers::default(), Utc::now()).unwrap();

    assert_eq!(report.deleted, 2);
    let contents: Vec<String> = db
        .read(|s| s.all())
        .unwrap()
        .into_iter()
        .map(|n| n.content)
        .collect();
    assert_eq!(contents, vec!["Groceries", "Milk", "Inbox"]);
}

#[test]
fn checkbox_fills_checklist_flag() {
    let db = test_db();
    let snapshot = |checkbox: bool| {
        one_file(vec![
            RemoteNode::new("a", "Groceries").with_children(["b", "c"]),
            RemoteNode::new("b", "Milk").checkbox(checkbox),
            RemoteNode::new("c", "Eggs").checkbox(checkbox),
        ])
    };
    reconcile(&db, &snapshot(true), &Markers::default(), Utc::now()).unwrap();
    assert!(by_content(&db, "Milk").checklist);
    assert!(!by_content(&db, "Groceries").checklist);

    let mut eggs = by_content(&db, "Eggs");
    eggs.pending = Some(JobId::from("edit-3"));
    db.transaction(|s| s.put(&mut eggs)).unwrap();

    reconcile(&db, &snapshot(false), &Markers::default(), Utc::now()).unwrap();
    assert!(!by_content(&db, "Milk").checklist);
    assert!(!by_content(&db, "Eggs").checklist);
}

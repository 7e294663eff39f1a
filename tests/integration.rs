//! End-to-end export tests over real temp directories.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use sigvault::config::ExportConfig;
use sigvault::export::{ExportPaths, export};
use sigvault::model::{ArchiveData, local_datetime};
use sigvault::report::Reporter;
use sigvault::transcript::TranscriptParser;

fn archive_json() -> serde_json::Value {
    serde_json::json!({
        "contacts": {
            "c-alice": {"name": "Alice", "number": "+111", "is_group": false},
            "c-john1": {"name": "John", "number": "+222", "is_group": false},
            "c-john2": {"name": "John", "number": "+333", "is_group": false},
            "g-friends": {"name": "Friends", "is_group": true}
        },
        "conversations": {
            "c-alice": [
                {"type": "incoming", "body": "hi there", "sent_at": 1_700_000_000_000i64,
                 "timestamp": 1_700_000_000_000i64, "conversationId": "c-alice"},
                {"type": "outgoing", "body": "hello back", "sent_at": 1_700_000_060_000i64,
                 "timestamp": 1_700_000_060_000i64, "conversationId": "c-alice",
                 "attachments": [{"path": "ab/cdef", "fileName": "photo 1.jpg",
                                  "contentType": "image/jpeg"}]}
            ],
            "c-john1": [
                {"type": "incoming", "body": "first john", "sent_at": 1_700_000_000_000i64,
                 "timestamp": 1_700_000_000_000i64, "conversationId": "c-john1"}
            ],
            "c-john2": [
                {"type": "incoming", "body": "second john", "sent_at": 1_700_000_000_000i64,
                 "timestamp": 1_700_000_000_000i64, "conversationId": "c-john2"}
            ],
            "g-friends": [
                {"type": "incoming", "body": "group hello", "sent_at": 1_700_000_000_000i64,
                 "timestamp": 1_700_000_000_000i64, "source": "+111",
                 "conversationId": "g-friends",
                 "reactions": [{"fromId": "c-john1", "emoji": "👍"}]}
            ]
        }
    })
}

fn run_export(dest: &Path, attachments_root: Option<&Path>) {
    let data: ArchiveData = serde_json::from_value(archive_json()).unwrap();
    let paths = ExportPaths {
        attachments_root,
        old: None,
        overwrite: false,
    };
    export(
        dest,
        data,
        &paths,
        &ExportConfig::new(),
        &Reporter::default(),
    )
    .unwrap();
}

#[test]
fn test_tree_layout() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    run_export(&dest, None);

    for name in ["Alice", "John", "John2", "Friends"] {
        assert!(dest.join(name).join("index.md").is_file(), "{name}");
        assert!(dest.join(name).join("index.html").is_file(), "{name}");
        assert!(dest.join(name).join("media").is_dir(), "{name}");
    }
    assert!(dest.join("style.css").is_file());
}

#[test]
fn test_colliding_names_resolved_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    run_export(&dest, None);

    // Sorted key order: c-john1 claims "John", c-john2 gets "John2".
    let john = fs::read_to_string(dest.join("John/index.md")).unwrap();
    assert!(john.contains("first john"));
    let john2 = fs::read_to_string(dest.join("John2/index.md")).unwrap();
    assert!(john2.contains("second john"));
}

#[test]
fn test_transcript_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    run_export(&dest, None);

    let parser = TranscriptParser::new();
    let messages = parser.parse_file(&dest.join("Alice/index.md")).unwrap();
    assert_eq!(messages.len(), 2);

    let label = local_datetime(1_700_000_000_000)
        .unwrap()
        .format("%Y-%m-%d %H:%M")
        .to_string();
    let (date, time) = messages[0].date_time();
    assert_eq!(format!("{date} {time}"), label);
    assert_eq!(messages[0].sender_name(), "Alice");
    assert!(messages[0].body.contains("hi there"));
    assert_eq!(messages[1].sender_name(), "Me");
}

#[test]
fn test_group_sender_and_reactions() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    run_export(&dest, None);

    let friends = fs::read_to_string(dest.join("Friends/index.md")).unwrap();
    // Group sender resolved by number scan; reactor resolved by contact id.
    assert!(friends.contains("] Alice: group hello"));
    assert!(friends.contains("(- John: 👍 -)"));
}

#[test]
fn test_attachments_copied_and_referenced() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(store.join("ab")).unwrap();
    fs::write(store.join("ab/cdef"), b"jpeg bytes").unwrap();

    let dest = dir.path().join("out");
    run_export(&dest, Some(&store));

    let stamp = local_datetime(1_700_000_060_000)
        .unwrap()
        .format("%Y-%m-%dT%H-%M-%S%.3f")
        .to_string();
    let expected = format!("{stamp}_00_photo_1.jpg");
    let copied = dest.join("Alice/media").join(&expected);
    assert!(copied.is_file(), "missing {expected}");
    assert_eq!(fs::read(copied).unwrap(), b"jpeg bytes");

    let transcript = fs::read_to_string(dest.join("Alice/index.md")).unwrap();
    assert!(transcript.contains(&format!("![{expected}](./media/{expected})")));
}

#[test]
fn test_html_pagination_over_large_conversation() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");

    let mut conversations = BTreeMap::new();
    let messages: Vec<serde_json::Value> = (0i64..250)
        .map(|i| {
            serde_json::json!({
                "type": "outgoing", "body": format!("message {i}"),
                "sent_at": 1_700_000_000_000i64 + i * 60_000,
                "timestamp": 1_700_000_000_000i64 + i * 60_000,
                "conversationId": "c1"
            })
        })
        .collect();
    conversations.insert("c1".to_string(), serde_json::Value::Array(messages));

    let data: ArchiveData = serde_json::from_value(serde_json::json!({
        "contacts": {"c1": {"name": "Big", "number": "+1", "is_group": false}},
        "conversations": conversations
    }))
    .unwrap();

    export(
        &dest,
        data,
        &ExportPaths::default(),
        &ExportConfig::new().with_messages_per_page(100),
        &Reporter::default(),
    )
    .unwrap();

    let html = fs::read_to_string(dest.join("Big/index.html")).unwrap();
    assert_eq!(html.matches("id=\"pg").count(), 3);
    // Four live nav anchors across three pages; the ends stay dead.
    assert_eq!(html.matches("<a href=\"#pg").count(), 4);
    assert_eq!(html.matches("class=\"msg me\"").count(), 250);
}

#[test]
fn test_quote_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");

    let data: ArchiveData = serde_json::from_value(serde_json::json!({
        "contacts": {"c1": {"name": "Q", "number": "+1", "is_group": false}},
        "conversations": {"c1": [
            {"type": "outgoing", "body": "reply", "sent_at": 1_700_000_000_000i64,
             "timestamp": 1_700_000_000_000i64, "conversationId": "c1",
             "quote": {"text": "the original"}}
        ]}
    }))
    .unwrap();

    export(
        &dest,
        data.clone(),
        &ExportPaths::default(),
        &ExportConfig::new().with_html(false),
        &Reporter::default(),
    )
    .unwrap();
    let with = fs::read_to_string(dest.join("Q/index.md")).unwrap();
    assert!(with.contains("\n>\n> the original\n>\n"));

    let dest2 = dir.path().join("out2");
    export(
        &dest2,
        data,
        &ExportPaths::default(),
        &ExportConfig::new().with_html(false).with_include_quote(false),
        &Reporter::default(),
    )
    .unwrap();
    let without = fs::read_to_string(dest2.join("Q/index.md")).unwrap();
    assert!(!without.contains('>'));
}

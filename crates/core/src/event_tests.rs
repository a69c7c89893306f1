// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn serializes_with_snake_case_kind() {
    let event = FileEvent::new("Ingest/note.md", FileEventKind::Created, 1700000000000);
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"created\""), "json: {json}");
    assert!(json.contains("Ingest/note.md"));
}

#[test]
fn json_round_trip_preserves_event() {
    let event = FileEvent::new("A/b c.md", FileEventKind::Modified, 42);
    let json = serde_json::to_string(&event).unwrap();
    let back: FileEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn missing_optional_fields_default() {
    let back: FileEvent =
        serde_json::from_str(r#"{"path":"x.md","kind":"deleted"}"#).unwrap();
    assert_eq!(back.kind, FileEventKind::Deleted);
    assert_eq!(back.timestamp_ms, 0);
    assert!(!back.is_directory);
}

#[test]
fn source_stem_drops_extension() {
    let event = FileEvent::new("Ingest/Clippings/article.md", FileEventKind::Created, 0);
    assert_eq!(event.source_stem(), "article");
}

#[test]
fn log_summary_names_kind_and_path() {
    let event = FileEvent::new("In/a.md", FileEventKind::Created, 0);
    assert_eq!(event.log_summary(), "created In/a.md");
}

proptest! {
    #[test]
    fn round_trips_arbitrary_paths(
        segs in proptest::collection::vec("[a-zA-Z0-9 _.-]{1,12}", 1..4),
        ts in any::<u64>(),
    ) {
        let path: PathBuf = segs.iter().collect();
        let event = FileEvent::new(path, FileEventKind::Created, ts);
        let json = serde_json::to_string(&event).unwrap();
        let back: FileEvent = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, event);
    }
}

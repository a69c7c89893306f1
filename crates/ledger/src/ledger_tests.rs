// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;
use vo_config::registry::TriggerEvent;
use vo_core::FileEventKind;

struct LedgerFixture {
    _dir: tempfile::TempDir,
    ledger: TaskLedger,
}

fn fixture() -> LedgerFixture {
    let dir = tempfile::tempdir().unwrap();
    let ledger = TaskLedger::new(
        dir.path(),
        Path::new("_Settings_/Tasks"),
        Path::new("_Settings_/Logs"),
    );
    LedgerFixture { _dir: dir, ledger }
}

fn agent() -> AgentDefinition {
    AgentDefinition::fixture("EIC").with_trigger("In/*.md", TriggerEvent::Created)
}

fn event(path: &str) -> FileEvent {
    FileEvent::new(path, FileEventKind::Created, 123)
}

#[test]
fn create_writes_expected_filename_and_schema() {
    let f = fixture();
    let path = f
        .ledger
        .create(&agent(), &event("In/a note.md"), TaskStatus::InProgress, Some("x.log"))
        .unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    assert_eq!(name, format!("{today} EIC - a note.md"));

    let record = f.ledger.read_task(&path).unwrap();
    assert_eq!(record.frontmatter.status, TaskStatus::InProgress);
    assert_eq!(record.frontmatter.task_type, "EIC");
    assert_eq!(record.frontmatter.worker, "claude_code");
    assert_eq!(record.frontmatter.priority, "medium");
    assert_eq!(record.frontmatter.title, "EIC - a note");
    assert_eq!(
        record.frontmatter.execution_log.as_deref(),
        Some("[[_Settings_/Logs/x.log]]")
    );
    // Not queued: no trigger data persisted
    assert!(record.frontmatter.trigger_data_json.is_none());
    assert!(record.frontmatter.completed.is_none());
}

#[test]
fn queued_task_persists_deserializable_trigger() {
    let f = fixture();
    let original = event("In/b.md");
    let path = f
        .ledger
        .create(&agent(), &original, TaskStatus::Queued, None)
        .unwrap();

    let record = f.ledger.read_task(&path).unwrap();
    assert_eq!(record.frontmatter.trigger_event(), Some(original));
}

#[test]
fn update_status_sets_completed_and_appends_log() {
    let f = fixture();
    let path = f
        .ledger
        .create(&agent(), &event("In/c.md"), TaskStatus::InProgress, None)
        .unwrap();

    f.ledger
        .update_status(&path, TaskStatus::Failed, Some("exit code 3"), None)
        .unwrap();

    let record = f.ledger.read_task(&path).unwrap();
    assert_eq!(record.frontmatter.status, TaskStatus::Failed);
    assert!(record.frontmatter.completed.is_some());
    assert!(record.body.contains("exit code 3"));
    assert!(record.body.contains("status FAILED"));
}

#[test]
fn terminal_status_is_never_downgraded() {
    let f = fixture();
    let path = f
        .ledger
        .create(&agent(), &event("In/d.md"), TaskStatus::InProgress, None)
        .unwrap();
    f.ledger
        .update_status(&path, TaskStatus::Processed, None, None)
        .unwrap();

    let err = f
        .ledger
        .update_status(&path, TaskStatus::InProgress, None, None)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Transition(_)));

    let record = f.ledger.read_task(&path).unwrap();
    assert_eq!(record.frontmatter.status, TaskStatus::Processed);
}

#[test]
fn scan_queued_is_fifo_by_filename() {
    let f = fixture();
    let a1 = AgentDefinition::fixture("AAA").with_trigger("In/*.md", TriggerEvent::Created);
    let a2 = AgentDefinition::fixture("BBB").with_trigger("In/*.md", TriggerEvent::Created);

    f.ledger
        .create(&a2, &event("In/second.md"), TaskStatus::Queued, None)
        .unwrap();
    f.ledger
        .create(&a1, &event("In/first.md"), TaskStatus::Queued, None)
        .unwrap();
    // One running task that must not be yielded
    f.ledger
        .create(&a1, &event("In/busy.md"), TaskStatus::InProgress, None)
        .unwrap();

    let queued = f.ledger.scan_queued();
    let types: Vec<_> = queued.iter().map(|q| q.task_type.as_str()).collect();
    // Same date prefix for all, so the abbreviation decides the order.
    assert_eq!(types, vec!["AAA", "BBB"]);
    assert_eq!(queued[0].event.path, Path::new("In/first.md"));
}

#[test]
fn scan_queued_skips_foreign_markdown() {
    let f = fixture();
    std::fs::create_dir_all(f.ledger.tasks_dir()).unwrap();
    std::fs::write(
        f.ledger.tasks_dir().join("stray-note.md"),
        "just a note, no frontmatter\n",
    )
    .unwrap();

    assert!(f.ledger.scan_queued().is_empty());
}

#[test]
fn scan_in_progress_surfaces_stranded_tasks() {
    let f = fixture();
    f.ledger
        .create(&agent(), &event("In/run.md"), TaskStatus::InProgress, None)
        .unwrap();
    f.ledger
        .create(&agent(), &event("In/wait.md"), TaskStatus::Queued, None)
        .unwrap();

    assert_eq!(f.ledger.scan_in_progress().len(), 1);
}

#[test]
fn same_day_collision_overwrites() {
    let f = fixture();
    let first = f
        .ledger
        .create(&agent(), &event("In/same.md"), TaskStatus::Queued, None)
        .unwrap();
    let second = f
        .ledger
        .create(&agent(), &event("In/same.md"), TaskStatus::Queued, None)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(f.ledger.scan_queued().len(), 1);
}

#[test]
fn dispatch_update_records_status_and_log_link_in_one_write() {
    let f = fixture();
    let path = f
        .ledger
        .create(&agent(), &event("In/q.md"), TaskStatus::Queued, None)
        .unwrap();

    // The single dispatch write moves the status and records the log link.
    f.ledger
        .update_status(
            &path,
            TaskStatus::InProgress,
            Some("dispatched from queue"),
            Some("later.log"),
        )
        .unwrap();

    let record = f.ledger.read_task(&path).unwrap();
    assert_eq!(record.frontmatter.status, TaskStatus::InProgress);
    assert_eq!(
        record.frontmatter.execution_log.as_deref(),
        Some("[[_Settings_/Logs/later.log]]")
    );
    assert!(record.body.contains("dispatched from queue"));
}

#[test]
fn duplicate_probe_sees_running_and_done_tasks_today() {
    let f = fixture();
    let source = Path::new("In/today.md");
    assert!(!f.ledger.has_task_today("EIC", source));

    let path = f
        .ledger
        .create(&agent(), &event("In/today.md"), TaskStatus::InProgress, None)
        .unwrap();
    assert!(f.ledger.has_task_today("EIC", source));

    f.ledger
        .update_status(&path, TaskStatus::Processed, None, None)
        .unwrap();
    assert!(f.ledger.has_task_today("EIC", source));

    // A queued task does not suppress re-triggering
    let other = AgentDefinition::fixture("OTH").with_trigger("In/*.md", TriggerEvent::Created);
    f.ledger
        .create(&other, &event("In/today.md"), TaskStatus::Queued, None)
        .unwrap();
    assert!(!f.ledger.has_task_today("OTH", source));
}

#[test]
fn no_tmp_files_left_behind_after_update() {
    let f = fixture();
    let path = f
        .ledger
        .create(&agent(), &event("In/t.md"), TaskStatus::InProgress, None)
        .unwrap();
    f.ledger
        .update_status(&path, TaskStatus::Processed, None, None)
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(f.ledger.tasks_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

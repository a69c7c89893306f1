// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vo_core::FileEventKind;

fn event() -> FileEvent {
    FileEvent::new("Ingest/Clippings/article.md", FileEventKind::Created, 99)
}

#[test]
fn render_and_reparse_preserves_frontmatter() {
    let frontmatter = TaskFrontmatter {
        title: "EIC - article".to_string(),
        created: "2026-08-01T09:00:00+02:00".to_string(),
        completed: None,
        status: TaskStatus::Queued,
        worker: "claude_code".to_string(),
        priority: "medium".to_string(),
        task_type: "EIC".to_string(),
        trigger_data_json: Some(serde_json::to_string(&event()).unwrap()),
        execution_log: None,
    };
    let body = initial_body(&event(), "Do it.", &frontmatter.created, TaskStatus::Queued);
    let text = render(&frontmatter, &body).unwrap();

    let parsed = vo_config::frontmatter::parse(&text);
    let value = serde_yaml::to_value(&parsed.fields).unwrap();
    let back: TaskFrontmatter = serde_yaml::from_value(value).unwrap();
    assert_eq!(back, frontmatter);
    assert_eq!(parsed.body, body);
}

#[test]
fn trigger_data_round_trips_through_yaml_and_json() {
    let original = event();
    let frontmatter = TaskFrontmatter {
        title: "T".to_string(),
        created: "now".to_string(),
        completed: None,
        status: TaskStatus::Queued,
        worker: "claude_code".to_string(),
        priority: "medium".to_string(),
        task_type: "EIC".to_string(),
        trigger_data_json: Some(serde_json::to_string(&original).unwrap()),
        execution_log: None,
    };
    let text = render(&frontmatter, "\nbody\n").unwrap();

    // YAML load → JSON parse → equivalent event
    let parsed = vo_config::frontmatter::parse(&text);
    let value = serde_yaml::to_value(&parsed.fields).unwrap();
    let back: TaskFrontmatter = serde_yaml::from_value(value).unwrap();
    assert_eq!(back.trigger_event(), Some(original));
}

#[test]
fn trigger_data_survives_quotes_in_paths() {
    let original = FileEvent::new(r#"In/has "quotes" here.md"#, FileEventKind::Created, 7);
    let frontmatter = TaskFrontmatter {
        title: "T".to_string(),
        created: "now".to_string(),
        completed: None,
        status: TaskStatus::Queued,
        worker: "claude_code".to_string(),
        priority: "medium".to_string(),
        task_type: "X".to_string(),
        trigger_data_json: Some(serde_json::to_string(&original).unwrap()),
        execution_log: None,
    };
    let text = render(&frontmatter, "\n").unwrap();

    let parsed = vo_config::frontmatter::parse(&text);
    let value = serde_yaml::to_value(&parsed.fields).unwrap();
    let back: TaskFrontmatter = serde_yaml::from_value(value).unwrap();
    assert_eq!(back.trigger_event(), Some(original));
}

#[test]
fn initial_body_has_all_sections_in_order() {
    let body = initial_body(&event(), "The prompt.", "2026-08-01T09:00:00", TaskStatus::InProgress);
    let input = body.find("## Input").unwrap();
    let output = body.find("## Output").unwrap();
    let instructions = body.find("## Instructions").unwrap();
    let process = body.find("## Process Log").unwrap();
    let eval = body.find("## Evaluation Log").unwrap();
    assert!(input < output && output < instructions && instructions < process && process < eval);
    assert!(body.contains("[[Ingest/Clippings/article]]"));
    assert!(body.contains("created Ingest/Clippings/article.md"));
    assert!(body.contains("The prompt."));
}

#[test]
fn process_entries_append_in_order() {
    let body = initial_body(&event(), "p", "t0", TaskStatus::Queued);
    let body = append_process_entry(&body, "t1 status IN_PROGRESS");
    let body = append_process_entry(&body, "t2 status PROCESSED");

    let first = body.find("t1 status IN_PROGRESS").unwrap();
    let second = body.find("t2 status PROCESSED").unwrap();
    let eval = body.find("## Evaluation Log").unwrap();
    assert!(first < second && second < eval);
}

#[test]
fn append_without_eval_section_still_appends() {
    let body = append_process_entry("## Process Log\n", "late entry");
    assert!(body.contains("late entry"));
}

#[test]
fn unreadable_trigger_data_is_none() {
    let frontmatter = TaskFrontmatter {
        title: "T".to_string(),
        created: "now".to_string(),
        completed: None,
        status: TaskStatus::Queued,
        worker: "claude_code".to_string(),
        priority: "medium".to_string(),
        task_type: "X".to_string(),
        trigger_data_json: Some("{not json".to_string()),
        execution_log: None,
    };
    assert_eq!(frontmatter.trigger_event(), None);
}

//! Integration tests for the normalization boundary.
//!
//! Tests verify:
//! 1. Required-column and empty-table validation
//! 2. Date-format validation across the whole table
//! 3. Skill-group filtering (case-insensitive, trimmed, empty-result fails)
//! 4. Per-row time-parse dropping vs whole-load failure
//! 5. Overnight rollover and the start < end invariant
//! 6. Normalization is deterministic (re-running is a no-op)

use timeflow_core::{
    activity::{extract_unique_skills, load_activity, RawActivityRow, ACTIVITY_COLUMNS},
    error::AllocError,
    types::check_columns,
};

fn raw(
    agent: &str,
    date: &str,
    start: &str,
    end: &str,
    main: &str,
    func: &str,
    skill: &str,
) -> RawActivityRow {
    RawActivityRow {
        agent_id: agent.into(),
        activity_date: date.into(),
        start_time: start.into(),
        end_time: end.into(),
        main_activity: main.into(),
        functional_group: func.into(),
        skill_group: skill.into(),
    }
}

fn chat_row(agent: &str) -> RawActivityRow {
    raw(agent, "01.02.2024", "09:00", "10:00", "Чат", "OMNI", "Группа 1")
}

fn groups(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_columns_are_reported_together() {
    let present = vec!["masterId".to_string(), "activity_date".to_string()];
    let err = check_columns("activity", &present, ACTIVITY_COLUMNS).unwrap_err();
    match err {
        AllocError::MissingColumns { table, columns } => {
            assert_eq!(table, "activity");
            assert!(columns.contains("start_time"));
            assert!(columns.contains("Скилл-группа"));
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn empty_table_fails() {
    let err = load_activity(&[], &groups(&["Группа 1"])).unwrap_err();
    assert!(matches!(err, AllocError::EmptyTable { table: "activity" }));
}

#[test]
fn bad_date_format_fails_whole_load() {
    let rows = [
        chat_row("A1"),
        raw("A2", "02/01/2024", "09:00", "10:00", "Чат", "OMNI", "Группа 1"),
    ];
    let err = load_activity(&rows, &groups(&["Группа 1"])).unwrap_err();
    assert!(matches!(err, AllocError::BadDateFormat { .. }));
}

#[test]
fn both_date_patterns_are_accepted() {
    let rows = [
        chat_row("A1"),
        raw("A2", "2024-02-01", "09:00", "10:00", "Чат", "OMNI", "Группа 1"),
    ];
    let records = load_activity(&rows, &groups(&["Группа 1"])).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, records[1].date);
}

#[test]
fn skill_filter_is_case_insensitive_and_trimmed() {
    let rows = [raw("A1", "01.02.2024", "09:00", "10:00", "Чат", "OMNI", "  ГРУППА 1  ")];
    let records = load_activity(&rows, &groups(&["группа 1"])).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].skill_lower, "группа 1");
}

#[test]
fn no_matching_skill_groups_is_a_validation_error() {
    let err = load_activity(&[chat_row("A1")], &groups(&["Другая группа"])).unwrap_err();
    assert!(matches!(err, AllocError::NoRowsForSkillGroups));
}

#[test]
fn unparseable_time_rows_are_dropped_individually() {
    let rows = [
        chat_row("A1"),
        raw("A2", "01.02.2024", "junk", "10:00", "Чат", "OMNI", "Группа 1"),
    ];
    let records = load_activity(&rows, &groups(&["Группа 1"])).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].agent_id, "A1");
}

#[test]
fn all_rows_unparseable_fails_the_load() {
    let rows = [raw("A1", "01.02.2024", "junk", "junk", "Чат", "OMNI", "Группа 1")];
    let err = load_activity(&rows, &groups(&["Группа 1"])).unwrap_err();
    assert!(matches!(err, AllocError::NoParseableTimestamps { table: "activity" }));
}

#[test]
fn overnight_shift_rolls_end_forward() {
    let rows = [raw("A1", "01.02.2024", "22:00", "06:00", "Чат", "OMNI", "Группа 1")];
    let records = load_activity(&rows, &groups(&["Группа 1"])).unwrap();
    let rec = &records[0];
    assert!(rec.start < rec.end);
    assert_eq!(rec.duration_minutes(), 8 * 60);
    assert_eq!(rec.end.date(), rec.date.succ_opt().unwrap());
}

#[test]
fn normalization_is_deterministic() {
    let rows = [chat_row("A1"), chat_row("A2")];
    let first = load_activity(&rows, &groups(&["Группа 1"])).unwrap();
    let second = load_activity(&rows, &groups(&["Группа 1"])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn derived_lowercase_fields_are_normalized() {
    let rows = [raw("A1", "01.02.2024", "09:00", "10:00", " ЧАТ ", " Omni-линия ", "Группа 1")];
    let records = load_activity(&rows, &groups(&["Группа 1"])).unwrap();
    assert_eq!(records[0].main_activity_lower, "чат");
    assert_eq!(records[0].func_lower, "omni-линия");
}

#[test]
fn unique_skills_are_sorted_and_deduplicated() {
    let rows = [
        raw("A1", "01.02.2024", "09:00", "10:00", "Чат", "OMNI", " Группа 2 "),
        raw("A2", "01.02.2024", "09:00", "10:00", "Чат", "OMNI", "Группа 1"),
        raw("A3", "01.02.2024", "09:00", "10:00", "Чат", "OMNI", "Группа 2"),
        raw("A4", "01.02.2024", "09:00", "10:00", "Чат", "OMNI", "nan"),
        raw("A5", "01.02.2024", "09:00", "10:00", "Чат", "OMNI", "  "),
    ];
    assert_eq!(extract_unique_skills(&rows), vec!["Группа 1", "Группа 2"]);
}

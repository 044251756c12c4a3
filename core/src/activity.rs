//! Activity Normalizer — turns raw per-agent activity rows into typed
//! intervals with derived lowercase classification fields.
//!
//! Validation happens once, here. Downstream modules never see a raw
//! row and never re-check field presence or formats.

use crate::{
    error::{AllocError, AllocResult},
    types::{normalize_label, AgentId},
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column headers of the uploaded activity file.
pub const ACTIVITY_COLUMNS: &[&str] = &[
    "masterId",
    "activity_date",
    "start_time",
    "end_time",
    "main_act",
    "Основной функционал",
    "Скилл-группа",
];

/// One row of the uploaded activity file, field-for-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawActivityRow {
    #[serde(rename = "masterId")]
    pub agent_id: String,
    pub activity_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "main_act")]
    pub main_activity: String,
    #[serde(rename = "Основной функционал")]
    pub functional_group: String,
    #[serde(rename = "Скилл-группа")]
    pub skill_group: String,
}

/// A validated activity interval. `start < end` strictly; `end` is
/// rolled forward one day when the raw row crosses midnight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityRecord {
    pub agent_id: AgentId,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub main_activity: String,
    pub main_activity_lower: String,
    pub func_lower: String,
    pub skill_lower: String,
}

impl ActivityRecord {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Parse a calendar date in one of the two accepted patterns.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Load and filter activity by the selected skill groups.
///
/// Failure modes (all abort the load):
///   - empty input table
///   - any `activity_date` outside the two accepted date patterns
///   - no rows left after the skill-group filter
///   - every row has an unparseable start or end time
///
/// Rows whose times fail to parse individually are dropped, not
/// defaulted. Raw end <= raw start means an overnight shift: the end
/// rolls forward one day.
pub fn load_activity(
    rows: &[RawActivityRow],
    skill_groups: &[String],
) -> AllocResult<Vec<ActivityRecord>> {
    log::info!("activity: normalizing {} raw rows", rows.len());
    if rows.is_empty() {
        return Err(AllocError::EmptyTable { table: "activity" });
    }

    // Date format is validated across the whole table up front, before
    // any filtering, so a malformed file fails loudly even when the
    // bad rows would have been filtered out.
    for row in rows {
        if parse_date(&row.activity_date).is_none() {
            return Err(AllocError::BadDateFormat {
                value: row.activity_date.clone(),
            });
        }
    }

    let filter: Vec<String> = skill_groups.iter().map(|s| normalize_label(s)).collect();
    let selected: Vec<&RawActivityRow> = rows
        .iter()
        .filter(|r| filter.contains(&normalize_label(&r.skill_group)))
        .collect();
    if selected.is_empty() {
        return Err(AllocError::NoRowsForSkillGroups);
    }

    let mut records = Vec::with_capacity(selected.len());
    for row in &selected {
        // Date was validated above; times may still be garbage per row.
        let date = match parse_date(&row.activity_date) {
            Some(d) => d,
            None => continue,
        };
        let (start_time, end_time) = match (parse_time(&row.start_time), parse_time(&row.end_time))
        {
            (Some(s), Some(e)) => (s, e),
            _ => continue,
        };

        let start = date.and_time(start_time);
        let mut end = date.and_time(end_time);
        if end <= start {
            // Overnight shift convention.
            end += Duration::days(1);
        }

        records.push(ActivityRecord {
            agent_id: row.agent_id.clone(),
            date,
            start,
            end,
            main_activity: row.main_activity.clone(),
            main_activity_lower: normalize_label(&row.main_activity),
            func_lower: normalize_label(&row.functional_group),
            skill_lower: normalize_label(&row.skill_group),
        });
    }

    if records.is_empty() {
        return Err(AllocError::NoParseableTimestamps { table: "activity" });
    }

    log::info!(
        "activity: normalized, kept {} of {} selected rows",
        records.len(),
        selected.len()
    );
    Ok(records)
}

/// Distinct skill groups present in a raw activity file, for the
/// caller's skill-group picker. Trimmed, blank and "nan" dropped,
/// sorted.
pub fn extract_unique_skills(rows: &[RawActivityRow]) -> Vec<String> {
    let skills: BTreeSet<String> = rows
        .iter()
        .map(|r| r.skill_group.trim().to_string())
        .filter(|s| !s.is_empty() && s.to_lowercase() != "nan")
        .collect();
    skills.into_iter().collect()
}

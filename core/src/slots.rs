//! Slot Normalizer — turns raw imbalance rows into typed half-hour
//! slots carrying signed delta-minutes.

use crate::{
    activity::parse_date,
    error::{AllocError, AllocResult},
};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Fixed slot granularity: every slot is exactly half an hour.
pub const SLOT_MINUTES: i64 = 30;

/// Column headers of the uploaded slot file.
pub const SLOT_COLUMNS: &[&str] = &["Дата", "Время", "Дельта"];

/// One row of the uploaded slot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSlotRow {
    #[serde(rename = "Дата")]
    pub date: String,
    #[serde(rename = "Время")]
    pub time: String,
    #[serde(rename = "Дельта")]
    pub delta: String,
}

/// A validated half-hour slot. `end - start` is always exactly
/// [`SLOT_MINUTES`]; `delta_min` is signed minutes of imbalance
/// (negative = calls deficit, pull agents from chat into calls).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotRecord {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub delta_min: f64,
}

fn parse_slot_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    // Strict HH:MM only — the slot file has no seconds.
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Parse a delta given in hours, accepting comma or dot as the decimal
/// separator, and convert it to signed minutes.
fn parse_delta_minutes(value: &str) -> Option<f64> {
    let normalized = value.trim().replace(',', ".");
    normalized.parse::<f64>().ok().map(|hours| hours * 60.0)
}

/// Load and validate the slot table.
///
/// All failures abort the load: empty table, a time outside strict
/// HH:MM, a non-numeric delta, a date outside the two accepted
/// patterns. Window end is start + 30 minutes unconditionally.
pub fn load_slots(rows: &[RawSlotRow]) -> AllocResult<Vec<SlotRecord>> {
    log::info!("slots: normalizing {} raw rows", rows.len());
    if rows.is_empty() {
        return Err(AllocError::EmptyTable { table: "slots" });
    }

    let mut slots = Vec::with_capacity(rows.len());
    for row in rows {
        let time = parse_slot_time(&row.time).ok_or_else(|| AllocError::BadTimeFormat {
            value: row.time.clone(),
        })?;
        let delta_min = parse_delta_minutes(&row.delta).ok_or_else(|| AllocError::BadDelta {
            value: row.delta.clone(),
        })?;
        let date = parse_date(&row.date).ok_or_else(|| AllocError::BadDateFormat {
            value: row.date.clone(),
        })?;

        let start = date.and_time(time);
        slots.push(SlotRecord {
            start,
            end: start + Duration::minutes(SLOT_MINUTES),
            delta_min,
        });
    }

    log::info!("slots: normalized {} slots", slots.len());
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, time: &str, delta: &str) -> RawSlotRow {
        RawSlotRow {
            date: date.into(),
            time: time.into(),
            delta: delta.into(),
        }
    }

    #[test]
    fn comma_decimal_and_hour_conversion() {
        let slots = load_slots(&[row("01.02.2024", "09:00", "-0,5")]).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].delta_min, -30.0);
        assert_eq!((slots[0].end - slots[0].start).num_minutes(), SLOT_MINUTES);
    }

    #[test]
    fn strict_time_format() {
        let err = load_slots(&[row("01.02.2024", "9:00", "1")]).unwrap_err();
        assert!(matches!(err, AllocError::BadTimeFormat { .. }));
    }

    #[test]
    fn bad_delta_fails_whole_load() {
        let rows = [row("01.02.2024", "09:00", "0.5"), row("01.02.2024", "09:30", "abc")];
        let err = load_slots(&rows).unwrap_err();
        assert!(matches!(err, AllocError::BadDelta { .. }));
    }

    #[test]
    fn iso_dates_accepted() {
        let slots = load_slots(&[row("2024-02-01", "10:30", "1")]).unwrap();
        assert_eq!(slots[0].delta_min, 60.0);
    }
}

//! Supergroup Builder — merges contiguous same-direction slots into
//! larger demand blocks.
//!
//! A multi-slot deficit is best covered by one agent working one
//! continuous stretch rather than many separately-sourced fragments,
//! so adjacent slots with the same sign become a single coverage
//! target. Any time gap or sign flip closes the current group.

use crate::{
    slots::SlotRecord,
    types::Activity,
};
use chrono::NaiveDateTime;

/// Direction of a slot's imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaSign {
    /// delta < 0: calls coverage is short, pull agents from chat into calls.
    CallsDeficit,
    /// delta > 0: the inverse, pull agents from calls into chat.
    ChatDeficit,
}

impl DeltaSign {
    /// Zero-delta slots carry no demand and join no group.
    pub fn from_delta(delta_min: f64) -> Option<DeltaSign> {
        if delta_min < 0.0 {
            Some(DeltaSign::CallsDeficit)
        } else if delta_min > 0.0 {
            Some(DeltaSign::ChatDeficit)
        } else {
            None
        }
    }

    /// The activity agents are redirected *to*.
    pub const fn target(self) -> Activity {
        match self {
            DeltaSign::CallsDeficit => Activity::InboundCalls,
            DeltaSign::ChatDeficit => Activity::Chat,
        }
    }

    /// The activity agents are pulled *from*.
    pub const fn source(self) -> Activity {
        self.target().opposite()
    }
}

/// A maximal run of contiguous same-sign slots, treated as one demand
/// block. Built fresh per allocation run, never persisted.
#[derive(Debug, Clone)]
pub struct Supergroup {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub sign: DeltaSign,
    /// Sum of member slots' absolute delta-minutes.
    pub total_needed_min: f64,
    pub slots: Vec<SlotRecord>,
}

/// Sort slots by window start and fold adjacent same-sign slots into
/// supergroups. A slot is adjacent when its start equals the previous
/// slot's end exactly.
pub fn build_supergroups(mut slots: Vec<SlotRecord>) -> Vec<Supergroup> {
    slots.sort_by_key(|s| s.start);

    let mut groups: Vec<Supergroup> = Vec::new();
    for slot in slots {
        let sign = match DeltaSign::from_delta(slot.delta_min) {
            Some(sign) => sign,
            None => continue,
        };

        match groups.last_mut() {
            Some(group) if group.sign == sign && group.end == slot.start => {
                group.end = slot.end;
                group.total_needed_min += slot.delta_min.abs();
                group.slots.push(slot);
            }
            _ => {
                groups.push(Supergroup {
                    start: slot.start,
                    end: slot.end,
                    sign,
                    total_needed_min: slot.delta_min.abs(),
                    slots: vec![slot],
                });
            }
        }
    }

    log::debug!("supergroups: built {} groups", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn slot(h: u32, m: u32, delta_min: f64) -> SlotRecord {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        SlotRecord {
            start,
            end: start + Duration::minutes(30),
            delta_min,
        }
    }

    #[test]
    fn contiguous_same_sign_slots_merge() {
        let groups = build_supergroups(vec![
            slot(9, 0, -20.0),
            slot(9, 30, -10.0),
            slot(10, 0, -15.0),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_needed_min, 45.0);
        assert_eq!(groups[0].sign, DeltaSign::CallsDeficit);
        assert_eq!(groups[0].slots.len(), 3);
    }

    #[test]
    fn sign_change_splits_groups() {
        let groups = build_supergroups(vec![
            slot(9, 0, -20.0),
            slot(9, 30, 5.0),
            slot(10, 0, -15.0),
        ]);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].sign, DeltaSign::ChatDeficit);
    }

    #[test]
    fn time_gap_splits_groups() {
        let groups = build_supergroups(vec![slot(9, 0, -20.0), slot(10, 0, -15.0)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn zero_delta_slots_are_skipped() {
        let groups = build_supergroups(vec![slot(9, 0, 0.0)]);
        assert!(groups.is_empty());
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let groups = build_supergroups(vec![slot(9, 30, -10.0), slot(9, 0, -20.0)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_needed_min, 30.0);
    }
}

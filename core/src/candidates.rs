//! Candidate Selector — for a demand window, finds agent records whose
//! recorded activity overlaps it, split into full and partial tiers.

use crate::{
    activity::ActivityRecord,
    overlap::overlap_minutes,
    types::{is_omni, Activity},
};
use chrono::NaiveDateTime;

/// An eligible agent record, by index into the caller's pool.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub index: usize,
    pub overlap: i64,
}

/// Candidates for one demand window, each tier ranked by descending
/// overlap (stable — ties keep original row order).
#[derive(Debug, Default)]
pub struct CandidateTiers {
    /// overlap >= the configured minimum interval.
    pub full: Vec<Candidate>,
    /// Any positive overlap. Empty unless partial coverage is enabled.
    pub partial: Vec<Candidate>,
}

/// Select and rank candidates for `[win_start, win_end)`.
///
/// Eligibility: the record's main activity matches `source` (the
/// activity being pulled from) and its functional group carries the
/// omni marker. The partial tier is a superset filter (any overlap),
/// so a full-tier record appears in both tiers.
pub fn select_candidates(
    pool: &[ActivityRecord],
    win_start: NaiveDateTime,
    win_end: NaiveDateTime,
    source: Activity,
    min_interval: i64,
    partial_coverage: bool,
) -> CandidateTiers {
    let mut tiers = CandidateTiers::default();

    for (index, rec) in pool.iter().enumerate() {
        if !is_omni(&rec.func_lower) || !source.matches_label(&rec.main_activity_lower) {
            continue;
        }
        let overlap = overlap_minutes(rec.start, rec.end, win_start, win_end);
        if overlap <= 0 {
            continue;
        }
        if overlap >= min_interval {
            tiers.full.push(Candidate { index, overlap });
        }
        if partial_coverage {
            tiers.partial.push(Candidate { index, overlap });
        }
    }

    // Stable sorts: ties keep original row order.
    tiers.full.sort_by(|a, b| b.overlap.cmp(&a.overlap));
    tiers.partial.sort_by(|a, b| b.overlap.cmp(&a.overlap));
    tiers
}

//! Assignment Allocator — the greedy core.
//!
//! Two strategies:
//!   - mass: every omni agent on the source activity is redirected for
//!     its whole recorded interval, no slot input needed.
//!   - by-delta, per supergroup:
//!       1. whole-block attempt — one agent covers the whole group
//!       2. per-slot full-coverage stitching across the group's slots
//!       3. partial best-fit for leftover slots
//!
//! Task ids are surrogate integers, one per distinct (agent, date)
//! pair seen during the run, first-seen-wins from 1. The id map is
//! owned by the run's call frame — there is no process-wide counter.

use crate::{
    activity::ActivityRecord,
    candidates::{select_candidates, Candidate},
    slots::SLOT_MINUTES,
    supergroup::Supergroup,
    types::{is_omni, Activity, AgentId},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the allocation output, before interval merging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentTask {
    pub task_id: u32,
    pub agent_id: AgentId,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    /// The activity the agent is redirected *to*.
    pub assigned_activity: Activity,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub assigned_minutes: i64,
}

impl AssignmentTask {
    /// Fixed descriptive fields of the output table.
    pub const DATE_CHOICE: &'static str = "Равномерно";
    pub const CATEGORY: &'static str = "Работа на линии";
    pub const TIME_CHOICE: &'static str = "Интервал";
}

/// Per-run mapping (agent, date) -> task id, first-seen-wins from 1.
#[derive(Debug, Default)]
pub struct TaskIdMap {
    map: HashMap<(AgentId, NaiveDate), u32>,
    next: u32,
}

impl TaskIdMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            next: 1,
        }
    }

    pub fn id_for(&mut self, agent_id: &str, date: NaiveDate) -> u32 {
        let next = &mut self.next;
        *self
            .map
            .entry((agent_id.to_string(), date))
            .or_insert_with(|| {
                let id = *next;
                *next += 1;
                id
            })
    }
}

fn make_task(
    ids: &mut TaskIdMap,
    agent_id: &str,
    target: Activity,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    assigned_minutes: i64,
) -> AssignmentTask {
    let date = window_start.date();
    AssignmentTask {
        task_id: ids.id_for(agent_id, date),
        agent_id: agent_id.to_string(),
        date_start: date,
        date_end: date,
        assigned_activity: target,
        window_start,
        window_end,
        assigned_minutes,
    }
}

// ── Mass strategy ──────────────────────────────────────────────────

/// Redirect every omni agent record on the opposite activity to
/// `target`, for its exact recorded interval.
pub fn assign_mass(
    pool: &[ActivityRecord],
    target: Activity,
    ids: &mut TaskIdMap,
) -> Vec<AssignmentTask> {
    let source = target.opposite();
    let mut tasks = Vec::new();

    for rec in pool {
        if !is_omni(&rec.func_lower) || !source.matches_label(&rec.main_activity_lower) {
            continue;
        }
        tasks.push(make_task(
            ids,
            &rec.agent_id,
            target,
            rec.start,
            rec.end,
            rec.duration_minutes(),
        ));
    }

    log::info!("mass: emitted {} assignments toward {}", tasks.len(), target);
    tasks
}

// ── By-delta strategy ──────────────────────────────────────────────

/// Merge an agent's source-activity intervals clipped to
/// `[span_start, span_end)` into maximal contiguous blocks.
///
/// Only truly back-to-back (or overlapping) fragments merge — a gap of
/// any length represents an unaccounted break and splits the block.
fn merged_source_blocks(
    pool: &[ActivityRecord],
    agent_id: &str,
    source: Activity,
    span_start: NaiveDateTime,
    span_end: NaiveDateTime,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut fragments: Vec<(NaiveDateTime, NaiveDateTime)> = pool
        .iter()
        .filter(|r| {
            r.agent_id == agent_id
                && is_omni(&r.func_lower)
                && source.matches_label(&r.main_activity_lower)
        })
        .map(|r| (r.start.max(span_start), r.end.min(span_end)))
        .filter(|(s, e)| e > s)
        .collect();
    fragments.sort();

    let mut blocks: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::new();
    for (start, end) in fragments {
        match blocks.last_mut() {
            Some((_, cur_end)) if start <= *cur_end => {
                *cur_end = (*cur_end).max(end);
            }
            _ => blocks.push((start, end)),
        }
    }
    blocks
}

fn block_minutes(block: &(NaiveDateTime, NaiveDateTime)) -> i64 {
    (block.1 - block.0).num_minutes()
}

/// Step 1: try to satisfy the whole supergroup with one agent.
/// Candidates are ranked by full-tier overlap with the whole group
/// window; the first agent owning a contiguous source block at least
/// `needed` minutes long gets exactly `needed` minutes carved from the
/// block's start.
fn try_whole_block(
    pool: &[ActivityRecord],
    group: &Supergroup,
    min_interval: i64,
    ids: &mut TaskIdMap,
) -> Option<AssignmentTask> {
    let needed = group.total_needed_min.round() as i64;
    if needed <= 0 {
        return None;
    }
    let source = group.sign.source();
    let tiers = select_candidates(pool, group.start, group.end, source, min_interval, false);

    let mut seen: Vec<&str> = Vec::new();
    for cand in &tiers.full {
        let agent_id = pool[cand.index].agent_id.as_str();
        if seen.contains(&agent_id) {
            continue;
        }
        seen.push(agent_id);

        let blocks = merged_source_blocks(pool, agent_id, source, group.start, group.end);
        if let Some(block) = blocks.iter().find(|b| block_minutes(b) >= needed) {
            let end = block.0 + Duration::minutes(needed);
            log::debug!(
                "by_delta: supergroup {}..{} fully covered by agent {agent_id}",
                group.start,
                group.end
            );
            return Some(make_task(ids, agent_id, group.sign.target(), block.0, end, needed));
        }
    }
    None
}

/// Step 2: per-slot full-coverage stitching. Builds a per-agent
/// coverage vector across the group's slots, then lets each agent
/// claim maximal runs of consecutive still-unclaimed slots it covers,
/// assigning its longest contiguous source block inside each run.
/// Returns the claimed flags so leftovers can be processed.
fn stitch_full_coverage(
    pool: &[ActivityRecord],
    group: &Supergroup,
    min_interval: i64,
    ids: &mut TaskIdMap,
    tasks: &mut Vec<AssignmentTask>,
) -> Vec<bool> {
    let source = group.sign.source();
    let n = group.slots.len();
    let mut claimed = vec![false; n];

    // Coverage vectors, with agents ordered by first appearance in the
    // per-slot rankings so earlier/better-overlapping agents go first.
    let mut agent_order: Vec<AgentId> = Vec::new();
    let mut coverage: HashMap<AgentId, Vec<bool>> = HashMap::new();
    for (i, slot) in group.slots.iter().enumerate() {
        let tiers = select_candidates(pool, slot.start, slot.end, source, min_interval, false);
        for cand in &tiers.full {
            let agent_id = &pool[cand.index].agent_id;
            let row = coverage.entry(agent_id.clone()).or_insert_with(|| {
                agent_order.push(agent_id.clone());
                vec![false; n]
            });
            row[i] = true;
        }
    }

    for agent_id in &agent_order {
        let covered = &coverage[agent_id];
        let mut i = 0;
        while i < n {
            if !covered[i] || claimed[i] {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < n && covered[i] && !claimed[i] {
                i += 1;
            }
            let run_end = i; // exclusive

            let span_start = group.slots[run_start].start;
            let span_end = group.slots[run_end - 1].end;
            let blocks = merged_source_blocks(pool, agent_id, source, span_start, span_end);
            let best = blocks.iter().max_by_key(|b| block_minutes(b));
            if let Some(block) = best {
                tasks.push(make_task(
                    ids,
                    agent_id,
                    group.sign.target(),
                    block.0,
                    block.1,
                    block_minutes(block),
                ));
                for flag in &mut claimed[run_start..run_end] {
                    *flag = true;
                }
            }
        }
    }

    claimed
}

/// Step 3: partial best-fit for slots no one claimed. Each leftover
/// slot's own delta decides how many whole 30-minute units plus a
/// remainder are still needed. Full units go to distinct full-tier
/// candidates in rank order; the remainder goes to the partial-tier
/// candidate whose overlap most closely matches it from above, or the
/// largest available when none reaches it.
fn fill_leftovers(
    pool: &[ActivityRecord],
    group: &Supergroup,
    claimed: &[bool],
    min_interval: i64,
    partial_coverage: bool,
    ids: &mut TaskIdMap,
    tasks: &mut Vec<AssignmentTask>,
) {
    let source = group.sign.source();
    let target = group.sign.target();

    for (slot, _) in group.slots.iter().zip(claimed).filter(|(_, c)| !**c) {
        let needed = slot.delta_min.abs();
        let full_needed = (needed / SLOT_MINUTES as f64).floor() as i64;
        let remainder = (needed % SLOT_MINUTES as f64).round() as i64;

        let tiers =
            select_candidates(pool, slot.start, slot.end, source, min_interval, partial_coverage);

        // Any slot with a full-tier candidate was already claimed
        // during stitching, so this loop sees an empty full tier on
        // every current input. It stays so the leftover pass handles
        // full units and remainder on its own, without assuming the
        // stitching pass ran first.
        let mut used: Vec<&str> = Vec::new();
        for cand in &tiers.full {
            if used.len() as i64 >= full_needed {
                break;
            }
            let agent_id = pool[cand.index].agent_id.as_str();
            if used.contains(&agent_id) {
                continue;
            }
            used.push(agent_id);
            tasks.push(make_task(ids, agent_id, target, slot.start, slot.end, SLOT_MINUTES));
        }

        if remainder > 0 && partial_coverage {
            let available: Vec<&Candidate> = tiers
                .partial
                .iter()
                .filter(|c| !used.contains(&pool[c.index].agent_id.as_str()))
                .collect();
            // Best fit from above: smallest overlap still covering the
            // remainder. The partial tier is sorted descending, so when
            // nothing reaches the remainder the first entry is the
            // largest available.
            let best = available
                .iter()
                .filter(|c| c.overlap >= remainder)
                .min_by_key(|c| (c.overlap - remainder).abs())
                .or_else(|| available.first())
                .copied();
            if let Some(cand) = best {
                let agent_id = pool[cand.index].agent_id.as_str();
                tasks.push(make_task(ids, agent_id, target, slot.start, slot.end, remainder));
            }
        }
    }
}

/// Run the by-delta strategy over prebuilt supergroups.
///
/// A group or slot with no eligible candidates contributes nothing —
/// partial infeasibility never aborts the run. An empty return is a
/// normal outcome.
pub fn assign_by_delta(
    pool: &[ActivityRecord],
    groups: &[Supergroup],
    min_interval: i64,
    partial_coverage: bool,
    ids: &mut TaskIdMap,
) -> Vec<AssignmentTask> {
    let mut tasks = Vec::new();

    for group in groups {
        if let Some(task) = try_whole_block(pool, group, min_interval, ids) {
            tasks.push(task);
            continue;
        }
        let claimed = stitch_full_coverage(pool, group, min_interval, ids, &mut tasks);
        fill_leftovers(pool, group, &claimed, min_interval, partial_coverage, ids, &mut tasks);
    }

    log::info!(
        "by_delta: emitted {} raw assignments across {} supergroups",
        tasks.len(),
        groups.len()
    );
    tasks
}

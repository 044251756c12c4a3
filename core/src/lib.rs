//! timeflow-core — cross-skill allocation of contact-center agents.
//!
//! Balances observed demand/supply imbalance ("delta") against
//! recorded agent activity schedules, producing reassignment tasks:
//! which agent, on which date, during which window, is redirected from
//! chat to inbound calls or back.
//!
//! PIPELINE (fixed, documented, never reordered):
//!   normalizers -> supergroup builder -> allocator -> interval merger
//!
//! RULES:
//!   - Validation happens once, at the normalization boundary.
//!   - The allocator never sees partially-invalid data.
//!   - One run is synchronous, in-memory and stateless; the task-id
//!     map lives in the run's call frame.
//!   - An empty result is a normal outcome, not an error.

pub mod activity;
pub mod allocator;
pub mod candidates;
pub mod error;
pub mod merge;
pub mod options;
pub mod overlap;
pub mod slots;
pub mod store;
pub mod supergroup;
pub mod types;

use crate::{
    activity::{load_activity, RawActivityRow},
    allocator::{assign_by_delta, assign_mass, AssignmentTask, TaskIdMap},
    error::{AllocError, AllocResult},
    merge::merge_assignments,
    options::{RunOptions, Strategy},
    slots::{load_slots, RawSlotRow},
    supergroup::build_supergroups,
};

/// Run one full allocation: validate options, normalize both tables,
/// allocate, merge. This is the boundary the request-handling layer
/// calls; validation errors come back ready to show to the end user.
pub fn run(
    activity_rows: &[RawActivityRow],
    slot_rows: Option<&[RawSlotRow]>,
    options: &RunOptions,
) -> AllocResult<Vec<AssignmentTask>> {
    options.validate()?;
    let pool = load_activity(activity_rows, &options.skill_groups)?;

    let mut ids = TaskIdMap::new();
    let raw = match options.strategy {
        Strategy::Mass => {
            // validate() guarantees the target is present.
            let target = options
                .mass_activity
                .ok_or(AllocError::MissingMassActivity)?;
            assign_mass(&pool, target, &mut ids)
        }
        Strategy::ByDelta => {
            let slot_rows = slot_rows.ok_or(AllocError::MissingSlots)?;
            let slots = load_slots(slot_rows)?;
            let groups = build_supergroups(slots);
            assign_by_delta(
                &pool,
                &groups,
                options.min_interval,
                options.partial_coverage,
                &mut ids,
            )
        }
    };

    Ok(merge_assignments(raw))
}

/// Same as [`run`], but wraps any non-validation failure with run
/// context so callers can report a generic processing failure with the
/// cause attached.
pub fn run_checked(
    activity_rows: &[RawActivityRow],
    slot_rows: Option<&[RawSlotRow]>,
    options: &RunOptions,
) -> AllocResult<Vec<AssignmentTask>> {
    match run(activity_rows, slot_rows, options) {
        Err(err) if !err.is_validation() => {
            Err(anyhow::Error::from(err)
                .context("allocation run failed")
                .into())
        }
        other => other,
    }
}

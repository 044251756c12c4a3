//! Interval Merger — collapses temporally-adjacent raw assignments of
//! the same agent, date and assigned activity into single rows.

use crate::allocator::AssignmentTask;

fn mergeable(cur: &AssignmentTask, next: &AssignmentTask) -> bool {
    cur.agent_id == next.agent_id
        && cur.date_start == next.date_start
        && cur.assigned_activity == next.assigned_activity
        && cur.window_end == next.window_start
}

/// Sort raw rows by (agent, date, window start) and merge back-to-back
/// neighbours. Merging extends the window end and sums assigned
/// minutes; any gap, however small, keeps rows separate.
pub fn merge_assignments(mut rows: Vec<AssignmentTask>) -> Vec<AssignmentTask> {
    rows.sort_by(|a, b| {
        (&a.agent_id, a.date_start, a.window_start).cmp(&(&b.agent_id, b.date_start, b.window_start))
    });

    let raw_count = rows.len();
    let mut merged: Vec<AssignmentTask> = Vec::with_capacity(rows.len());
    for row in rows {
        match merged.last_mut() {
            Some(cur) if mergeable(cur, &row) => {
                cur.window_end = row.window_end;
                cur.assigned_minutes += row.assigned_minutes;
            }
            _ => merged.push(row),
        }
    }

    log::debug!("merge: {} raw rows -> {} merged rows", raw_count, merged.len());
    merged
}

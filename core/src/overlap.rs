//! Overlap Engine — temporal overlap between an agent interval and a
//! target window, in whole minutes. Pure, stateless.

use chrono::NaiveDateTime;

/// Overlap of `[start, end)` with `[win_start, win_end)` in minutes,
/// clamped at zero. Malformed intervals (end before start) are a
/// caller contract violation, not a runtime error here.
pub fn overlap_minutes(
    start: NaiveDateTime,
    end: NaiveDateTime,
    win_start: NaiveDateTime,
    win_end: NaiveDateTime,
) -> i64 {
    let lo = start.max(win_start);
    let hi = end.min(win_end);
    (hi - lo).num_minutes().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn exact_window_is_full_overlap() {
        assert_eq!(overlap_minutes(at(10, 0), at(10, 30), at(10, 0), at(10, 30)), 30);
    }

    #[test]
    fn half_shifted_window_overlaps_half() {
        assert_eq!(overlap_minutes(at(10, 0), at(10, 30), at(10, 15), at(10, 45)), 15);
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        assert_eq!(overlap_minutes(at(10, 0), at(10, 30), at(10, 30), at(11, 0)), 0);
    }

    #[test]
    fn disjoint_windows_clamp_to_zero() {
        assert_eq!(overlap_minutes(at(8, 0), at(9, 0), at(12, 0), at(12, 30)), 0);
    }
}

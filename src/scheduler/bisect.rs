//! Bisection heuristic for repeat scans without a preferred location.
//!
//! Spreads `count` scans over a task's duration by repeatedly halving the
//! intervals on each side of the midpoint.
//!
//! # Algorithm
//!
//! Seed: `average = ceil(duration / 2)` over the interval `[0, duration + 1]`,
//! with a share of `count` rounded down to even. At each step the share is
//! split in two halves; the side the recursion just went to gets the larger
//! (`ceil`) half. A side is explored while its interval is wider than two
//! days beyond the midpoint and it still has share left: its midpoint
//! `round((a + b) / 2)` is recorded, then the recursion continues inside it.
//!
//! Candidates are de-duplicated; if there are more than `count`, the seed
//! is dropped. The result is sorted ascending.

/// Which half of the share goes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Day offsets (relative to the task start) for `count` implicit repeat scans.
///
/// May return fewer than `count` offsets for short tasks; callers place the
/// rest elsewhere.
///
/// # Example
/// ```
/// use u_scan_schedule::scheduler::implicit_offsets;
///
/// assert_eq!(implicit_offsets(20, 2), vec![5, 16]);
/// assert_eq!(implicit_offsets(20, 1), vec![10]);
/// ```
pub fn implicit_offsets(duration: i64, count: usize) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }

    let average = (duration as f64 / 2.0).ceil() as i64;
    let share = count - count % 2;

    let mut candidates = vec![average];
    for offset in bisect(average, duration + 1, share, Side::Left, 0) {
        if !candidates.contains(&offset) {
            candidates.push(offset);
        }
    }

    if candidates.len() > count {
        candidates.remove(0);
    }
    candidates.sort_unstable();
    candidates
}

fn bisect(midpoint: i64, end: i64, share: usize, priority: Side, start: i64) -> Vec<i64> {
    let (mut left, mut right) = match priority {
        Side::Left => (share.div_ceil(2), share / 2),
        Side::Right => (share / 2, share.div_ceil(2)),
    };
    let mut offsets = Vec::new();

    if midpoint - start - 1 > 2 && left > 0 {
        left -= 1;
        let next = half_way(start, midpoint);
        offsets.push(next);
        offsets.extend(bisect(next, midpoint, left, Side::Left, start));
    }

    if end - midpoint - 1 > 2 && right > 0 {
        right -= 1;
        let next = half_way(midpoint, end);
        offsets.push(next);
        offsets.extend(bisect(next, end, right, Side::Right, midpoint));
    }

    offsets
}

/// `round((a + b) / 2)`, halves rounded away from zero.
#[inline]
fn half_way(a: i64, b: i64) -> i64 {
    ((a + b) as f64 / 2.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count() {
        assert!(implicit_offsets(20, 0).is_empty());
    }

    #[test]
    fn test_single_scan_is_midpoint() {
        assert_eq!(implicit_offsets(20, 1), vec![10]);
        assert_eq!(implicit_offsets(7, 1), vec![4]);
    }

    #[test]
    fn test_two_scans_drop_the_seed() {
        assert_eq!(implicit_offsets(20, 2), vec![5, 16]);
    }

    #[test]
    fn test_odd_count_keeps_the_seed() {
        assert_eq!(implicit_offsets(20, 3), vec![5, 10, 16]);
    }

    #[test]
    fn test_four_scans_follow_the_taken_side() {
        // left half: 5 then 3; right half: 16 then 19
        assert_eq!(implicit_offsets(20, 4), vec![3, 5, 16, 19]);
    }

    #[test]
    fn test_short_task_yields_fewer() {
        assert_eq!(implicit_offsets(4, 2), vec![2]);
        assert_eq!(implicit_offsets(0, 3), vec![0]);
    }

    #[test]
    fn test_recursion_records_own_midpoints() {
        let raw = bisect(10, 21, 4, Side::Left, 0);
        assert_eq!(raw, vec![5, 3, 16, 19]);
    }

    #[test]
    fn test_half_way_rounding() {
        assert_eq!(half_way(0, 5), 3);
        assert_eq!(half_way(10, 21), 16);
        assert_eq!(half_way(0, 4), 2);
    }
}

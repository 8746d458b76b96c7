//! Leaf task attachment.
//!
//! Tasks without dependencies have no window of their own; they ride along
//! with the first scan event that happens on or after their completion.
//!
//! # Algorithm
//!
//! 1. If the latest-finishing leaf ends after the last clustered event's
//!    anchor, an empty event on that leaf's end date is appended so every
//!    leaf has somewhere to go.
//! 2. Each leaf, in task order, joins the first event in ascending anchor
//!    order whose anchor is on or after the leaf's end date.
//!
//! With no events at all, leaves stay unattached.

use crate::models::{MemberRef, ScanEvent, Task};
use crate::trace::{TraceEvent, Tracer};

/// Attaches leaf tasks to scan events.
///
/// `leaves` must be in end-date order. Returns how many leaves attached.
pub fn attach_leaves(events: &mut Vec<ScanEvent>, leaves: &[Task], tracer: &Tracer) -> usize {
    let (Some(last_event), Some(latest_leaf)) = (events.last(), leaves.last()) else {
        return 0;
    };

    if latest_leaf.end_date > last_event.anchor() {
        events.push(ScanEvent::on(latest_leaf.end_date));
    }

    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by_key(|&k| events[k].anchor());

    let mut attached = 0;
    for leaf in leaves {
        let slot = order
            .iter()
            .copied()
            .find(|&k| events[k].anchor() >= leaf.end_date);
        if let Some(k) = slot {
            events[k].attach(MemberRef::Real(leaf.id), leaf.text.clone());
            attached += 1;
            tracer.emit(|| TraceEvent::LeafAttached {
                task: leaf.id,
                anchor: events[k].anchor(),
            });
        }
    }

    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn leaf(id: u64, end: &str) -> Task {
        Task::new(id, d("2024-01-01"), d(end)).with_text(format!("L{id}"))
    }

    fn member_ids(event: &ScanEvent) -> Vec<u64> {
        event.members().iter().map(MemberRef::numeric_id).collect()
    }

    #[test]
    fn test_leaf_joins_first_event_on_or_after_end() {
        let mut events = vec![
            ScanEvent::on(d("2024-01-03")),
            ScanEvent::on(d("2024-01-08")),
        ];
        let leaves = vec![leaf(1, "2024-01-03"), leaf(2, "2024-01-05")];
        assert_eq!(attach_leaves(&mut events, &leaves, &Tracer::disabled()), 2);
        assert_eq!(events.len(), 2);
        assert_eq!(member_ids(&events[0]), vec![1]);
        assert_eq!(member_ids(&events[1]), vec![2]);
    }

    #[test]
    fn test_slot_added_for_late_leaf() {
        let mut events = vec![ScanEvent::on(d("2024-01-03"))];
        let leaves = vec![leaf(1, "2024-01-02"), leaf(2, "2024-01-10")];
        attach_leaves(&mut events, &leaves, &Tracer::disabled());
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].anchor(), d("2024-01-10"));
        assert_eq!(member_ids(&events[1]), vec![2]);
    }

    #[test]
    fn test_events_scanned_in_anchor_order() {
        // clustering order is not anchor order
        let mut events = vec![
            ScanEvent::on(d("2024-01-09")),
            ScanEvent::on(d("2024-01-04")),
        ];
        let leaves = vec![leaf(1, "2024-01-02")];
        attach_leaves(&mut events, &leaves, &Tracer::disabled());
        assert!(events[0].members().is_empty());
        assert_eq!(member_ids(&events[1]), vec![1]);
    }

    #[test]
    fn test_slot_follows_last_clustered_event() {
        // the slot check looks at the last clustered event, not the latest anchor
        let mut events = vec![
            ScanEvent::on(d("2024-01-20")),
            ScanEvent::on(d("2024-01-04")),
        ];
        let leaves = vec![leaf(1, "2024-01-10")];
        attach_leaves(&mut events, &leaves, &Tracer::disabled());
        assert_eq!(events.len(), 3);
        assert_eq!(member_ids(&events[2]), vec![1]);
    }

    #[test]
    fn test_no_events_is_noop() {
        let mut events = Vec::new();
        let leaves = vec![leaf(1, "2024-01-02")];
        assert_eq!(attach_leaves(&mut events, &leaves, &Tracer::disabled()), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_leaves_is_noop() {
        let mut events = vec![ScanEvent::on(d("2024-01-03"))];
        assert_eq!(attach_leaves(&mut events, &[], &Tracer::disabled()), 0);
        assert_eq!(events.len(), 1);
    }
}

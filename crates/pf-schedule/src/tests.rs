//! Unit tests for pf-schedule.

use pf_core::{Tick, UnitId};

use crate::EventQueue;

#[cfg(test)]
mod event_queue {
    use super::*;

    #[test]
    fn empty_queue() {
        let mut q = EventQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.next_tick(), None);
        assert_eq!(q.pop_next(), None);
    }

    #[test]
    fn pops_in_tick_order() {
        let mut q = EventQueue::new();
        q.push(Tick(30), UnitId(1));
        q.push(Tick(10), UnitId(2));
        q.push(Tick(20), UnitId(3));
        assert_eq!(q.next_tick(), Some(Tick(10)));
        assert_eq!(q.pop_next(), Some((Tick(10), UnitId(2))));
        assert_eq!(q.pop_next(), Some((Tick(20), UnitId(3))));
        assert_eq!(q.pop_next(), Some((Tick(30), UnitId(1))));
        assert!(q.is_empty());
    }

    #[test]
    fn same_tick_is_fifo() {
        let mut q = EventQueue::new();
        for id in [7, 3, 9, 1] {
            q.push(Tick(5), UnitId(id));
        }
        assert_eq!(q.tick_count(), 1);
        let order: Vec<u64> = std::iter::from_fn(|| q.pop_next()).map(|(_, u)| u.0).collect();
        assert_eq!(order, vec![7, 3, 9, 1]);
    }

    #[test]
    fn push_during_drain_goes_behind() {
        let mut q = EventQueue::new();
        q.push(Tick(0), UnitId(1));
        q.push(Tick(0), UnitId(2));
        let (now, first) = q.pop_next().unwrap();
        assert_eq!(first, UnitId(1));
        // A unit woken at the current tick runs after those already queued.
        q.push(now, UnitId(3));
        assert_eq!(q.pop_next(), Some((Tick(0), UnitId(2))));
        assert_eq!(q.pop_next(), Some((Tick(0), UnitId(3))));
    }

    #[test]
    fn schedule_after_offsets_from_now() {
        let mut q = EventQueue::new();
        let at = q.schedule_after(Tick(100), 25, UnitId(4));
        assert_eq!(at, Tick(125));
        assert_eq!(q.next_tick(), Some(Tick(125)));
    }

    #[test]
    fn pop_before_respects_limit() {
        let mut q = EventQueue::new();
        q.push(Tick(9), UnitId(1));
        q.push(Tick(10), UnitId(2));
        assert_eq!(q.pop_before(Tick(10)), Some((Tick(9), UnitId(1))));
        assert_eq!(q.pop_before(Tick(10)), None);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn len_tracks_entries_not_ticks() {
        let mut q = EventQueue::new();
        q.push(Tick(1), UnitId(1));
        q.push(Tick(1), UnitId(2));
        q.push(Tick(2), UnitId(1));
        assert_eq!(q.len(), 3);
        assert_eq!(q.tick_count(), 2);
        q.pop_next();
        assert_eq!(q.len(), 2);
        assert_eq!(q.tick_count(), 2);
        q.pop_next();
        assert_eq!(q.tick_count(), 1);
    }
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// Pops come out sorted by tick, ties broken by push order.
        #[test]
        fn pop_order_is_tick_then_insertion(ticks in prop::collection::vec(0u64..20, 0..64)) {
            let mut q = EventQueue::new();
            for (seq, &t) in ticks.iter().enumerate() {
                q.push(Tick(t), UnitId(seq as u64));
            }

            let mut expected: Vec<(u64, u64)> =
                ticks.iter().enumerate().map(|(seq, &t)| (t, seq as u64)).collect();
            expected.sort();

            let popped: Vec<(u64, u64)> =
                std::iter::from_fn(|| q.pop_next()).map(|(t, u)| (t.0, u.0)).collect();
            prop_assert_eq!(popped, expected);
            prop_assert!(q.is_empty());
        }
    }
}

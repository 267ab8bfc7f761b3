//! `EventQueue` — sparse per-tick activation queue for scheduled units.
//!
//! Each suspended unit registers the tick at which it must resume.  The run
//! loop pops one unit at a time, earliest tick first; within a tick, units
//! come out in insertion order.
//!
//! `BTreeMap` gives O(log W) push and pop where W is the number of distinct
//! ticks currently enqueued.  Process durations in a typical model cluster on
//! a handful of values, so W stays small even with thousands of live units.

use std::collections::{BTreeMap, VecDeque};

use pf_core::{Tick, UnitId};

/// Future-event list mapping ticks → units to resume at that tick.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    inner: BTreeMap<Tick, VecDeque<UnitId>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `unit` to resume at `tick`, behind every unit already queued
    /// for that tick.
    pub fn push(&mut self, tick: Tick, unit: UnitId) {
        self.inner.entry(tick).or_default().push_back(unit);
        self.total += 1;
    }

    /// Schedule `unit` to resume `delay` ticks after `now`.
    pub fn schedule_after(&mut self, now: Tick, delay: u64, unit: UnitId) -> Tick {
        let at = now + delay;
        self.push(at, unit);
        at
    }

    /// Remove and return the earliest-scheduled unit.
    pub fn pop_next(&mut self) -> Option<(Tick, UnitId)> {
        let mut entry = self.inner.first_entry()?;
        let tick = *entry.key();
        let unit = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        // Empty buckets are removed eagerly, so a present bucket always
        // yields a unit.
        let unit = unit?;
        self.total -= 1;
        Some((tick, unit))
    }

    /// Pop the earliest unit only if it is scheduled strictly before `limit`.
    pub fn pop_before(&mut self, limit: Tick) -> Option<(Tick, UnitId)> {
        match self.next_tick() {
            Some(t) if t < limit => self.pop_next(),
            _ => None,
        }
    }

    /// The earliest tick with at least one queued unit, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Total number of queued (tick, unit) entries.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct ticks with at least one queued unit.
    pub fn tick_count(&self) -> usize {
        self.inner.len()
    }
}

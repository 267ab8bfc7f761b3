//! `pf-schedule` — the future-event list.
//!
//! # Crate layout
//!
//! | Module           | Contents                                               |
//! |------------------|--------------------------------------------------------|
//! | [`event_queue`]  | `EventQueue` (`BTreeMap<Tick, VecDeque<UnitId>>`)      |
//!
//! # Ordering
//!
//! Units are resumed in ascending tick order.  Units scheduled for the same
//! tick are resumed in the order they were scheduled, which makes every run
//! of a given configuration reproduce the same trace.

pub mod event_queue;

#[cfg(test)]
mod tests;

pub use event_queue::EventQueue;

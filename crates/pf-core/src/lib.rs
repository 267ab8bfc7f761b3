//! `pf-core` — foundational types for the `procflow` simulation engine.
//!
//! This crate is a dependency of every other `pf-*` crate.  It has no `pf-*`
//! dependencies and a single external one (`serde`, for the attribute wire
//! format).
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `ResourceId`, `ProcessId`, `MetricId`, `EntityId`, `UnitId` |
//! | [`time`]     | `Tick`, `Clock`, arrival-rate conversion                  |
//! | [`attr`]     | `AttrValue`, `Attributes`                                 |
//! | [`entity`]   | `Entity`, the actor that flows through processes; `Priority` |

pub mod attr;
pub mod entity;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use attr::{AttrValue, Attributes};
pub use entity::{Entity, Priority};
pub use ids::{EntityId, MetricId, ProcessId, ResourceId, UnitId};
pub use time::{Clock, Tick, inter_arrival_ticks};

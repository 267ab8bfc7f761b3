//! `Entity`: an actor that flows through the process graph.
//!
//! Entities are immutable once created.  When a process fans out to several
//! successors, every successor unit shares the same entity through an `Rc`,
//! which is exactly the "same attribute snapshot at fan-out time" semantics:
//! nothing in the engine writes to an entity after the generator builds it.

use std::cmp::Ordering;
use std::fmt;

use crate::{AttrValue, Attributes, EntityId, Tick};

/// Attribute injected with the entity's sequence number unless the
/// configuration already defines it.
pub const ID_ATTRIBUTE: &str = "id";

/// Numeric attribute read as the request priority on priority-ordered
/// resources.  Lower values are served first.
pub const PRIORITY_ATTRIBUTE: &str = "priority";

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id:         EntityId,
    pub created_at: Tick,
    pub attributes: Attributes,
}

impl Entity {
    /// Build an entity from the configured default attributes plus the
    /// engine-injected `id`.
    pub fn new(id: EntityId, created_at: Tick, defaults: &Attributes) -> Self {
        let mut attributes = defaults.clone();
        attributes
            .entry(ID_ATTRIBUTE.to_owned())
            .or_insert(AttrValue::Number(id.0 as f64));
        Self { id, created_at, attributes }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Request priority for priority-ordered resources.
    ///
    /// Reads the numeric [`PRIORITY_ATTRIBUTE`].  Missing, non-numeric, or
    /// non-finite values give [`Priority::DEFAULT`].
    pub fn request_priority(&self) -> Priority {
        self.get(PRIORITY_ATTRIBUTE)
            .and_then(AttrValue::as_number)
            .map_or(Priority::DEFAULT, Priority::new)
    }
}

// ── Priority ─────────────────────────────────────────────────────────────────

/// A resource request priority.  Lower values are served first.
///
/// Always finite, with `-0.0` folded into `0.0`, so the total order from
/// [`f64::total_cmp`] agrees with numeric order.
#[derive(Copy, Clone, Debug, Default)]
pub struct Priority(f64);

impl Priority {
    pub const DEFAULT: Priority = Priority(0.0);

    /// Non-finite values map to [`Priority::DEFAULT`].
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Priority(value + 0.0)
        } else {
            Priority::DEFAULT
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Priority {
    fn from(value: f64) -> Self {
        Priority::new(value)
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

//! Logical simulation time.
//!
//! # Design
//!
//! Time is a monotonically non-decreasing `Tick` counter with no relation to
//! wall-clock time.  Integer ticks keep every schedule computation exact and
//! make runs bit-for-bit reproducible.
//!
//! Arrival rates are quoted in entities per hour.  The engine fixes the
//! convention that one tick is one simulated second, so an hour is 3,600
//! ticks and the gap between arrivals is `3600 / entities_per_hour` ticks.

use std::fmt;

/// Ticks in one simulated hour.
pub const TICKS_PER_HOUR: f64 = 3_600.0;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute logical time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }

    /// Ticks elapsed from `earlier` to `self`; `0` if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        self.offset(rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Clock ────────────────────────────────────────────────────────────────────

/// The run's logical clock.  Starts at [`Tick::ZERO`] and only moves forward.
#[derive(Clone, Debug, Default)]
pub struct Clock {
    now: Tick,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Move the clock to `tick`.
    ///
    /// # Panics
    /// Panics if `tick` is earlier than the current time.
    pub fn advance_to(&mut self, tick: Tick) {
        assert!(tick >= self.now, "clock moved backwards: {} -> {}", self.now, tick);
        self.now = tick;
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now)
    }
}

// ── Arrival rate ─────────────────────────────────────────────────────────────

/// Ticks between two consecutive arrivals for a rate of `entities_per_hour`.
///
/// The exact gap `3600 / entities_per_hour` is rounded to the nearest tick
/// and never drops below one, so a generator always advances the clock.
/// Returns `None` for a non-positive or non-finite rate.
pub fn inter_arrival_ticks(entities_per_hour: f64) -> Option<u64> {
    if !entities_per_hour.is_finite() || entities_per_hour <= 0.0 {
        return None;
    }
    let gap = (TICKS_PER_HOUR / entities_per_hour).round();
    if gap >= u64::MAX as f64 {
        return Some(u64::MAX);
    }
    Some((gap as u64).max(1))
}

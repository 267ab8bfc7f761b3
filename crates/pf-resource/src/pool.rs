//! `ResourcePool` — per-resource capacity accounting and wait queues.
//!
//! # Wait order
//!
//! Waiters are keyed by `(priority, seq)` where `seq` is a pool-wide
//! request counter.  FIFO resources key every request with the default
//! priority, so
//! the order collapses to arrival order; priority resources serve the lowest
//! priority value first and fall back to arrival order on ties.
//!
//! # Tokens
//!
//! Each grant mints a token carrying a unique serial.  The pool remembers
//! which serials are outstanding per resource; a release is only accepted for
//! an outstanding serial.

use std::collections::{BTreeMap, BTreeSet};

use pf_config::ResourceSpec;
use pf_core::{Priority, ResourceId, UnitId};

use crate::{ResourceError, ResourceResult};

// ── Token ────────────────────────────────────────────────────────────────────

/// Proof that one unit of a resource's capacity is held.
///
/// Neither `Clone` nor `Copy`: a token is consumed by
/// [`ResourcePool::release`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a dropped token is never released"]
pub struct Token {
    resource: ResourceId,
    serial:   u64,
}

impl Token {
    #[inline]
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    #[inline]
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// Result of [`ResourcePool::acquire`].
#[derive(Debug, PartialEq, Eq)]
pub enum AcquireOutcome {
    Granted(Token),
    /// The unit was appended to the resource's wait queue and will be handed
    /// a token through a future [`Grant`].
    Queued,
}

/// A queued request satisfied by a release.
#[derive(Debug, PartialEq, Eq)]
pub struct Grant {
    pub unit:  UnitId,
    pub token: Token,
}

// ── Per-resource state ───────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct WaitKey {
    priority: Priority,
    seq:      u64,
}

#[derive(Debug)]
struct ResourceState {
    name:     String,
    capacity: u32,
    priority: bool,
    held:     BTreeSet<u64>,
    waiters:  BTreeMap<WaitKey, UnitId>,
    /// High-water mark of `held.len()` over the run.
    peak:     u32,
}

impl ResourceState {
    fn held(&self) -> u32 {
        self.held.len() as u32
    }
}

// ── ResourcePool ─────────────────────────────────────────────────────────────

/// Every resource of one run, indexed by [`ResourceId`].
#[derive(Debug)]
pub struct ResourcePool {
    resources:   Vec<ResourceState>,
    next_serial: u64,
    next_seq:    u64,
}

impl ResourcePool {
    /// Build one empty resource per validated definition, in id order.
    pub fn new(specs: &[ResourceSpec]) -> Self {
        let resources = specs
            .iter()
            .map(|spec| ResourceState {
                name:     spec.name.clone(),
                capacity: spec.capacity,
                priority: spec.priority,
                held:     BTreeSet::new(),
                waiters:  BTreeMap::new(),
                peak:     0,
            })
            .collect();
        Self { resources, next_serial: 0, next_seq: 0 }
    }

    /// Number of resources in the pool.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Request one unit of `resource` on behalf of `unit`.
    ///
    /// `priority` only matters on priority-ordered resources; lower values
    /// are served first.
    pub fn acquire(&mut self, resource: ResourceId, unit: UnitId, priority: Priority) -> AcquireOutcome {
        let seq = self.next_seq;
        self.next_seq += 1;

        let state = &mut self.resources[resource.index()];
        if state.held() < state.capacity && state.waiters.is_empty() {
            let token = Self::mint(state, resource, &mut self.next_serial);
            tracing::trace!(resource = %state.name, %unit, serial = token.serial, "granted");
            return AcquireOutcome::Granted(token);
        }

        let priority = if state.priority { priority } else { Priority::DEFAULT };
        state.waiters.insert(WaitKey { priority, seq }, unit);
        tracing::trace!(
            resource = %state.name,
            %unit,
            %priority,
            waiting = state.waiters.len(),
            "queued"
        );
        AcquireOutcome::Queued
    }

    /// Return `token` to its resource, handing the freed capacity straight to
    /// the head waiter if there is one.
    ///
    /// # Panics
    /// Panics if the token is not outstanding in this pool.
    pub fn release(&mut self, token: Token) -> Option<Grant> {
        match self.try_release(token) {
            Ok(grant) => grant,
            Err(e) => panic!("resource release misuse: {e}"),
        }
    }

    /// Fallible form of [`release`][Self::release].
    pub fn try_release(&mut self, token: Token) -> ResourceResult<Option<Grant>> {
        let Token { resource, serial } = token;
        let state = self
            .resources
            .get_mut(resource.index())
            .ok_or(ResourceError::UnknownResource(resource))?;
        if !state.held.remove(&serial) {
            return Err(ResourceError::NotHeld { resource, serial });
        }

        let Some((_, unit)) = state.waiters.pop_first() else {
            return Ok(None);
        };
        let token = Self::mint(state, resource, &mut self.next_serial);
        tracing::trace!(resource = %state.name, %unit, serial = token.serial, "granted from queue");
        Ok(Some(Grant { unit, token }))
    }

    fn mint(state: &mut ResourceState, resource: ResourceId, next_serial: &mut u64) -> Token {
        let serial = *next_serial;
        *next_serial += 1;
        state.held.insert(serial);
        state.peak = state.peak.max(state.held());
        Token { resource, serial }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn name(&self, resource: ResourceId) -> &str {
        &self.resources[resource.index()].name
    }

    pub fn capacity(&self, resource: ResourceId) -> u32 {
        self.resources[resource.index()].capacity
    }

    /// Tokens currently outstanding.
    pub fn held(&self, resource: ResourceId) -> u32 {
        self.resources[resource.index()].held()
    }

    /// Highest number of tokens outstanding at any point so far.
    pub fn peak_held(&self, resource: ResourceId) -> u32 {
        self.resources[resource.index()].peak
    }

    /// Units waiting for a token.
    pub fn queue_len(&self, resource: ResourceId) -> usize {
        self.resources[resource.index()].waiters.len()
    }

    /// Waiting units in the order they will be served.
    pub fn waiting(&self, resource: ResourceId) -> Vec<UnitId> {
        self.resources[resource.index()].waiters.values().copied().collect()
    }

    /// `held / capacity × 100`.
    pub fn utilization_percent(&self, resource: ResourceId) -> f64 {
        let state = &self.resources[resource.index()];
        f64::from(state.held()) / f64::from(state.capacity) * 100.0
    }

    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        (0..self.resources.len()).map(|i| ResourceId(i as u32))
    }
}

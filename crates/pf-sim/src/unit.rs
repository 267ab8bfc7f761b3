//! Scheduled units: the independently resumable pieces of a run.
//!
//! A unit is an explicit state machine.  The run loop removes a unit from
//! the live set, resumes it, and puts it back unless it finished.  Resuming
//! runs the unit until its next suspension point:
//!
//! ```text
//! Flow:  Guard ──▶ Acquire{0} ─▶ … ─▶ Acquire{n} ──▶ Execute ──▶ Complete ─▶ done
//!          │            │  ▲
//!          ▼            ▼  │ grant
//!        done      AwaitGrant{i}
//! ```
//!
//! `Execute` suspends for the process duration; `AwaitGrant` suspends until
//! the resource pool hands the unit a token.

use std::rc::Rc;

use pf_core::{Entity, ProcessId, ResourceId, Tick};
use pf_resource::Token;

use crate::generator::EntityGenerator;

pub(crate) enum Unit {
    Generator(EntityGenerator),
    Flow(FlowUnit),
}

/// One entity passing through one process.
pub(crate) struct FlowUnit {
    pub entity:  Rc<Entity>,
    pub process: ProcessId,
    /// Tick at which the unit was dispatched.
    pub started: Tick,
    /// Tokens in acquisition order.
    pub held:    Vec<Token>,
    pub stage:   Stage,
}

impl FlowUnit {
    pub fn new(entity: Rc<Entity>, process: ProcessId, started: Tick) -> Self {
        Self { entity, process, started, held: Vec::new(), stage: Stage::Guard }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Guard,
    /// Request the `next`-th required resource.
    Acquire { next: usize },
    /// Queued on the `next`-th required resource.
    AwaitGrant { next: usize },
    Execute,
    Complete,
}

/// Why a resumed unit stopped running.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Suspend {
    /// Resume after this many ticks.
    Delay(u64),
    /// Resume once the pool grants a token on this resource.
    Resource(ResourceId),
}

/// Outcome of resuming a unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Suspend(Suspend),
    Done,
}

//! The process interpreter: runs one [`FlowUnit`] to its next suspension
//! point.
//!
//! # Completion
//!
//! When the timed execution ends, in this order:
//!
//! 1. every declared metric receives its sample;
//! 2. if the process releases its resources, one utilization sample per
//!    held token is taken (just before that token goes back) and the token
//!    is released, which may wake the resource's head waiter;
//! 3. a new unit is dispatched for every successor, then one for the same
//!    process if it loops.
//!
//! A process with `release_resources: false` keeps its tokens for the rest
//! of the run.

use std::rc::Rc;

use pf_core::{Entity, ProcessId, UnitId};
use pf_resource::{AcquireOutcome, Grant};

use crate::unit::{FlowUnit, Stage, Step, Suspend, Unit};
use crate::{Sim, SimObserver};

impl Sim {
    pub(crate) fn step_flow<O: SimObserver>(
        &mut self,
        id:       UnitId,
        flow:     &mut FlowUnit,
        observer: &mut O,
    ) -> Step {
        let config = Rc::clone(&self.config);
        let process = config.process(flow.process);
        let now = self.clock.now();

        loop {
            match flow.stage {
                Stage::Guard => {
                    if let Some(guard) = &process.guard {
                        let verdict = guard.evaluate(&flow.entity.attributes);
                        if !matches!(verdict, Ok(true)) {
                            let error = verdict.err();
                            if let Some(e) = &error {
                                tracing::warn!(
                                    process = %process.name,
                                    entity  = %flow.entity.id,
                                    guard   = %guard,
                                    error   = %e,
                                    "guard could not be evaluated; treating as not satisfied"
                                );
                            }
                            self.stats.guard_skips += 1;
                            observer.on_guard_skipped(now, &flow.entity, process, error.as_ref());
                            return Step::Done;
                        }
                    }
                    self.stats.process_starts += 1;
                    observer.on_process_start(now, &flow.entity, process);
                    flow.stage = Stage::Acquire { next: 0 };
                }

                Stage::Acquire { next } => {
                    let Some(&resource) = process.required.get(next) else {
                        flow.stage = Stage::Execute;
                        continue;
                    };
                    match self.pool.acquire(resource, id, flow.entity.request_priority()) {
                        AcquireOutcome::Granted(token) => {
                            flow.held.push(token);
                            flow.stage = Stage::Acquire { next: next + 1 };
                        }
                        AcquireOutcome::Queued => {
                            flow.stage = Stage::AwaitGrant { next };
                            return Step::Suspend(Suspend::Resource(resource));
                        }
                    }
                }

                // Only a grant moves a unit out of this stage.
                Stage::AwaitGrant { next } => {
                    return Step::Suspend(Suspend::Resource(process.required[next]));
                }

                Stage::Execute => {
                    flow.stage = Stage::Complete;
                    return Step::Suspend(Suspend::Delay(process.duration));
                }

                Stage::Complete => {
                    self.complete(flow, observer);
                    return Step::Done;
                }
            }
        }
    }

    fn complete<O: SimObserver>(&mut self, flow: &mut FlowUnit, observer: &mut O) {
        let config = Rc::clone(&self.config);
        let process = config.process(flow.process);
        let now = self.clock.now();
        let elapsed = now.since(flow.started);

        self.metrics.record_completion(elapsed, process.duration);
        self.stats.completions += 1;

        if process.release_resources {
            for token in flow.held.drain(..) {
                let resource = token.resource();
                self.metrics.record_utilization(resource, self.pool.utilization_percent(resource));
                if let Some(grant) = self.pool.release(token) {
                    self.deliver_grant(grant);
                }
            }
        } else {
            self.retained.append(&mut flow.held);
        }

        tracing::trace!(process = %process.name, entity = %flow.entity.id, %now, elapsed, "completed");
        observer.on_process_complete(now, &flow.entity, process, elapsed);

        for &successor in &process.successors {
            self.dispatch(Rc::clone(&flow.entity), successor);
        }
        if process.repeat {
            self.dispatch(Rc::clone(&flow.entity), process.id);
        }
    }

    /// Hand a freed token to the unit that was waiting for it and wake the
    /// unit at the current tick.
    pub(crate) fn deliver_grant(&mut self, grant: Grant) {
        let Grant { unit, token } = grant;
        match self.units.get_mut(&unit) {
            Some(Unit::Flow(flow)) => {
                let Stage::AwaitGrant { next } = flow.stage else {
                    unreachable!("{unit} granted a token while in stage {:?}", flow.stage);
                };
                flow.held.push(token);
                flow.stage = Stage::Acquire { next: next + 1 };
                self.queue.push(self.clock.now(), unit);
            }
            _ => unreachable!("{unit} granted a token but is not waiting"),
        }
    }

    /// Start a new unit for `entity` at `process`, resumed at the current
    /// tick behind everything already due.
    pub(crate) fn dispatch(&mut self, entity: Rc<Entity>, process: ProcessId) {
        let now = self.clock.now();
        let id = self.next_unit_id();
        self.units.insert(id, Unit::Flow(FlowUnit::new(entity, process, now)));
        self.queue.push(now, id);
    }
}

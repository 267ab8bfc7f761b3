//! The entity generator: a single long-lived unit that admits one entity
//! every `inter_arrival` ticks.

use std::rc::Rc;

use pf_core::{Attributes, Entity, EntityId, Tick};

use crate::unit::{Step, Suspend};
use crate::{Sim, SimObserver};

/// Generator state.  The first arrival happens one full gap after the start
/// of the run.
pub(crate) struct EntityGenerator {
    pub inter_arrival: u64,
}

impl Sim {
    /// Resume the generator: admit one entity, then wait for the next gap.
    pub(crate) fn step_generator<O: SimObserver>(
        &mut self,
        generator: &EntityGenerator,
        observer:  &mut O,
    ) -> Step {
        let config = Rc::clone(&self.config);
        self.admit(&config.entity_attributes, observer);
        Step::Suspend(Suspend::Delay(generator.inter_arrival))
    }

    /// Create an entity from `attributes` and dispatch it to every start
    /// process.
    pub(crate) fn admit<O: SimObserver>(&mut self, attributes: &Attributes, observer: &mut O) -> Rc<Entity> {
        let now = self.clock.now();
        let id = EntityId(self.next_entity);
        self.next_entity += 1;

        let entity = Rc::new(Entity::new(id, now, attributes));
        self.stats.entities_created += 1;
        tracing::trace!(entity = %id, %now, "entity created");
        observer.on_entity_created(now, &entity);

        let config = Rc::clone(&self.config);
        for &process in &config.start_processes {
            self.dispatch(Rc::clone(&entity), process);
        }
        entity
    }
}

/// Merge seeded attributes over the configured defaults.
pub(crate) fn seeded_attributes(defaults: &Attributes, overrides: &Attributes) -> Attributes {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Tick of the generator's first arrival.
pub(crate) fn first_arrival(inter_arrival: u64) -> Tick {
    Tick::ZERO + inter_arrival
}

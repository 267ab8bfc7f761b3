//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeMap;
use std::rc::Rc;

use pf_config::{SimulationConfig, ValidatedConfig};
use pf_core::{AttrValue, Attributes, Clock, Tick};
use pf_metrics::MetricsAggregator;
use pf_resource::ResourcePool;
use pf_schedule::EventQueue;

use crate::generator::{EntityGenerator, first_arrival, seeded_attributes};
use crate::sim::GENERATOR;
use crate::unit::Unit;
use crate::{RunStats, Sim, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                   |
/// |--------------------------|-------------------------------------------|
/// | `.horizon(t)`            | the configuration's `duration`            |
/// | `.entity_attribute(k, v)`| the configuration's `entity_attributes`   |
/// | `.seed_entity(attrs)`    | no seeded entities                        |
///
/// Seeded entities are admitted at tick 0, in the order given, before the
/// generator's first arrival.  Their attributes are merged over the
/// configured defaults.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .horizon(Tick(3_600))
///     .build()?;
/// let result = sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:     SimulationConfig,
    horizon:    Option<Tick>,
    attributes: Attributes,
    seeded:     Vec<Attributes>,
}

impl SimBuilder {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            horizon:    None,
            attributes: Attributes::new(),
            seeded:     Vec::new(),
        }
    }

    /// Override the configured run duration.
    pub fn horizon(mut self, horizon: Tick) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Add or replace one default entity attribute.
    pub fn entity_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Admit an extra entity with these attributes at tick 0.
    pub fn seed_entity(mut self, attributes: Attributes) -> Self {
        self.seeded.push(attributes);
        self
    }

    /// Validate the configuration and return a ready-to-run [`Sim`].
    pub fn build(mut self) -> SimResult<Sim> {
        self.config.entity_attributes.extend(self.attributes);
        let mut config: ValidatedConfig = self.config.validate()?;
        if let Some(h) = self.horizon {
            config.horizon = h;
        }

        let seeded = self
            .seeded
            .iter()
            .map(|overrides| seeded_attributes(&config.entity_attributes, overrides))
            .collect();

        let mut queue = EventQueue::new();
        let mut units = BTreeMap::new();
        units.insert(GENERATOR, Unit::Generator(EntityGenerator { inter_arrival: config.inter_arrival }));
        queue.push(first_arrival(config.inter_arrival), GENERATOR);

        tracing::debug!(
            horizon       = %config.horizon,
            inter_arrival = config.inter_arrival,
            start         = config.start_processes.len(),
            "simulation built"
        );

        Ok(Sim {
            pool:        ResourcePool::new(&config.resources),
            metrics:     MetricsAggregator::new(&config.metrics, &config.resources),
            config:      Rc::new(config),
            clock:       Clock::new(),
            queue,
            units,
            retained:    Vec::new(),
            seeded,
            next_unit:   GENERATOR.0 + 1,
            next_entity: 0,
            stats:       RunStats::default(),
            finished:    false,
        })
    }
}

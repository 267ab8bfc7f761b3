//! Fail-fast validation: [`SimulationConfig`] → [`ValidatedConfig`].
//!
//! Validation resolves every name reference to a dense id, parses guards,
//! and collects *all* violations before returning, so callers can report
//! the whole list at once.  It is a pure function of the input: validating
//! the same configuration twice yields equal `ValidatedConfig`s.

use std::collections::{BTreeMap, BTreeSet};

use pf_core::{Attributes, MetricId, ProcessId, ResourceId, Tick, inter_arrival_ticks};

use crate::guard::Guard;
use crate::model::{
    Aggregation, InsightCondition, InsightRule, MetricDef, MetricUnit, ProcessDef, ResourceDef,
    SimulationConfig,
};
use crate::{ConfigError, ConfigResult, Violation};

/// Suffix of the synthesized per-resource utilization metric.
pub const UTILIZATION_SUFFIX: &str = "_utilization";

/// Name of the utilization series reported for `resource`.
pub fn utilization_key(resource: &str) -> String {
    format!("{resource}{UTILIZATION_SUFFIX}")
}

// ── Validated types ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceSpec {
    pub id:                   ResourceId,
    pub name:                 String,
    pub capacity:             u32,
    pub cost_per_unit:        f64,
    pub efficiency_threshold: f64,
    pub priority:             bool,
    pub shared:               bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessSpec {
    pub id:                    ProcessId,
    pub name:                  String,
    pub duration:              u64,
    /// Required resources in declared (acquisition) order.
    pub required:              Vec<ResourceId>,
    pub expected_service_time: f64,
    pub max_acceptable_wait:   f64,
    pub guard:                 Option<Guard>,
    pub successors:            Vec<ProcessId>,
    pub repeat:                bool,
    pub release_resources:     bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricSpec {
    pub id:           MetricId,
    pub name:         String,
    pub target_value: f64,
    pub unit:         MetricUnit,
    pub description:  String,
    pub aggregation:  Aggregation,
}

/// A configuration whose every reference is known to resolve.
///
/// Only obtainable through [`SimulationConfig::validate`].  Resources,
/// processes, and metrics are stored in declaration order and indexed by
/// their ids.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedConfig {
    pub title:             String,
    pub description:       String,
    pub business_context:  String,
    pub horizon:           Tick,
    pub entities_per_hour: f64,
    /// Ticks between generated entities.
    pub inter_arrival:     u64,
    pub resources:         Vec<ResourceSpec>,
    pub processes:         Vec<ProcessSpec>,
    pub metrics:           Vec<MetricSpec>,
    pub insight_rules:     Vec<InsightRule>,
    pub entity_attributes: Attributes,
    /// Processes that no process names as a successor, in declaration order.
    pub start_processes:   Vec<ProcessId>,
    pub resource_index:    BTreeMap<String, ResourceId>,
    pub process_index:     BTreeMap<String, ProcessId>,
}

impl ValidatedConfig {
    #[inline]
    pub fn resource(&self, id: ResourceId) -> &ResourceSpec {
        &self.resources[id.index()]
    }

    #[inline]
    pub fn process(&self, id: ProcessId) -> &ProcessSpec {
        &self.processes[id.index()]
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resource_index.get(name).copied()
    }

    pub fn process_id(&self, name: &str) -> Option<ProcessId> {
        self.process_index.get(name).copied()
    }

    pub fn metric(&self, name: &str) -> Option<&MetricSpec> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

impl SimulationConfig {
    /// Check every reference and range constraint, returning all violations
    /// found or a [`ValidatedConfig`] ready to run.
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        let mut violations = Vec::new();

        if self.duration < 0 {
            violations.push(Violation::NegativeHorizon(self.duration));
        }
        let inter_arrival = inter_arrival_ticks(self.entities_per_hour);
        if inter_arrival.is_none() {
            violations.push(Violation::InvalidArrivalRate(self.entities_per_hour));
        }

        let (resources, resource_index) = validate_resources(&self.resources, &mut violations);
        let process_index: BTreeMap<String, ProcessId> =
            index_names("process", self.processes.iter().map(|p| &p.name), &mut violations);
        let processes: Vec<ProcessSpec> = self
            .processes
            .iter()
            .enumerate()
            .map(|(i, def)| validate_process(i, def, &resource_index, &process_index, &mut violations))
            .collect();
        let metrics = validate_metrics(&self.target_metrics, &resources, &mut violations);
        validate_insights(&self.insight_rules, &metrics, &resources, &mut violations);

        for cycle in zero_duration_cycles(&processes) {
            let names = cycle.iter().map(|p| processes[p.index()].name.clone()).collect();
            violations.push(Violation::ZeroDurationCycle(names));
        }

        if !violations.is_empty() {
            return Err(ConfigError { violations });
        }

        let start_processes = start_processes(&processes);
        if start_processes.is_empty() && !processes.is_empty() {
            tracing::warn!("every process is some process's successor; generated entities have no entry point");
        }

        tracing::debug!(
            resources = resources.len(),
            processes = processes.len(),
            metrics   = metrics.len(),
            "simulation configuration validated"
        );

        Ok(ValidatedConfig {
            title:             self.title.clone(),
            description:       self.description.clone(),
            business_context:  self.business_context.clone(),
            horizon:           Tick(self.duration.max(0) as u64),
            entities_per_hour: self.entities_per_hour,
            inter_arrival:     inter_arrival.unwrap_or(1),
            resources,
            processes,
            metrics,
            insight_rules:     self.insight_rules.clone(),
            entity_attributes: self.entity_attributes.clone(),
            start_processes,
            resource_index,
            process_index,
        })
    }
}

/// Map each name to its position, flagging repeats.  The first occurrence
/// keeps the name.
fn index_names<'a, I: TryFrom<usize>>(
    kind:       &'static str,
    names:      impl Iterator<Item = &'a String>,
    violations: &mut Vec<Violation>,
) -> BTreeMap<String, I> {
    let mut index = BTreeMap::new();
    for (i, name) in names.enumerate() {
        if index.contains_key(name) {
            violations.push(Violation::DuplicateName { kind, name: name.clone() });
            continue;
        }
        if let Ok(id) = I::try_from(i) {
            index.insert(name.clone(), id);
        }
    }
    index
}

fn validate_resources(
    defs:       &[ResourceDef],
    violations: &mut Vec<Violation>,
) -> (Vec<ResourceSpec>, BTreeMap<String, ResourceId>) {
    let index = index_names("resource", defs.iter().map(|r| &r.name), violations);
    let specs = defs
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let capacity = match u32::try_from(def.capacity) {
                Ok(c) if c > 0 => c,
                _ => {
                    violations.push(Violation::InvalidCapacity {
                        resource: def.name.clone(),
                        capacity: def.capacity,
                    });
                    1
                }
            };
            ResourceSpec {
                id:                   ResourceId(i as u32),
                name:                 def.name.clone(),
                capacity,
                cost_per_unit:        def.cost_per_unit,
                efficiency_threshold: def.efficiency_threshold,
                priority:             def.priority,
                shared:               def.shared,
            }
        })
        .collect();
    (specs, index)
}

fn validate_process(
    position:       usize,
    def:            &ProcessDef,
    resource_index: &BTreeMap<String, ResourceId>,
    process_index:  &BTreeMap<String, ProcessId>,
    violations:     &mut Vec<Violation>,
) -> ProcessSpec {
    let process = || def.name.clone();

    if def.duration < 0 {
        violations.push(Violation::NegativeDuration { process: process(), duration: def.duration });
    }
    if def.required_resources.is_empty() {
        violations.push(Violation::NoRequiredResources { process: process() });
    }

    let mut required = Vec::with_capacity(def.required_resources.len());
    for name in &def.required_resources {
        match resource_index.get(name) {
            None => violations.push(Violation::UnknownResource {
                process:  process(),
                resource: name.clone(),
            }),
            // Holding a token while queueing for a second one on the same
            // resource deadlocks once capacity is exhausted.
            Some(id) if required.contains(id) => violations.push(Violation::DuplicateRequirement {
                process:  process(),
                resource: name.clone(),
            }),
            Some(id) => required.push(*id),
        }
    }

    let mut successors = Vec::with_capacity(def.next_processes.len());
    for name in &def.next_processes {
        match process_index.get(name) {
            Some(id) => successors.push(*id),
            None => violations.push(Violation::UnknownSuccessor {
                process:   process(),
                successor: name.clone(),
            }),
        }
    }

    let guard = match def.condition.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(src) => match Guard::parse(src) {
            Ok(g) => Some(g),
            Err(error) => {
                violations.push(Violation::InvalidGuard { process: process(), error });
                None
            }
        },
    };

    ProcessSpec {
        id:                    ProcessId(position as u32),
        name:                  def.name.clone(),
        duration:              def.duration.max(0) as u64,
        required,
        expected_service_time: def.expected_service_time,
        max_acceptable_wait:   def.max_acceptable_wait,
        guard,
        successors,
        repeat:                def.repeat,
        release_resources:     def.release_resources,
    }
}

fn validate_metrics(
    defs:       &[MetricDef],
    resources:  &[ResourceSpec],
    violations: &mut Vec<Violation>,
) -> Vec<MetricSpec> {
    index_names::<MetricId>("metric", defs.iter().map(|m| &m.name), violations);

    for def in defs {
        if let Some(r) = resources.iter().find(|r| utilization_key(&r.name) == def.name) {
            violations.push(Violation::ReservedMetricName {
                metric:   def.name.clone(),
                resource: r.name.clone(),
            });
        }
    }

    defs.iter()
        .enumerate()
        .map(|(i, def)| MetricSpec {
            id:           MetricId(i as u32),
            name:         def.name.clone(),
            target_value: def.target_value,
            unit:         def.unit.clone(),
            description:  def.description.clone(),
            aggregation:  def.aggregation,
        })
        .collect()
}

fn validate_insights(
    rules:      &[InsightRule],
    metrics:    &[MetricSpec],
    resources:  &[ResourceSpec],
    violations: &mut Vec<Violation>,
) {
    for rule in rules {
        let known = metrics.iter().any(|m| m.name == rule.metric)
            || resources.iter().any(|r| utilization_key(&r.name) == rule.metric);
        if !known {
            violations.push(Violation::UnknownInsightMetric(rule.metric.clone()));
        }
        if let InsightCondition::Other(condition) = &rule.condition {
            violations.push(Violation::UnknownInsightCondition {
                metric:    rule.metric.clone(),
                condition: condition.clone(),
            });
        }
    }
}

fn start_processes(processes: &[ProcessSpec]) -> Vec<ProcessId> {
    let referenced: BTreeSet<ProcessId> = processes
        .iter()
        .flat_map(|p| p.successors.iter().copied())
        .collect();
    processes
        .iter()
        .map(|p| p.id)
        .filter(|id| !referenced.contains(id))
        .collect()
}

// ── Zero-duration cycle detection ────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Cycles in the successor/loop graph restricted to zero-duration
/// processes, in discovery order.  Every strongly connected group of such
/// processes yields at least one reported cycle.
///
/// Such a cycle re-dispatches units at the same tick forever, so the clock
/// can never reach the horizon.
fn zero_duration_cycles(processes: &[ProcessSpec]) -> Vec<Vec<ProcessId>> {
    let zero = |id: ProcessId| processes.get(id.index()).is_some_and(|p| p.duration == 0);
    let edges = |p: &ProcessSpec| -> Vec<ProcessId> {
        let mut out: Vec<ProcessId> = p.successors.iter().copied().filter(|s| zero(*s)).collect();
        if p.repeat {
            out.push(p.id);
        }
        out
    };

    let mut marks = vec![Mark::Unvisited; processes.len()];
    let mut cycles = Vec::new();

    for root in processes.iter().filter(|p| p.duration == 0) {
        if marks[root.id.index()] != Mark::Unvisited {
            continue;
        }
        // Iterative DFS: (node, remaining edges).
        let mut stack: Vec<(ProcessId, Vec<ProcessId>)> = vec![(root.id, edges(root))];
        marks[root.id.index()] = Mark::OnStack;

        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            match pending.pop() {
                None => {
                    marks[node.index()] = Mark::Done;
                    stack.pop();
                }
                Some(next) => match marks[next.index()] {
                    Mark::Done => {}
                    Mark::OnStack => {
                        let from = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                        cycles.push(stack[from..].iter().map(|(n, _)| *n).collect());
                    }
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnStack;
                        stack.push((next, edges(&processes[next.index()])));
                    }
                },
            }
        }
    }
    cycles
}

//! Unit tests for pf-config.

use pf_core::Attributes;

use crate::{
    Aggregation, InsightCondition, InsightRule, MetricDef, MetricUnit, ProcessDef, ResourceDef,
    SimulationConfig,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn resource(name: &str, capacity: i64) -> ResourceDef {
    ResourceDef {
        name: name.into(),
        capacity,
        cost_per_unit: 10.0,
        efficiency_threshold: 0.8,
        priority: false,
        shared: false,
    }
}

fn process(name: &str, duration: i64, requires: &[&str], next: &[&str]) -> ProcessDef {
    ProcessDef {
        name: name.into(),
        duration,
        required_resources: requires.iter().map(|s| s.to_string()).collect(),
        expected_service_time: duration as f64,
        max_acceptable_wait: 10.0,
        condition: None,
        next_processes: next.iter().map(|s| s.to_string()).collect(),
        repeat: false,
        release_resources: true,
    }
}

fn metric(name: &str, unit: MetricUnit) -> MetricDef {
    MetricDef {
        name: name.into(),
        target_value: 100.0,
        unit,
        description: String::new(),
        aggregation: Aggregation::Average,
    }
}

fn config(resources: Vec<ResourceDef>, processes: Vec<ProcessDef>) -> SimulationConfig {
    SimulationConfig {
        title: "test".into(),
        description: String::new(),
        business_context: String::new(),
        duration: 100,
        resources,
        processes,
        entities_per_hour: 10.0,
        target_metrics: vec![],
        insight_rules: vec![],
        entity_attributes: Attributes::new(),
    }
}

/// Checkout line: one cashier, one process.
fn checkout() -> SimulationConfig {
    config(
        vec![resource("cashier", 1)],
        vec![process("checkout", 5, &["cashier"], &[])],
    )
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use super::*;

    const DOCUMENT: &str = r#"{
        "title": "Test Simulation",
        "description": "A test simulation configuration",
        "duration": 100,
        "resources": [
            {"name": "resource1", "capacity": 2, "cost_per_unit": 10.0, "efficiency_threshold": 0.8}
        ],
        "processes": [
            {"name": "process1", "duration": 5, "required_resources": ["resource1"],
             "expected_service_time": 5, "max_acceptable_wait": 10}
        ],
        "entities_per_hour": 10,
        "target_metrics": [
            {"name": "metric1", "target_value": 100, "unit": "count", "description": "Test metric"}
        ],
        "insight_rules": [
            {"metric": "metric1", "condition": "above_threshold", "threshold": 50,
             "recommendation": "Increase capacity"}
        ],
        "business_context": "Test context"
    }"#;

    #[test]
    fn parses_full_document() {
        let cfg: SimulationConfig = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(cfg.title, "Test Simulation");
        assert_eq!(cfg.duration, 100);
        assert_eq!(cfg.resources[0].capacity, 2);
        assert_eq!(cfg.processes[0].required_resources, ["resource1"]);
        assert_eq!(cfg.target_metrics[0].unit, MetricUnit::Count);
        assert_eq!(cfg.insight_rules[0].condition, InsightCondition::AboveThreshold);
        assert!(cfg.entity_attributes.is_empty());
    }

    #[test]
    fn process_defaults() {
        let cfg: SimulationConfig = serde_json::from_str(DOCUMENT).unwrap();
        let p = &cfg.processes[0];
        assert!(p.release_resources, "release_resources defaults to true");
        assert!(!p.repeat);
        assert!(p.condition.is_none());
        assert!(p.next_processes.is_empty());
        assert_eq!(cfg.target_metrics[0].aggregation, Aggregation::Average);
    }

    #[test]
    fn loop_field_and_guard_alias() {
        let p: ProcessDef = serde_json::from_str(
            r#"{"name": "spin", "duration": 3, "required_resources": ["r"], "loop": true,
                "guard": "entity.vip"}"#,
        )
        .unwrap();
        assert!(p.repeat);
        assert_eq!(p.condition.as_deref(), Some("entity.vip"));
    }

    #[test]
    fn priority_accepts_flag_or_number() {
        let flag: ResourceDef =
            serde_json::from_str(r#"{"name": "r", "capacity": 1, "priority": true}"#).unwrap();
        let number: ResourceDef =
            serde_json::from_str(r#"{"name": "r", "capacity": 1, "priority": 2}"#).unwrap();
        let zero: ResourceDef =
            serde_json::from_str(r#"{"name": "r", "capacity": 1, "priority": 0}"#).unwrap();
        let null: ResourceDef =
            serde_json::from_str(r#"{"name": "r", "capacity": 1, "priority": null}"#).unwrap();
        assert!(flag.priority);
        assert!(number.priority);
        assert!(!zero.priority);
        assert!(!null.priority);
    }

    #[test]
    fn unknown_aggregation_falls_back_to_average() {
        let m: MetricDef = serde_json::from_str(
            r#"{"name": "m", "unit": "minutes", "aggregation": "median"}"#,
        )
        .unwrap();
        assert_eq!(m.aggregation, Aggregation::Average);

        let m: MetricDef =
            serde_json::from_str(r#"{"name": "m", "unit": "minutes", "aggregation": "MAX"}"#).unwrap();
        assert_eq!(m.aggregation, Aggregation::Max);
    }

    #[test]
    fn unknown_unit_is_preserved() {
        let m: MetricDef = serde_json::from_str(r#"{"name": "m", "unit": "dollars"}"#).unwrap();
        assert_eq!(m.unit, MetricUnit::Other("dollars".into()));
        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["unit"], "dollars");
    }

    #[test]
    fn negative_duration_survives_parse() {
        let p: ProcessDef =
            serde_json::from_str(r#"{"name": "p", "duration": -4, "required_resources": ["r"]}"#)
                .unwrap();
        assert_eq!(p.duration, -4);
    }
}

// ── Guard grammar ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod guard {
    use pf_core::{AttrValue, Attributes};

    use crate::{CmpOp, Guard, GuardError, MAX_GUARD_NESTING, MAX_GUARD_TERMS};

    fn attrs(pairs: &[(&str, AttrValue)]) -> Attributes {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn eval(src: &str, a: &Attributes) -> Result<bool, GuardError> {
        Guard::parse(src).unwrap().evaluate(a)
    }

    #[test]
    fn numeric_comparison() {
        let adult = attrs(&[("age", 30.0.into())]);
        let minor = attrs(&[("age", 12.0.into())]);
        assert_eq!(eval("entity.age > 18", &adult), Ok(true));
        assert_eq!(eval("entity.age > 18", &minor), Ok(false));
        assert_eq!(eval("age >= 30", &adult), Ok(true));
        assert_eq!(eval("entity['age'] <= 12", &minor), Ok(true));
        assert_eq!(eval("entity.age != 30", &adult), Ok(false));
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let empty = Attributes::new();
        assert_eq!(
            eval("entity.age > 18", &empty),
            Err(GuardError::MissingAttribute("age".into()))
        );
    }

    #[test]
    fn string_and_bool_equality() {
        let a = attrs(&[("tier", "gold".into()), ("vip", true.into())]);
        assert_eq!(eval(r#"entity["tier"] == "gold""#, &a), Ok(true));
        assert_eq!(eval("entity.tier == 'silver'", &a), Ok(false));
        assert_eq!(eval("entity.vip == True", &a), Ok(true));
        assert_eq!(eval("entity.vip", &a), Ok(true));
        assert_eq!(eval("!entity.vip", &a), Ok(false));
    }

    #[test]
    fn cross_type_equality_is_false_not_error() {
        let a = attrs(&[("tier", "1".into())]);
        assert_eq!(eval("entity.tier == 1", &a), Ok(false));
        assert_eq!(eval("entity.tier != 1", &a), Ok(true));
    }

    #[test]
    fn cross_type_ordering_is_a_type_mismatch() {
        let a = attrs(&[("tier", "gold".into())]);
        assert_eq!(
            eval("entity.tier > 3", &a),
            Err(GuardError::TypeMismatch { op: CmpOp::Gt, lhs: "string", rhs: "number" })
        );
    }

    #[test]
    fn precedence_and_parentheses() {
        let a = attrs(&[("x", 1.0.into()), ("y", 2.0.into())]);
        // `and` binds tighter than `or`.
        assert_eq!(eval("x == 5 or x == 1 and y == 2", &a), Ok(true));
        assert_eq!(eval("(x == 5 or x == 1) and y == 3", &a), Ok(false));
        assert_eq!(eval("not x == 5 && y == 2", &a), Ok(true));
        assert_eq!(eval("x == 5 || not (y < 0)", &a), Ok(true));
    }

    #[test]
    fn short_circuit_skips_missing_attributes() {
        let vip = attrs(&[("vip", true.into())]);
        assert_eq!(eval("entity.vip or entity.age > 18", &vip), Ok(true));
        let regular = attrs(&[("vip", false.into())]);
        assert_eq!(eval("entity.vip and entity.age > 18", &regular), Ok(false));
        assert!(eval("entity.vip or entity.age > 18", &regular).is_err());
    }

    #[test]
    fn negative_and_fractional_literals() {
        let a = attrs(&[("balance", (-2.5).into())]);
        assert_eq!(eval("balance < -1", &a), Ok(true));
        assert_eq!(eval("balance > -2.75", &a), Ok(true));
        assert_eq!(eval("balance == -2.5", &a), Ok(true));
    }

    #[test]
    fn nan_orders_false() {
        let a = attrs(&[("v", f64::NAN.into())]);
        assert_eq!(eval("v < 1", &a), Ok(false));
        assert_eq!(eval("v >= 1", &a), Ok(false));
    }

    #[test]
    fn referenced_attributes_in_order() {
        let g = Guard::parse("entity.age > 18 and (tier == 'gold' or entity['age'] < 5)").unwrap();
        assert_eq!(g.referenced_attributes(), ["age", "tier"]);
        assert_eq!(g.to_string(), "entity.age > 18 and (tier == 'gold' or entity['age'] < 5)");
    }

    #[test]
    fn parse_errors() {
        for bad in [
            "entity.age = 18",
            "entity.age > ",
            "entity.age > 18 18",
            "'unterminated",
            "(a == 1",
            "and == 1",
            "entity.",
            "entity[age]",
            "a == 1; drop",
            "__import__('os')",
            "- a",
        ] {
            assert!(Guard::parse(bad).is_err(), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let at_limit = format!("{}x{}", "(".repeat(MAX_GUARD_NESTING), ")".repeat(MAX_GUARD_NESTING));
        assert!(Guard::parse(&at_limit).is_ok());

        let deep = MAX_GUARD_NESTING + 1;
        assert!(Guard::parse(&format!("{}x{}", "(".repeat(deep), ")".repeat(deep))).is_err());
        assert!(Guard::parse(&format!("{}x", "not ".repeat(deep))).is_err());
        assert!(Guard::parse(&format!("{}x", "!".repeat(deep))).is_err());
    }

    #[test]
    fn huge_nesting_is_an_error_not_a_crash() {
        let n = 200_000;
        let err = Guard::parse(&format!("{}x{}", "(".repeat(n), ")".repeat(n))).unwrap_err();
        assert!(err.offset <= MAX_GUARD_NESTING + 1, "offset {}", err.offset);
        assert!(Guard::parse(&format!("{}x", "not ".repeat(n))).is_err());
    }

    #[test]
    fn term_count_is_bounded() {
        let chain = |n: usize| vec!["a"; n].join(" and ");
        assert!(Guard::parse(&chain(MAX_GUARD_TERMS)).is_ok());
        assert!(Guard::parse(&chain(MAX_GUARD_TERMS + 1)).is_err());
        assert!(Guard::parse(&vec!["a"; 100_000].join(" || ")).is_err());
    }

    #[test]
    fn parse_error_reports_offset() {
        let err = Guard::parse("entity.age = 18").unwrap_err();
        assert_eq!(err.offset, 11);
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod validate {
    use pf_core::{ProcessId, ResourceId, Tick};

    use super::*;
    use crate::Violation;

    #[test]
    fn valid_checkout_resolves_ids() {
        let v = checkout().validate().unwrap();
        assert_eq!(v.horizon, Tick(100));
        assert_eq!(v.inter_arrival, 360);
        assert_eq!(v.resource_id("cashier"), Some(ResourceId(0)));
        assert_eq!(v.process_id("checkout"), Some(ProcessId(0)));
        assert_eq!(v.process(ProcessId(0)).required, [ResourceId(0)]);
        assert_eq!(v.resource(ResourceId(0)).capacity, 1);
        assert_eq!(v.start_processes, [ProcessId(0)]);
    }

    #[test]
    fn validation_is_pure() {
        let cfg = checkout();
        let a = cfg.validate().unwrap();
        let b = cfg.validate().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.resource_index, b.resource_index);
        assert_eq!(a.process_index, b.process_index);
    }

    #[test]
    fn reports_every_violation_at_once() {
        let cfg = config(
            vec![resource("cashier", 1)],
            vec![
                process("checkout", -1, &["cashier", "bagger"], &["wrap"]),
                process("pay", 2, &[], &[]),
            ],
        );
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                Violation::NegativeDuration { process: "checkout".into(), duration: -1 },
                Violation::UnknownResource { process: "checkout".into(), resource: "bagger".into() },
                Violation::UnknownSuccessor { process: "checkout".into(), successor: "wrap".into() },
                Violation::NoRequiredResources { process: "pay".into() },
            ]
        );
        let msg = err.to_string();
        assert!(msg.contains("4 violation(s)"), "{msg}");
        assert!(msg.contains("bagger") && msg.contains("wrap"), "{msg}");
    }

    #[test]
    fn horizon_rate_and_capacity_ranges() {
        let mut cfg = config(vec![resource("r", 0)], vec![process("p", 1, &["r"], &[])]);
        cfg.duration = -5;
        cfg.entities_per_hour = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.violations.contains(&Violation::NegativeHorizon(-5)));
        assert!(err.violations.contains(&Violation::InvalidArrivalRate(0.0)));
        assert!(err.violations.contains(&Violation::InvalidCapacity { resource: "r".into(), capacity: 0 }));
    }

    #[test]
    fn duplicate_names() {
        let mut cfg = config(
            vec![resource("r", 1), resource("r", 2)],
            vec![process("p", 1, &["r"], &[]), process("p", 1, &["r"], &[])],
        );
        cfg.target_metrics = vec![metric("m", MetricUnit::Count), metric("m", MetricUnit::Count)];
        let err = cfg.validate().unwrap_err();
        for kind in ["resource", "process", "metric"] {
            let name = if kind == "resource" { "r" } else if kind == "process" { "p" } else { "m" };
            assert!(
                err.violations.contains(&Violation::DuplicateName { kind, name: name.into() }),
                "missing duplicate {kind}: {err}"
            );
        }
    }

    #[test]
    fn duplicate_requirement_rejected() {
        let cfg = config(vec![resource("r", 1)], vec![process("p", 1, &["r", "r"], &[])]);
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.violations,
            [Violation::DuplicateRequirement { process: "p".into(), resource: "r".into() }]
        );
    }

    #[test]
    fn invalid_guard_reported() {
        let mut p = process("p", 1, &["r"], &[]);
        p.condition = Some("entity.age >".into());
        let err = config(vec![resource("r", 1)], vec![p]).validate().unwrap_err();
        assert!(matches!(&err.violations[..], [Violation::InvalidGuard { process, .. }] if process == "p"));
    }

    #[test]
    fn deeply_nested_guard_reported() {
        let mut p = process("p", 1, &["r"], &[]);
        p.condition = Some(format!("{}x{}", "(".repeat(100_000), ")".repeat(100_000)));
        let err = config(vec![resource("r", 1)], vec![p]).validate().unwrap_err();
        assert!(matches!(&err.violations[..], [Violation::InvalidGuard { process, .. }] if process == "p"));
    }

    #[test]
    fn blank_guard_means_no_guard() {
        let mut p = process("p", 1, &["r"], &[]);
        p.condition = Some("   ".into());
        let v = config(vec![resource("r", 1)], vec![p]).validate().unwrap();
        assert!(v.processes[0].guard.is_none());
    }

    #[test]
    fn start_processes_exclude_successors() {
        let cfg = config(
            vec![resource("r", 1)],
            vec![
                process("intake", 1, &["r"], &["triage"]),
                process("triage", 1, &["r"], &["treat", "triage"]),
                process("treat", 1, &["r"], &[]),
                process("walk_in", 1, &["r"], &["treat"]),
            ],
        );
        let v = cfg.validate().unwrap();
        assert_eq!(v.start_processes, [ProcessId(0), ProcessId(3)]);
    }

    #[test]
    fn looping_process_is_still_a_start_process() {
        let mut p = process("spin", 3, &["r"], &[]);
        p.repeat = true;
        let v = config(vec![resource("r", 1)], vec![p]).validate().unwrap();
        assert_eq!(v.start_processes, [ProcessId(0)]);
    }

    #[test]
    fn zero_duration_loop_rejected() {
        let mut p = process("spin", 0, &["r"], &[]);
        p.repeat = true;
        let err = config(vec![resource("r", 1)], vec![p]).validate().unwrap_err();
        assert_eq!(err.violations, [Violation::ZeroDurationCycle(vec!["spin".into()])]);
    }

    #[test]
    fn zero_duration_successor_cycle_rejected() {
        let cfg = config(
            vec![resource("r", 1)],
            vec![
                process("start", 4, &["r"], &["a"]),
                process("a", 0, &["r"], &["b"]),
                process("b", 0, &["r"], &["a"]),
            ],
        );
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        let Violation::ZeroDurationCycle(names) = &err.violations[0] else {
            panic!("unexpected violation: {err}");
        };
        let mut names = names.clone();
        names.sort();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn cycle_through_timed_process_is_fine() {
        let cfg = config(
            vec![resource("r", 1)],
            vec![
                process("a", 0, &["r"], &["b"]),
                process("b", 3, &["r"], &["a"]),
                process("entry", 1, &["r"], &["a"]),
            ],
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn metric_may_not_shadow_utilization() {
        let mut cfg = checkout();
        cfg.target_metrics = vec![metric("cashier_utilization", MetricUnit::Percentage)];
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.violations,
            [Violation::ReservedMetricName {
                metric:   "cashier_utilization".into(),
                resource: "cashier".into(),
            }]
        );
    }

    #[test]
    fn insight_rules_checked() {
        let mut cfg = checkout();
        cfg.target_metrics = vec![metric("served", MetricUnit::Count)];
        let rule = |metric: &str, condition: &str| InsightRule {
            metric:         metric.into(),
            condition:      InsightCondition::from(condition.to_string()),
            threshold:      1.0,
            recommendation: "r".into(),
        };
        cfg.insight_rules = vec![
            rule("served", "below_target"),
            rule("cashier_utilization", "above_threshold"),
            rule("ghost", "above_threshold"),
            rule("served", "sideways"),
        ];
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.violations,
            [
                Violation::UnknownInsightMetric("ghost".into()),
                Violation::UnknownInsightCondition {
                    metric:    "served".into(),
                    condition: "sideways".into(),
                },
            ]
        );
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Write;

    use crate::{LoadError, load_config_json, load_config_reader, load_validated_json};

    const MINIMAL: &str = r#"{
        "duration": 60,
        "entities_per_hour": 120,
        "resources": [{"name": "desk", "capacity": 1}],
        "processes": [{"name": "serve", "duration": 4, "required_resources": ["desk"]}],
        "entity_attributes": {"age": 40}
    }"#;

    #[test]
    fn reader_parses_minimal_document() {
        let cfg = load_config_reader(MINIMAL.as_bytes()).unwrap();
        assert_eq!(cfg.duration, 60);
        assert!(cfg.title.is_empty());
        assert_eq!(cfg.validate().unwrap().inter_arrival, 30);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = load_config_reader(&b"{\"duration\": "[..]).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let cfg = load_config_json(file.path()).unwrap();
        assert_eq!(cfg.processes[0].name, "serve");
        assert!(load_validated_json(file.path()).is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config_json(std::path::Path::new("/nonexistent/procflow.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn validated_load_surfaces_violations() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.replace("\"desk\"]", "\"counter\"]").as_bytes()).unwrap();
        let err = load_validated_json(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ref e) if e.violations.len() == 1), "{err}");
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;
    use crate::Violation;

    proptest! {
        /// One `NegativeDuration` per negative process duration, and the
        /// result is identical on every call.
        #[test]
        fn negative_durations_all_reported(durations in prop::collection::vec(-5i64..20, 1..8)) {
            let processes = durations
                .iter()
                .enumerate()
                .map(|(i, &d)| process(&format!("p{i}"), d, &["r"], &[]))
                .collect();
            let cfg = config(vec![resource("r", 2)], processes);

            let expected = durations.iter().filter(|d| **d < 0).count();
            let first = cfg.validate();
            prop_assert_eq!(&first, &cfg.validate());

            let reported = match &first {
                Ok(_) => 0,
                Err(e) => e
                    .violations
                    .iter()
                    .filter(|v| matches!(v, Violation::NegativeDuration { .. }))
                    .count(),
            };
            prop_assert_eq!(reported, expected);
        }
    }
}

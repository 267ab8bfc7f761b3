//! Integration tests for pf-output.

use serde_json::{Value, json};

use pf_config::{InsightCondition, SimulationConfig, ValidatedConfig};
use pf_sim::{NoopObserver, Sim, SimBuilder, SimulationResult};

use crate::{CsvReportWriter, MetricRow, ReportObserver, ReportWriter, SimulationReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One cashier, five-tick checkout, one arrival per tick.
///
/// Finishes with served = 19, cycle_time max = 77, cashier utilization 100.
fn checkout() -> Value {
    json!({
        "title": "busy checkout",
        "description": "lunch rush",
        "business_context": "grocery",
        "duration": 100,
        "entities_per_hour": 3600,
        "resources": [{"name": "cashier", "capacity": 1}],
        "processes": [{"name": "checkout", "duration": 5, "required_resources": ["cashier"]}],
        "target_metrics": [
            {"name": "served",     "unit": "count",   "target_value": 50},
            {"name": "cycle_time", "unit": "minutes", "aggregation": "max"}
        ],
        "insight_rules": [
            {"metric": "served",              "condition": "below_target",    "threshold": 0,  "recommendation": "open another lane"},
            {"metric": "cycle_time",          "condition": "above_threshold", "threshold": 60, "recommendation": "speed up scanning"},
            {"metric": "cashier_utilization", "condition": "below_target",    "threshold": 90, "recommendation": "cut a shift"},
            {"metric": "cashier_utilization", "condition": "above_threshold", "threshold": 95, "recommendation": "hire a cashier"}
        ]
    })
}

fn build(value: Value) -> Sim {
    let config: SimulationConfig = serde_json::from_value(value).unwrap();
    SimBuilder::new(config).build().unwrap()
}

fn run(value: Value) -> (SimulationResult, ValidatedConfig) {
    let mut sim = build(value);
    let result = sim.run(&mut NoopObserver);
    (result, sim.config().clone())
}

fn read_csv(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_owned).collect())
        .collect()
}

fn headers(path: &std::path::Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.headers().unwrap().iter().map(str::to_owned).collect()
}

// ── Insights ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod insights {
    use super::*;
    use crate::evaluate_insights;

    #[test]
    fn fired_rules_in_rule_order() {
        let (result, config) = run(checkout());
        let fired = evaluate_insights(&result, &config);

        let summary: Vec<_> = fired
            .iter()
            .map(|i| (i.metric.as_str(), i.condition.as_str(), i.observed))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("served", "below_target", 19.0),
                ("cycle_time", "above_threshold", 77.0),
                ("cashier_utilization", "above_threshold", 100.0),
            ]
        );
        assert_eq!(fired[0].recommendation, "open another lane");
    }

    #[test]
    fn below_target_uses_declared_target_not_threshold() {
        // served = 19: threshold 0 alone would never fire; target 50 does.
        let mut v = checkout();
        v["target_metrics"][0]["target_value"] = json!(10);
        let (result, config) = run(v);
        let fired = evaluate_insights(&result, &config);
        assert!(fired.iter().all(|i| i.metric != "served"));
    }

    #[test]
    fn above_threshold_is_strict() {
        let mut v = checkout();
        v["insight_rules"] = json!([
            {"metric": "cycle_time", "condition": "above_threshold", "threshold": 77, "recommendation": "-"}
        ]);
        let (result, config) = run(v);
        assert!(evaluate_insights(&result, &config).is_empty());
    }

    #[test]
    fn no_rules_no_insights() {
        let mut v = checkout();
        v["insight_rules"] = json!([]);
        let (result, config) = run(v);
        assert!(evaluate_insights(&result, &config).is_empty());
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod report {
    use super::*;

    #[test]
    fn report_carries_narrative_and_result() {
        let (result, config) = run(checkout());
        let report = SimulationReport::new(result.clone(), &config);
        assert_eq!(report.title, "busy checkout");
        assert_eq!(report.description, "lunch rush");
        assert_eq!(report.business_context, "grocery");
        assert_eq!(report.simulation_time(), result.simulation_time);
        assert_eq!(report.insights.len(), 3);
    }

    #[test]
    fn json_flattens_result_fields() {
        let (result, config) = run(checkout());
        let report = SimulationReport::new(result, &config);

        let mut buf = Vec::new();
        crate::write_report_json(&report, &mut buf).unwrap();
        assert!(buf.ends_with(b"\n"));

        let v: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["title"], json!("busy checkout"));
        assert_eq!(v["simulation_time"], json!(100));
        assert_eq!(v["metrics"]["served"], json!(19));
        assert_eq!(v["metrics"]["cycle_time"]["max"], json!(77.0));
        assert_eq!(v["insights"][1]["condition"], json!("above_threshold"));
        assert_eq!(v["insights"][1]["threshold"], json!(60.0));
        assert!(v.get("result").is_none());
    }

    #[test]
    fn metric_rows_in_name_order() {
        let (result, _) = run(checkout());
        let rows = MetricRow::from_result(&result);
        let names: Vec<_> = rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(names, ["cashier_utilization", "cycle_time", "served"]);

        let served = &rows[2];
        assert_eq!((served.aggregation, served.value, served.samples), ("count", 19.0, None));
        assert_eq!(rows[1].samples, Some(19));
    }

    #[test]
    fn insight_condition_round_trips_as_tag() {
        let (result, config) = run(checkout());
        let report = SimulationReport::new(result, &config);
        assert_eq!(report.insights[0].condition, InsightCondition::BelowTarget);
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_writer {
    use super::*;
    use crate::csv::{INSIGHTS_FILE, METRICS_FILE};

    #[test]
    fn headers_written_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = CsvReportWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir.path().join(METRICS_FILE)), ["metric", "aggregation", "value", "samples"]);
        assert_eq!(
            headers(&dir.path().join(INSIGHTS_FILE)),
            ["metric", "condition", "threshold", "observed", "recommendation"]
        );
        assert!(read_csv(&dir.path().join(METRICS_FILE)).is_empty());
    }

    #[test]
    fn report_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (result, config) = run(checkout());
        let report = SimulationReport::new(result, &config);

        let mut w = CsvReportWriter::new(dir.path()).unwrap();
        w.write_report(&report).unwrap();

        let metrics = read_csv(&dir.path().join(METRICS_FILE));
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0], ["cashier_utilization", "average", "100", "19"]);
        assert_eq!(metrics[1], ["cycle_time", "max", "77", "19"]);
        assert_eq!(metrics[2], ["served", "count", "19", ""]);

        let insights = read_csv(&dir.path().join(INSIGHTS_FILE));
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[2], ["cashier_utilization", "above_threshold", "95", "100", "hire a cashier"]);
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = CsvReportWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CsvReportWriter::new(&dir.path().join("nope")).is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer {
    use super::*;
    use crate::csv::METRICS_FILE;

    #[test]
    fn writes_report_when_run_ends() {
        let dir = tempfile::tempdir().unwrap();
        let mut sim = build(checkout());
        let writer = CsvReportWriter::new(dir.path()).unwrap();
        let mut obs = ReportObserver::new(writer, sim.config());

        sim.run(&mut obs);
        assert!(obs.take_error().is_none());

        let report = obs.take_report().unwrap();
        assert_eq!(report.insights.len(), 3);
        assert_eq!(read_csv(&dir.path().join(METRICS_FILE)).len(), 3);
    }

    /// Writer whose every call fails.
    struct Broken;

    impl ReportWriter for Broken {
        fn write_metrics(&mut self, _: &[MetricRow]) -> crate::OutputResult<()> {
            Err(std::io::Error::other("disk full").into())
        }
        fn write_insights(&mut self, _: &[crate::Insight]) -> crate::OutputResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> crate::OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error_is_stored_not_raised() {
        let mut sim = build(checkout());
        let mut obs = ReportObserver::new(Broken, sim.config());
        sim.run(&mut obs);

        let err = obs.take_error().unwrap();
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none());
        assert!(obs.take_report().is_some());
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite {
    use super::*;
    use crate::SqliteReportWriter;
    use crate::sqlite::REPORT_DB;

    #[test]
    fn report_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (result, config) = run(checkout());
        let report = SimulationReport::new(result, &config);

        let mut w = SqliteReportWriter::new(dir.path()).unwrap();
        w.write_report(&report).unwrap();
        drop(w);

        let conn = rusqlite::Connection::open(dir.path().join(REPORT_DB)).unwrap();
        let metrics: i64 = conn.query_row("SELECT COUNT(*) FROM metrics", [], |r| r.get(0)).unwrap();
        assert_eq!(metrics, 3);

        let served: (f64, Option<i64>) = conn
            .query_row("SELECT value, samples FROM metrics WHERE metric = 'served'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(served, (19.0, None));

        let insights: i64 = conn.query_row("SELECT COUNT(*) FROM insights", [], |r| r.get(0)).unwrap();
        assert_eq!(insights, 3);
    }
}

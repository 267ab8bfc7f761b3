//! checkout — runs a process-flow configuration and prints its report.
//!
//! ```text
//! checkout [CONFIG.json] [--csv DIR]
//! ```
//!
//! Without a configuration path the built-in grocery checkout scenario is
//! used: shoppers browse, queue for one of two cashiers, and loyalty members
//! take a detour past the rewards desk.  `RUST_LOG=debug` shows engine
//! events.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use pf_config::{SimulationConfig, load_config_json, load_config_reader};
use pf_output::{CsvReportWriter, ReportObserver, SimulationReport, write_report_json};
use pf_sim::{NoopObserver, SimBuilder};

// ── Built-in scenario ─────────────────────────────────────────────────────────

const CHECKOUT_JSON: &str = r#"{
  "title": "Grocery checkout",
  "description": "Two cashiers serving a steady stream of shoppers.",
  "business_context": "Weekday afternoon at a neighbourhood store.",
  "duration": 28800,
  "entities_per_hour": 40,
  "entity_attributes": { "loyalty": false, "basket": 12 },
  "resources": [
    { "name": "cashier", "capacity": 2, "cost_per_unit": 18.5, "efficiency_threshold": 0.8 },
    { "name": "rewards_desk", "capacity": 1 }
  ],
  "processes": [
    { "name": "browse", "duration": 600, "next_processes": ["checkout", "rewards"] },
    { "name": "checkout", "duration": 150, "required_resources": ["cashier"],
      "expected_service_time": 120, "max_acceptable_wait": 300 },
    { "name": "rewards", "duration": 90, "required_resources": ["rewards_desk"],
      "condition": "entity.loyalty == true" }
  ],
  "target_metrics": [
    { "name": "shoppers_served", "unit": "count", "target_value": 300 },
    { "name": "time_in_store", "unit": "minutes", "target_value": 15, "aggregation": "average" },
    { "name": "service_stretch", "unit": "percentage", "target_value": 100, "aggregation": "max" }
  ],
  "insight_rules": [
    { "metric": "cashier_utilization", "condition": "above_threshold", "threshold": 85,
      "recommendation": "Open a third lane during the afternoon peak." },
    { "metric": "shoppers_served", "condition": "below_target", "threshold": 0,
      "recommendation": "Throughput is short of plan; review staffing." }
  ]
}"#;

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    config:  Option<PathBuf>,
    csv_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { config: None, csv_dir: None };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--csv" => {
                let dir = it.next().context("--csv needs a directory")?;
                args.csv_dir = Some(PathBuf::from(dir));
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path => {
                if args.config.is_some() {
                    bail!("more than one configuration path given");
                }
                args.config = Some(PathBuf::from(path));
            }
        }
    }
    Ok(args)
}

fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(p) => load_config_json(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(load_config_reader(Cursor::new(CHECKOUT_JSON))?),
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = load(args.config.as_deref())?;
    let mut sim = SimBuilder::new(config).build()?;

    let t0 = Instant::now();
    let report = match &args.csv_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let writer = CsvReportWriter::new(dir)?;
            let mut obs = ReportObserver::new(writer, sim.config());
            sim.run(&mut obs);
            if let Some(e) = obs.take_error() {
                eprintln!("output error: {e}");
            }
            obs.take_report().context("run finished without a report")?
        }
        None => {
            let result = sim.run(&mut NoopObserver);
            SimulationReport::new(result, sim.config())
        }
    };
    let elapsed = t0.elapsed();

    let stats = sim.stats();
    tracing::info!(
        elapsed_ms  = elapsed.as_millis() as u64,
        entities    = stats.entities_created,
        completions = stats.completions,
        guard_skips = stats.guard_skips,
        insights    = report.insights.len(),
        "run complete"
    );

    write_report_json(&report, std::io::stdout().lock())?;
    Ok(())
}

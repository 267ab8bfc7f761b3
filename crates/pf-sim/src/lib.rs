//! `pf-sim` — discrete-event run loop for the procflow engine.
//!
//! # Scheduled units
//!
//! Two kinds of unit are driven by the event loop:
//!
//! | Unit              | Lifetime          | Suspends on                         |
//! |-------------------|-------------------|-------------------------------------|
//! | Entity generator  | whole run         | inter-arrival delay                 |
//! | Process flow      | one entity × one process | resource wait, process duration |
//!
//! A flow unit walks `guard → acquire (declared order) → execute → complete`.
//! On completion it records metrics, releases its tokens (unless the process
//! keeps them), and dispatches successor and loop units at the same tick.
//!
//! # Determinism
//!
//! Same-tick units resume in the order they were scheduled; resource waiters
//! are served by `(priority, arrival)`; every map is ordered.  Replaying a
//! configuration reproduces the same result bit for bit.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pf_sim::{NoopObserver, SimBuilder};
//!
//! let config = pf_config::load_config_json(path)?;
//! let mut sim = SimBuilder::new(config).build()?;
//! let result = sim.run(&mut NoopObserver);
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod result;
pub mod sim;

mod generator;
mod interpreter;
mod unit;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use result::{RunStats, SimulationResult};
pub use sim::{Sim, simulate};

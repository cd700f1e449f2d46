//! Simulation harness, metrics and timeline.
//!
//! A [`Simulation`] drives a [`Dispatcher`](crate::dispatching::Dispatcher)
//! through a workload one tick at a time and returns a
//! [`SimulationReport`]. The [`Timeline`] turns a report into per-tick task
//! states for Gantt output.
//!
//! # Workloads
//!
//! - Generated: [`generate_tasks`] draws a reproducible task set from a
//!   seeded RNG, shaped by [`SimulationConfig`].
//! - Explicit: [`Simulation::with_tasks`] takes a validated list of
//!   [`TaskSpec`]s.

mod harness;
mod kpi;
mod timeline;

pub use harness::{generate_tasks, Simulation, SimulationConfig, TaskSpec};
pub use kpi::{SimulationReport, TaskReport};
pub use timeline::{TaskTimeline, TickState, Timeline};

//! Pluggable CPU scheduling policies and a discrete-time simulator.
//!
//! Policies share one contract and are swapped at runtime without losing
//! ready tasks. A harness drives the active policy through a workload one
//! tick at a time and reports response times, context switches and a Gantt
//! timeline.
//!
//! # Modules
//!
//! - **`models`**: `Task`, `TaskHandle` and the ordered `TaskList`
//! - **`dispatching`**: policy contract, built-in policies, registry and the
//!   `Dispatcher`
//! - **`simulation`**: workload generation, tick loop, metrics, timeline
//! - **`report`**: `.log` and WaveDrom `.json` report files
//! - **`validation`**: task-set integrity checks
//! - **`logger`**: stderr backend for the `log` facade
//!
//! # Example
//!
//! ```
//! use task_sched::dispatching::{registry, Dispatcher};
//! use task_sched::simulation::{Simulation, SimulationConfig};
//!
//! let simulation = Simulation::new(SimulationConfig::default().with_task_count(10)).unwrap();
//! let mut dispatcher = Dispatcher::new();
//! for name in registry::builtin_names() {
//!     dispatcher.install_policy(registry::load(name).unwrap()).unwrap();
//! }
//! for name in dispatcher.list_policy_names() {
//!     let report = simulation.run(&mut dispatcher, &name).unwrap();
//!     assert_eq!(report.tasks.len(), 10);
//! }
//! ```

pub mod dispatching;
pub mod error;
pub mod logger;
pub mod models;
pub mod report;
pub mod simulation;
pub mod validation;

pub use error::{Result, SchedError};

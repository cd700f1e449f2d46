//! Simulation quality metrics.
//!
//! Computes per-task and aggregate indicators from the finished tasks of a
//! run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Response | `finish - arrive` |
//! | Normalized response | `response / run_time` |
//! | Makespan | Latest completion tick |
//! | Context switches | Changes from one task directly to another |
//! | Idle transitions | Changes between a task and the idle processor |

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// Outcome of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Task name.
    pub name: String,
    /// Priority level.
    pub priority: u8,
    /// Arrival tick.
    pub arrive_time: u64,
    /// Completion tick (`None` if the task never finished).
    pub finish_time: Option<u64>,
    /// Ticks executed.
    pub run_time: u64,
    /// `finish - arrive`.
    pub response_time: u64,
    /// `response / run_time`.
    pub normalized_response: f64,
    /// Half-open `[start, stop)` intervals on the processor.
    pub intervals: Vec<(u64, u64)>,
}

impl TaskReport {
    /// Builds the report of a task after the run.
    ///
    /// A start with no matching stop is closed at the finish tick.
    pub fn from_task(task: &Task) -> Self {
        let response_time = task.response_time().unwrap_or(0);
        let normalized_response = if task.run_time == 0 {
            0.0
        } else {
            response_time as f64 / task.run_time as f64
        };
        let close = task.finish_time.unwrap_or(task.arrive_time);
        let intervals = task
            .start_times
            .iter()
            .enumerate()
            .map(|(i, &start)| (start, task.stop_times.get(i).copied().unwrap_or(close)))
            .collect();

        Self {
            name: task.name.clone(),
            priority: task.priority,
            arrive_time: task.arrive_time,
            finish_time: task.finish_time,
            run_time: task.run_time,
            response_time,
            normalized_response,
            intervals,
        }
    }

    /// Whether the task occupied the processor during tick `t`.
    pub fn is_running_at(&self, t: u64) -> bool {
        self.intervals
            .iter()
            .any(|&(start, stop)| start <= t && t < stop)
    }
}

/// Aggregate results of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Policy that ran the simulation.
    pub policy: String,
    /// Per-task outcomes, in task-set order.
    pub tasks: Vec<TaskReport>,
    /// Mean response time.
    pub mean_response: f64,
    /// Mean normalized response time.
    pub mean_normalized_response: f64,
    /// Task-to-task switches.
    pub context_switches: u64,
    /// Switches to or from the idle processor.
    pub idle_transitions: u64,
    /// Latest completion tick.
    pub makespan: u64,
}

impl SimulationReport {
    /// Computes the report from the finished tasks and the switch counts.
    pub fn calculate(
        policy: impl Into<String>,
        tasks: &[Task],
        context_switches: u64,
        idle_transitions: u64,
    ) -> Self {
        let tasks: Vec<TaskReport> = tasks.iter().map(TaskReport::from_task).collect();
        let makespan = tasks.iter().filter_map(|t| t.finish_time).max().unwrap_or(0);

        let (mean_response, mean_normalized_response) = if tasks.is_empty() {
            (0.0, 0.0)
        } else {
            let n = tasks.len() as f64;
            let response: f64 = tasks.iter().map(|t| t.response_time as f64).sum();
            let normalized: f64 = tasks.iter().map(|t| t.normalized_response).sum();
            (response / n, normalized / n)
        };

        Self {
            policy: policy.into(),
            tasks,
            mean_response,
            mean_normalized_response,
            context_switches,
            idle_transitions,
            makespan,
        }
    }

    /// Raw processor-assignment changes, idle included.
    pub fn total_switches(&self) -> u64 {
        self.context_switches + self.idle_transitions
    }

    /// Report of the task called `name`.
    pub fn task(&self, name: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

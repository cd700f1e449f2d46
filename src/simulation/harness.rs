//! Discrete-time simulation harness.
//!
//! # Algorithm
//!
//! For every tick `t`, starting at 0:
//! 1. The running task does one tick of work.
//! 2. Every task arriving at `t` is handed to the dispatcher, in task-set
//!    order.
//! 3. If the running task has no work left it finishes at `t` and the
//!    dispatcher picks a successor; otherwise the dispatcher gets a tick.
//! 4. A change of running task closes the old interval and opens the new
//!    one at `t`.
//!
//! The run ends once every task has finished, or fails after
//! `max_ticks` ticks.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::kpi::SimulationReport;
use crate::dispatching::Dispatcher;
use crate::error::{Result, SchedError};
use crate::models::{record_start, record_stop, Task, TaskHandle};
use crate::validation::validate_tasks;

/// Workload and limits of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of generated tasks.
    pub task_count: usize,
    /// Seed of the task generator.
    pub seed: u64,
    /// Arrival offsets are drawn from `0..max_arrival_gap`.
    pub max_arrival_gap: u64,
    /// Priorities are drawn from `0..priority_levels`.
    pub priority_levels: u8,
    /// Run times are drawn from `1..=run_length_factor * (priority + 1)`.
    pub run_length_factor: u64,
    /// Tick limit before a run is abandoned.
    pub max_ticks: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            task_count: 50,
            seed: 0,
            max_arrival_gap: 15,
            priority_levels: 4,
            run_length_factor: 5,
            max_ticks: 1_000_000,
        }
    }
}

impl SimulationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of generated tasks.
    pub fn with_task_count(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    /// Sets the generator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the maximum gap between consecutive arrivals.
    pub fn with_max_arrival_gap(mut self, gap: u64) -> Self {
        self.max_arrival_gap = gap;
        self
    }

    /// Sets the number of priority levels.
    pub fn with_priority_levels(mut self, levels: u8) -> Self {
        self.priority_levels = levels;
        self
    }

    /// Sets the run length factor.
    pub fn with_run_length_factor(mut self, factor: u64) -> Self {
        self.run_length_factor = factor;
        self
    }

    /// Sets the tick limit.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Checks that the generator ranges are non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.priority_levels == 0 {
            return Err(SchedError::invalid("priority_levels must be at least 1"));
        }
        if self.run_length_factor == 0 {
            return Err(SchedError::invalid("run_length_factor must be at least 1"));
        }
        Ok(())
    }
}

/// Description of one task to simulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Unique name.
    pub name: String,
    /// Arrival tick.
    pub arrive_time: u64,
    /// Ticks of work.
    pub run_time: u64,
    /// Priority level (lower = more urgent).
    #[serde(default)]
    pub priority: u8,
}

impl TaskSpec {
    /// Creates a task description.
    pub fn new(name: impl Into<String>, arrive_time: u64, run_time: u64, priority: u8) -> Self {
        Self {
            name: name.into(),
            arrive_time,
            run_time,
            priority,
        }
    }

    fn instantiate(&self) -> Result<TaskHandle> {
        Task::new(&self.name, self.arrive_time, self.run_time, self.priority).map(TaskHandle::new)
    }
}

/// Generates the reproducible pseudo-random workload for `config`.
///
/// Arrivals are non-decreasing. Names are the zero-padded index (`"00"`,
/// `"01"`, ...).
pub fn generate_tasks(config: &SimulationConfig) -> Result<Vec<TaskSpec>> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut arrive_time = 0;
    let tasks = (0..config.task_count)
        .map(|i| {
            if config.max_arrival_gap > 0 {
                arrive_time += rng.random_range(0..config.max_arrival_gap);
            }
            let priority = rng.random_range(0..config.priority_levels);
            let span = config.run_length_factor * (u64::from(priority) + 1);
            let run_time = rng.random_range(0..span) + 1;
            TaskSpec::new(format!("{i:02}"), arrive_time, run_time, priority)
        })
        .collect();
    Ok(tasks)
}

/// A workload ready to be run under any number of policies.
///
/// # Example
///
/// ```
/// use task_sched::dispatching::{registry, Dispatcher};
/// use task_sched::simulation::{Simulation, SimulationConfig, TaskSpec};
///
/// let tasks = vec![TaskSpec::new("A", 0, 3, 0), TaskSpec::new("B", 1, 2, 0)];
/// let simulation = Simulation::with_tasks(SimulationConfig::default(), tasks).unwrap();
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.install_policy(registry::load("fcfs").unwrap()).unwrap();
/// let report = simulation.run(&mut dispatcher, "fcfs").unwrap();
/// assert_eq!(report.makespan, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    tasks: Vec<TaskSpec>,
}

impl Simulation {
    /// Creates a simulation over the generated workload of `config`.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let tasks = generate_tasks(&config)?;
        Ok(Self { config, tasks })
    }

    /// Creates a simulation over an explicit task set.
    ///
    /// The set is validated against `config.priority_levels` and stably
    /// sorted by arrival.
    pub fn with_tasks(config: SimulationConfig, mut tasks: Vec<TaskSpec>) -> Result<Self> {
        validate_tasks(&tasks, config.priority_levels).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            SchedError::invalid(messages.join("; "))
        })?;
        tasks.sort_by_key(|t| t.arrive_time);
        Ok(Self { config, tasks })
    }

    /// Configuration of the run.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Task set, in arrival order.
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Runs the workload under `policy`, which must be installed in
    /// `dispatcher`. The policy becomes the active one.
    ///
    /// Every run starts from fresh tasks. Tasks still queued in the
    /// dispatcher from an earlier run (for example one that hit the tick
    /// limit) are discarded first.
    pub fn run(&self, dispatcher: &mut Dispatcher, policy: &str) -> Result<SimulationReport> {
        let handles = self
            .tasks
            .iter()
            .map(TaskSpec::instantiate)
            .collect::<Result<Vec<_>>>()?;
        let stale = dispatcher.deactivate();
        if stale > 0 {
            warn!("Discarded {stale} task(s) left over from an earlier run");
        }
        dispatcher.set_active_policy(policy)?;
        info!(
            "Simulating {} task(s) under policy '{policy}'",
            handles.len()
        );

        let mut arrivals = handles.iter().peekable();
        let mut outstanding = handles.len();
        let mut current: Option<TaskHandle> = None;
        let mut context_switches = 0u64;
        let mut idle_transitions = 0u64;
        let mut time = 0u64;

        if let Some(first) = arrivals.peek() {
            debug!("Waiting for time {}", first.borrow().arrive_time);
        }

        while outstanding > 0 {
            if time >= self.config.max_ticks {
                return Err(SchedError::TickLimit {
                    limit: self.config.max_ticks,
                    outstanding,
                });
            }

            if let Some(task) = &current {
                let mut task = task.borrow_mut();
                task.remaining_time = task.remaining_time.saturating_sub(1);
                task.run_time += 1;
            }

            while let Some(task) = arrivals.next_if(|t| t.borrow().arrive_time == time) {
                debug!("Task {} arrived at {time}", task.name());
                dispatcher.on_task_arrive(task.clone())?;
            }

            let finished = current.as_ref().filter(|task| task.remaining_time() == 0);
            let next = match finished {
                Some(task) => {
                    task.borrow_mut().finish_time = Some(time);
                    outstanding -= 1;
                    debug!("Task {} finished at {time}, {outstanding} left", task.name());
                    dispatcher.on_task_end()?
                }
                None => dispatcher.on_tick(time)?,
            };

            if next != current {
                match (&current, &next) {
                    (Some(from), Some(to)) => {
                        debug!("Context switch at {time} from {} to {}", from.name(), to.name());
                        context_switches += 1;
                    }
                    (_, None) => {
                        debug!("Going idle at {time}");
                        idle_transitions += 1;
                    }
                    (None, Some(to)) => {
                        debug!("Dispatching {} at {time}", to.name());
                        idle_transitions += 1;
                    }
                }
                record_stop(current.as_ref(), time);
                record_start(next.as_ref(), time);
                current = next;
            }
            time += 1;
        }

        let tasks: Vec<Task> = handles.iter().map(TaskHandle::snapshot).collect();
        let report = SimulationReport::calculate(policy, &tasks, context_switches, idle_transitions);
        info!(
            "Policy '{policy}': makespan {}, mean response {:.3}, {} context switch(es)",
            report.makespan, report.mean_response, report.context_switches
        );
        Ok(report)
    }
}

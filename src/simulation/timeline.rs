//! Gantt timeline of a finished simulation.
//!
//! Each task gets one state per tick from 0 through the makespan. Rows
//! render as WaveDrom wave strings: `z` absent, `x` waiting, `2` running,
//! `.` repeating the previous tick.

use serde::{Deserialize, Serialize};

use super::kpi::{SimulationReport, TaskReport};

/// What a task was doing during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickState {
    /// Not yet arrived, or already finished.
    Absent,
    /// Ready but not on the processor.
    Waiting,
    /// On the processor.
    Running,
}

impl TickState {
    /// WaveDrom symbol for the state.
    pub fn symbol(self) -> char {
        match self {
            TickState::Absent => 'z',
            TickState::Waiting => 'x',
            TickState::Running => '2',
        }
    }
}

/// Per-tick states of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTimeline {
    /// Task name.
    pub name: String,
    /// State at ticks `0..states.len()`.
    pub states: Vec<TickState>,
}

impl TaskTimeline {
    fn from_task(task: &TaskReport, ticks: u64) -> Self {
        let states = (0..ticks)
            .map(|t| {
                let finished = task.finish_time.is_some_and(|f| t >= f);
                if t < task.arrive_time || finished {
                    TickState::Absent
                } else if task.is_running_at(t) {
                    TickState::Running
                } else {
                    TickState::Waiting
                }
            })
            .collect();
        Self {
            name: task.name.clone(),
            states,
        }
    }

    /// WaveDrom wave string.
    pub fn wave(&self) -> String {
        let mut wave = String::with_capacity(self.states.len());
        let mut previous = None;
        for state in &self.states {
            let symbol = state.symbol();
            wave.push(if previous == Some(symbol) { '.' } else { symbol });
            previous = Some(symbol);
        }
        wave
    }
}

/// Timeline of every task in a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Number of ticks covered (makespan + 1).
    pub ticks: u64,
    /// One row per task, in task-set order.
    pub rows: Vec<TaskTimeline>,
}

impl Timeline {
    /// Builds the timeline of a finished simulation.
    pub fn from_report(report: &SimulationReport) -> Self {
        let ticks = report.makespan + 1;
        Self {
            ticks,
            rows: report
                .tasks
                .iter()
                .map(|task| TaskTimeline::from_task(task, ticks))
                .collect(),
        }
    }

    /// Row of the task called `name`.
    pub fn row(&self, name: &str) -> Option<&TaskTimeline> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Number of tasks on the processor at tick `t`.
    pub fn running_at(&self, t: u64) -> usize {
        let Ok(t) = usize::try_from(t) else {
            return 0;
        };
        self.rows
            .iter()
            .filter(|row| row.states.get(t) == Some(&TickState::Running))
            .count()
    }
}

//! Task model.
//!
//! A task is the schedulable unit: identity, arrival, priority and the
//! timing fields the harness mutates while the simulation runs.
//!
//! # Ownership
//! The harness creates each task and wraps it in a [`TaskHandle`]. Policies
//! and the dispatcher only move handles between queues; they never copy a
//! task. Handle equality is identity, not field equality.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, SchedError};

/// Longest accepted task name, in bytes.
pub const MAX_TASK_NAME_LEN: usize = 19;

/// A schedulable task.
///
/// # Time Representation
/// All times are logical ticks from the simulation start (t=0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Name, unique within a run.
    pub name: String,
    /// Tick at which the task becomes ready.
    pub arrive_time: u64,
    /// Priority level (lower = more urgent).
    pub priority: u8,
    /// Ticks of work left. Reaching 0 means completion.
    pub remaining_time: u64,
    /// Ticks actually executed.
    pub run_time: u64,
    /// Tick of completion. `None` until the task finishes.
    pub finish_time: Option<u64>,
    /// Ticks at which the task was swapped onto the processor.
    pub start_times: Vec<u64>,
    /// Ticks at which the task was swapped off the processor.
    pub stop_times: Vec<u64>,
}

impl Task {
    /// Creates a task with `run_time` ticks of work.
    ///
    /// Fails with `InvalidArgument` if the name is longer than
    /// [`MAX_TASK_NAME_LEN`].
    pub fn new(
        name: impl Into<String>,
        arrive_time: u64,
        run_time: u64,
        priority: u8,
    ) -> Result<Self> {
        let name = name.into();
        if name.len() > MAX_TASK_NAME_LEN {
            return Err(SchedError::invalid(format!(
                "task name '{name}' exceeds {MAX_TASK_NAME_LEN} bytes"
            )));
        }
        Ok(Self {
            name,
            arrive_time,
            priority,
            remaining_time: run_time,
            run_time: 0,
            finish_time: None,
            start_times: Vec::new(),
            stop_times: Vec::new(),
        })
    }

    /// Whether the task has no work left.
    pub fn is_complete(&self) -> bool {
        self.remaining_time == 0
    }

    /// Whether the task is currently on the processor (one unmatched start).
    pub fn is_on_processor(&self) -> bool {
        self.start_times.len() > self.stop_times.len()
    }

    /// Response time (`finish - arrive`), once finished.
    pub fn response_time(&self) -> Option<u64> {
        self.finish_time
            .map(|finish| finish.saturating_sub(self.arrive_time))
    }
}

/// Shared, identity-compared reference to a [`Task`].
#[derive(Clone)]
pub struct TaskHandle(Rc<RefCell<Task>>);

impl TaskHandle {
    /// Wraps a task.
    pub fn new(task: Task) -> Self {
        Self(Rc::new(RefCell::new(task)))
    }

    /// Immutable view of the task.
    pub fn borrow(&self) -> Ref<'_, Task> {
        self.0.borrow()
    }

    /// Mutable view of the task.
    pub fn borrow_mut(&self) -> RefMut<'_, Task> {
        self.0.borrow_mut()
    }

    /// Task name (cloned).
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Ticks of work left.
    pub fn remaining_time(&self) -> u64 {
        self.0.borrow().remaining_time
    }

    /// Priority level.
    pub fn priority(&self) -> u8 {
        self.0.borrow().priority
    }

    /// Snapshot of the task's current state.
    pub fn snapshot(&self) -> Task {
        self.0.borrow().clone()
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TaskHandle {}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let task = self.0.borrow();
        f.debug_struct("TaskHandle")
            .field("name", &task.name)
            .field("remaining_time", &task.remaining_time)
            .field("priority", &task.priority)
            .finish()
    }
}

/// Records that `task` was swapped onto the processor at `time`.
///
/// `None` stands for the idle pseudo-task and is ignored.
pub fn record_start(task: Option<&TaskHandle>, time: u64) {
    if let Some(task) = task {
        task.borrow_mut().start_times.push(time);
    }
}

/// Records that `task` was swapped off the processor at `time`.
///
/// `None` stands for the idle pseudo-task and is ignored.
pub fn record_stop(task: Option<&TaskHandle>, time: u64) {
    if let Some(task) = task {
        task.borrow_mut().stop_times.push(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new() {
        let task = Task::new("T1", 4, 10, 2).unwrap();
        assert_eq!(task.name, "T1");
        assert_eq!(task.arrive_time, 4);
        assert_eq!(task.remaining_time, 10);
        assert_eq!(task.run_time, 0);
        assert_eq!(task.priority, 2);
        assert_eq!(task.finish_time, None);
        assert!(task.start_times.is_empty());
        assert!(!task.is_complete());
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(MAX_TASK_NAME_LEN + 1);
        let err = Task::new(long, 0, 1, 0).unwrap_err();
        assert!(matches!(err, SchedError::InvalidArgument(_)));

        let exact = "y".repeat(MAX_TASK_NAME_LEN);
        assert!(Task::new(exact, 0, 1, 0).is_ok());
    }

    #[test]
    fn test_record_start_stop() {
        let handle = TaskHandle::new(Task::new("T1", 0, 3, 0).unwrap());
        record_start(Some(&handle), 2);
        assert!(handle.borrow().is_on_processor());
        record_stop(Some(&handle), 5);
        assert!(!handle.borrow().is_on_processor());
        assert_eq!(handle.borrow().start_times, vec![2]);
        assert_eq!(handle.borrow().stop_times, vec![5]);
    }

    #[test]
    fn test_record_idle_is_noop() {
        record_start(None, 1);
        record_stop(None, 1);
    }

    #[test]
    fn test_handle_identity() {
        let a = TaskHandle::new(Task::new("A", 0, 1, 0).unwrap());
        let b = TaskHandle::new(Task::new("A", 0, 1, 0).unwrap());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_response_time() {
        let mut task = Task::new("T", 3, 2, 0).unwrap();
        assert_eq!(task.response_time(), None);
        task.finish_time = Some(10);
        assert_eq!(task.response_time(), Some(7));
    }
}

//! Scheduling policies and the dispatcher that drives them.
//!
//! A policy is a [`PolicyDescriptor`] (name, behaviour flags, constructor)
//! plus instances implementing [`SchedulingPolicy`]. The [`Dispatcher`]
//! keeps the installed descriptors, owns the one active instance, and
//! translates simulation events into contract calls.
//!
//! # Usage
//!
//! ```
//! use task_sched::dispatching::{registry, Dispatcher};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.install_policy(registry::load("rr").unwrap()).unwrap();
//! dispatcher.set_active_policy("rr").unwrap();
//! assert_eq!(dispatcher.active_policy_name(), Some("rr"));
//! ```
//!
//! # Instance lifecycle
//!
//! `Unstarted → start → Running → stop → Stopped`. `add_task` and
//! `next_task` are valid only while running; a stopped instance is dropped
//! and a fresh one constructed for the next activation.

mod dispatcher;
pub mod policies;
pub mod registry;

pub use dispatcher::Dispatcher;

use std::fmt;

use crate::error::Result;
use crate::models::{TaskHandle, TaskList};

/// Drained ready queue handed from a stopped policy to the next one.
pub type ReadyList = TaskList<TaskHandle>;

/// A scheduling-policy instance.
///
/// Construction is the descriptor's `construct` function and destruction is
/// `Drop`.
pub trait SchedulingPolicy: fmt::Debug {
    /// Starts the instance, redistributing `seed` tasks (all ready) by the
    /// policy's own ordering rule.
    ///
    /// Fails with `Usage` if already started.
    fn start(&mut self, seed: Option<ReadyList>) -> Result<()>;

    /// Stops the instance and drains every queued task into one list.
    ///
    /// The task last returned as running, if it has work left, comes first;
    /// then buckets from index 0 upward. Returns `None` when nothing is
    /// queued or the instance is not running.
    fn stop(&mut self) -> Option<ReadyList>;

    /// Enqueues a newly ready task.
    fn add_task(&mut self, task: TaskHandle) -> Result<()>;

    /// Selects the task to run next. `None` means idle.
    ///
    /// `remove = false` re-evaluates while the running task may still have
    /// work (quantum expiry, preemption check). `remove = true` means the
    /// running task is finished or withdrawn and must not be requeued.
    fn next_task(&mut self, remove: bool) -> Result<Option<TaskHandle>>;
}

/// Constructor of a policy instance.
pub type PolicyConstructor = fn() -> Box<dyn SchedulingPolicy>;

/// Registered policy: name, behaviour flags and constructor.
#[derive(Clone, Copy)]
pub struct PolicyDescriptor {
    /// Policy name used for lookup.
    pub name: &'static str,
    /// Re-evaluate immediately whenever a task arrives.
    pub is_preemptive: bool,
    /// Ticks between forced re-evaluation. 0 disables tick-driven switching.
    pub quantum: u32,
    /// Restart the quantum window every time a new task is chosen.
    pub reset_quantum: bool,
    /// Creates an unstarted instance.
    pub construct: PolicyConstructor,
    /// Called once when the policy is uninstalled.
    pub on_uninstall: Option<fn()>,
}

impl PolicyDescriptor {
    /// Creates a non-preemptive descriptor without a quantum.
    pub fn new(name: &'static str, construct: PolicyConstructor) -> Self {
        Self {
            name,
            is_preemptive: false,
            quantum: 0,
            reset_quantum: false,
            construct,
            on_uninstall: None,
        }
    }

    /// Marks the policy as preemptive.
    pub fn preemptive(mut self) -> Self {
        self.is_preemptive = true;
        self
    }

    /// Sets the quantum and whether it resets on every selection.
    pub fn with_quantum(mut self, quantum: u32, reset_quantum: bool) -> Self {
        self.quantum = quantum;
        self.reset_quantum = reset_quantum;
        self
    }

    /// Sets the uninstall hook.
    pub fn with_uninstall_hook(mut self, hook: fn()) -> Self {
        self.on_uninstall = Some(hook);
        self
    }
}

impl fmt::Debug for PolicyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyDescriptor")
            .field("name", &self.name)
            .field("is_preemptive", &self.is_preemptive)
            .field("quantum", &self.quantum)
            .field("reset_quantum", &self.reset_quantum)
            .finish()
    }
}

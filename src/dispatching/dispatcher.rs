//! Policy registry and event dispatcher.
//!
//! The [`Dispatcher`] is the scheduler facade the simulation harness talks
//! to. It holds the installed descriptors, the one active policy instance,
//! the running task and the quantum counter, and turns tick, arrival and
//! completion events into policy-contract calls.
//!
//! # Quantum counter
//! With a non-zero quantum, each `on_tick` increments the counter and
//! re-evaluates when it reaches a positive multiple of the quantum. A
//! selection made on arrival sets the counter to -1 (for resetting policies)
//! so that the same tick's `on_tick` opens a fresh window; a selection on
//! completion sets it to 0.
//!
//! # Threading
//! Task handles are `Rc`-based, so a dispatcher is confined to the thread
//! that built it; registry changes and event callbacks can never interleave.

use log::{debug, error, info, warn};

use super::{PolicyDescriptor, ReadyList, SchedulingPolicy};
use crate::error::{Result, SchedError};
use crate::models::{End, TaskHandle};

struct ActivePolicy {
    descriptor: PolicyDescriptor,
    instance: Box<dyn SchedulingPolicy>,
}

/// Scheduler facade: registry of policies plus event callbacks.
///
/// # Example
/// ```
/// use task_sched::dispatching::{registry, Dispatcher};
/// use task_sched::models::{Task, TaskHandle};
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.install_policy(registry::load("fcfs").unwrap()).unwrap();
/// dispatcher.set_active_policy("fcfs").unwrap();
///
/// let task = TaskHandle::new(Task::new("T1", 0, 3, 0).unwrap());
/// let running = dispatcher.on_task_arrive(task.clone()).unwrap();
/// assert_eq!(running, Some(task));
/// ```
pub struct Dispatcher {
    policies: Vec<PolicyDescriptor>,
    active: Option<ActivePolicy>,
    running: Option<TaskHandle>,
    quantum_time: i64,
}

impl Dispatcher {
    /// Creates a dispatcher with no installed policies.
    pub fn new() -> Self {
        debug!("Initializing the scheduler system");
        Self {
            policies: Vec::new(),
            active: None,
            running: None,
            quantum_time: 0,
        }
    }

    /// Stops the active policy, discards its ready tasks and clears the
    /// registry. Returns the number of discarded tasks.
    pub fn teardown(mut self) -> usize {
        debug!("Destroying the scheduler system");
        let discarded = self.retire_active();
        for descriptor in self.policies.drain(..) {
            if let Some(hook) = descriptor.on_uninstall {
                hook();
            }
        }
        discarded
    }

    /// Registers a policy.
    ///
    /// Fails with `InvalidArgument` for an empty or already installed name.
    pub fn install_policy(&mut self, descriptor: PolicyDescriptor) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(SchedError::invalid("policy descriptor has no name"));
        }
        if self.find(descriptor.name).is_some() {
            return Err(SchedError::invalid(format!(
                "policy '{}' is already installed",
                descriptor.name
            )));
        }
        info!("Installing scheduling policy '{}'", descriptor.name);
        self.policies.push(descriptor);
        Ok(())
    }

    /// Removes a policy. If it is active, its instance is stopped and every
    /// ready task it held is discarded.
    ///
    /// Returns the number of discarded tasks. Fails with `NotFound` for an
    /// unknown name.
    pub fn uninstall_policy(&mut self, name: &str) -> Result<usize> {
        debug!("Uninstalling scheduling policy '{name}'");
        let index = self.find(name).ok_or_else(|| {
            warn!("Could not find scheduling policy '{name}'");
            SchedError::NotFound(name.to_string())
        })?;
        let discarded = if self.active_policy_name() == Some(name) {
            debug!("Uninstalling the active policy");
            self.retire_active()
        } else {
            0
        };
        let descriptor = self.policies.remove(index);
        if let Some(hook) = descriptor.on_uninstall {
            hook();
        }
        Ok(discarded)
    }

    /// Makes `name` the active policy.
    ///
    /// The current instance (if any) is stopped and dropped; its ready tasks
    /// seed a freshly constructed instance of the new policy. If the new
    /// instance fails to start, the previous policy is restarted with the
    /// same ready tasks and the start error is returned.
    pub fn set_active_policy(&mut self, name: &str) -> Result<()> {
        let descriptor = self
            .find(name)
            .map(|index| self.policies[index])
            .ok_or_else(|| {
                error!("Could not find scheduling policy '{name}'");
                SchedError::NotFound(name.to_string())
            })?;

        let previous = self.active.take();
        let previous_descriptor = previous.as_ref().map(|a| a.descriptor);
        let seed = previous.and_then(|mut active| {
            debug!("Stopping policy '{}'", active.descriptor.name);
            active.instance.stop()
        });
        self.running = None;
        self.quantum_time = 0;

        let ready: Vec<TaskHandle> = seed.iter().flatten().cloned().collect();
        info!("Activating policy '{name}' with {} ready task(s)", ready.len());
        let mut instance = (descriptor.construct)();
        match instance.start(seed) {
            Ok(()) => {
                self.active = Some(ActivePolicy {
                    descriptor,
                    instance,
                });
                Ok(())
            }
            Err(err) => {
                error!("Policy '{name}' failed to start: {err}");
                self.restore(previous_descriptor, &ready);
                Err(err)
            }
        }
    }

    /// Stops the active policy and discards its ready tasks, leaving no
    /// policy active. Returns the number of discarded tasks.
    pub fn deactivate(&mut self) -> usize {
        self.retire_active()
    }

    /// Name of the active policy.
    pub fn active_policy_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.descriptor.name)
    }

    /// Descriptor of the active policy.
    pub fn active_descriptor(&self) -> Option<&PolicyDescriptor> {
        self.active.as_ref().map(|a| &a.descriptor)
    }

    /// Snapshot of installed policy names, in install order.
    pub fn list_policy_names(&self) -> Vec<String> {
        self.policies.iter().map(|d| d.name.to_string()).collect()
    }

    /// Task the dispatcher currently considers running.
    pub fn running_task(&self) -> Option<&TaskHandle> {
        self.running.as_ref()
    }

    /// System tick callback.
    ///
    /// Quantum-driven policies re-evaluate here when the quantum expires;
    /// otherwise the running task is returned unchanged.
    pub fn on_tick(&mut self, time: u64) -> Result<Option<TaskHandle>> {
        let active = Self::active_mut(&mut self.active)?;
        let quantum = i64::from(active.descriptor.quantum);
        if quantum == 0 {
            return Ok(self.running.clone());
        }
        self.quantum_time += 1;
        if self.quantum_time > 0 && self.quantum_time % quantum == 0 {
            debug!("Quantum expired at {time}");
            self.running = active.instance.next_task(false)?;
        }
        Ok(self.running.clone())
    }

    /// Task completion callback: the running task is removed and a new one
    /// chosen.
    pub fn on_task_end(&mut self) -> Result<Option<TaskHandle>> {
        let active = Self::active_mut(&mut self.active)?;
        self.running = active.instance.next_task(true)?;
        if active.descriptor.reset_quantum {
            self.quantum_time = 0;
        }
        Ok(self.running.clone())
    }

    /// Task arrival callback.
    ///
    /// The task is queued; preemptive policies (and any policy while the
    /// processor is idle) re-evaluate immediately.
    pub fn on_task_arrive(&mut self, task: TaskHandle) -> Result<Option<TaskHandle>> {
        let active = Self::active_mut(&mut self.active)?;
        active.instance.add_task(task)?;
        if active.descriptor.is_preemptive || self.running.is_none() {
            self.running = active.instance.next_task(false)?;
            if active.descriptor.reset_quantum {
                self.quantum_time = -1;
            }
        }
        Ok(self.running.clone())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.policies.iter().position(|d| d.name == name)
    }

    fn active_mut(active: &mut Option<ActivePolicy>) -> Result<&mut ActivePolicy> {
        active
            .as_mut()
            .ok_or_else(|| SchedError::usage("no active scheduling policy"))
    }

    /// Restarts `descriptor` with `ready` after a failed activation.
    fn restore(&mut self, descriptor: Option<PolicyDescriptor>, ready: &[TaskHandle]) {
        let Some(descriptor) = descriptor else {
            for task in ready {
                warn!("Killing ready task {}", task.name());
            }
            return;
        };
        info!("Restoring policy '{}'", descriptor.name);

        let mut seed = ReadyList::new();
        for task in ready {
            if let Err(err) = seed.push(task.clone(), End::Tail) {
                warn!("Killing ready task {}: {err}", task.name());
            }
        }
        let mut instance = (descriptor.construct)();
        match instance.start((!seed.is_empty()).then_some(seed)) {
            Ok(()) => {
                self.active = Some(ActivePolicy {
                    descriptor,
                    instance,
                })
            }
            Err(err) => {
                error!("Policy '{}' failed to restart: {err}", descriptor.name);
                for task in ready {
                    warn!("Killing ready task {}", task.name());
                }
            }
        }
    }

    /// Stops and drops the active instance, discarding its ready tasks.
    fn retire_active(&mut self) -> usize {
        self.running = None;
        self.quantum_time = 0;
        let Some(mut active) = self.active.take() else {
            return 0;
        };
        let discarded = active.instance.stop().map_or(0, |tasks| {
            for task in &tasks {
                warn!("Killing ready task {}", task.name());
            }
            tasks.len()
        });
        debug!("Destructing policy '{}'", active.descriptor.name);
        discarded
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("policies", &self.list_policy_names())
            .field("active", &self.active_policy_name())
            .field("running", &self.running)
            .field("quantum_time", &self.quantum_time)
            .finish()
    }
}

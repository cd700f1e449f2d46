//! First-Come, First-Served.
//!
//! One FIFO queue. The running task keeps the processor until it finishes;
//! only `next_task(remove = true)` advances to the next arrival.

use log::debug;

use super::{drain_queues, PolicyState};
use crate::dispatching::{PolicyDescriptor, ReadyList, SchedulingPolicy};
use crate::error::Result;
use crate::models::{End, TaskHandle};

/// Policy name.
pub const NAME: &str = "fcfs";

/// Descriptor: not preemptive, no quantum.
pub fn descriptor() -> PolicyDescriptor {
    PolicyDescriptor::new(NAME, construct)
}

fn construct() -> Box<dyn SchedulingPolicy> {
    Box::new(Fcfs::new())
}

/// First-come, first-served policy instance.
#[derive(Debug, Default)]
pub struct Fcfs {
    state: PolicyState<ReadyList>,
    running: Option<TaskHandle>,
}

impl Fcfs {
    /// Creates an unstarted instance.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for Fcfs {
    fn start(&mut self, seed: Option<ReadyList>) -> Result<()> {
        let seeded = seed.as_ref().map_or(0, ReadyList::len);
        debug!("{NAME}: starting with {seeded} seeded task(s)");
        self.state.start_with(NAME, || Ok(seed.unwrap_or_default()))
    }

    fn stop(&mut self) -> Option<ReadyList> {
        let queue = self.state.finish()?;
        debug!("{NAME}: stopping with {} queued task(s)", queue.len());
        drain_queues(NAME, self.running.take(), [queue])
    }

    fn add_task(&mut self, task: TaskHandle) -> Result<()> {
        let queue = self.state.queues(NAME)?;
        debug!("{NAME}: enqueue {}", task.name());
        queue.push(task, End::Tail)
    }

    fn next_task(&mut self, remove: bool) -> Result<Option<TaskHandle>> {
        let queue = self.state.queues(NAME)?;
        if remove || self.running.is_none() {
            self.running = queue.pop(End::Head);
            match &self.running {
                Some(task) => debug!("{NAME}: run earliest arrival {}", task.name()),
                None => debug!("{NAME}: no ready task, idle"),
            }
        }
        Ok(self.running.clone())
    }
}

//! Odd/Even round robin.
//!
//! Two FIFO buckets. Every enqueue (arrival, seed redistribution and
//! quantum requeue alike) bumps an instance-wide counter and lands in bucket
//! `counter % 2`; the task's `priority` field is ignored. Selection drains
//! bucket 0 before bucket 1.

use log::debug;

use super::{drain_queues, pop_first, PolicyState};
use crate::dispatching::{PolicyDescriptor, ReadyList, SchedulingPolicy};
use crate::error::Result;
use crate::models::{End, TaskHandle};

/// Policy name.
pub const NAME: &str = "oddeven";

/// Ticks each task runs before re-evaluation.
pub const QUANTUM: u32 = 100;

const BUCKETS: usize = 2;

/// Descriptor: not preemptive, quantum 100, reset on every selection.
pub fn descriptor() -> PolicyDescriptor {
    PolicyDescriptor::new(NAME, construct).with_quantum(QUANTUM, true)
}

fn construct() -> Box<dyn SchedulingPolicy> {
    Box::new(OddEven::new())
}

/// Odd/even policy instance.
#[derive(Debug, Default)]
pub struct OddEven {
    state: PolicyState<Vec<ReadyList>>,
    running: Option<TaskHandle>,
    enqueued: u64,
}

impl OddEven {
    /// Creates an unstarted instance.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Routes `task` by the parity of `counter`, then bumps it.
fn enqueue(buckets: &mut [ReadyList], counter: &mut u64, task: TaskHandle) -> Result<()> {
    let bucket = (*counter % BUCKETS as u64) as usize;
    debug!("{NAME}: enqueue {} into bucket {bucket} (add #{counter})", task.name());
    buckets[bucket].push(task, End::Tail)?;
    *counter += 1;
    Ok(())
}

impl SchedulingPolicy for OddEven {
    fn start(&mut self, seed: Option<ReadyList>) -> Result<()> {
        debug!("{NAME}: starting");
        let counter = &mut self.enqueued;
        self.state.start_with(NAME, || {
            let mut buckets: Vec<ReadyList> = (0..BUCKETS).map(|_| ReadyList::new()).collect();
            for task in seed.into_iter().flatten() {
                enqueue(&mut buckets, counter, task)?;
            }
            Ok(buckets)
        })
    }

    fn stop(&mut self) -> Option<ReadyList> {
        let buckets = self.state.finish()?;
        debug!("{NAME}: stopping after {} enqueue(s)", self.enqueued);
        drain_queues(NAME, self.running.take(), buckets)
    }

    fn add_task(&mut self, task: TaskHandle) -> Result<()> {
        let buckets = self.state.queues(NAME)?;
        enqueue(buckets, &mut self.enqueued, task)
    }

    fn next_task(&mut self, remove: bool) -> Result<Option<TaskHandle>> {
        let buckets = self.state.queues(NAME)?;
        if let Some(previous) = self.running.take() {
            if !remove && previous.remaining_time() > 0 {
                enqueue(buckets, &mut self.enqueued, previous)?;
            }
        }
        self.running = pop_first(buckets);
        match &self.running {
            Some(task) => debug!("{NAME}: run {}", task.name()),
            None => debug!("{NAME}: no ready task, idle"),
        }
        Ok(self.running.clone())
    }
}

//! Priority Round Robin.
//!
//! One FIFO bucket per priority level. Selection always takes the head of
//! the most urgent non-empty bucket (index 0 first); within a bucket tasks
//! rotate exactly like plain round robin.

use log::debug;

use super::{drain_queues, pop_first, PolicyState};
use crate::dispatching::{PolicyDescriptor, ReadyList, SchedulingPolicy};
use crate::error::{Result, SchedError};
use crate::models::{End, TaskHandle};

/// Policy name.
pub const NAME: &str = "prr";

/// Number of priority buckets (priorities `0..PRIORITY_LEVELS`).
pub const PRIORITY_LEVELS: usize = 4;

/// Ticks each task runs before re-evaluation.
pub const QUANTUM: u32 = 5;

/// Descriptor: not preemptive, quantum 5, reset on every selection.
pub fn descriptor() -> PolicyDescriptor {
    PolicyDescriptor::new(NAME, construct).with_quantum(QUANTUM, true)
}

fn construct() -> Box<dyn SchedulingPolicy> {
    Box::new(PriorityRoundRobin::new())
}

/// Priority round-robin policy instance.
#[derive(Debug, Default)]
pub struct PriorityRoundRobin {
    state: PolicyState<Vec<ReadyList>>,
    running: Option<TaskHandle>,
}

impl PriorityRoundRobin {
    /// Creates an unstarted instance.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Pushes `task` at the tail of its priority bucket.
fn enqueue(buckets: &mut [ReadyList], task: TaskHandle) -> Result<()> {
    let priority = usize::from(task.priority());
    let bucket = buckets
        .get_mut(priority)
        .ok_or_else(|| out_of_range(&task))?;
    bucket.push(task, End::Tail)
}

fn out_of_range(task: &TaskHandle) -> SchedError {
    SchedError::invalid(format!(
        "task {} has priority {}; {NAME} supports 0..{PRIORITY_LEVELS}",
        task.name(),
        task.priority()
    ))
}

impl SchedulingPolicy for PriorityRoundRobin {
    fn start(&mut self, seed: Option<ReadyList>) -> Result<()> {
        debug!("{NAME}: starting with {PRIORITY_LEVELS} buckets");
        self.state.start_with(NAME, || {
            // Reject the whole seed before any task is moved into a bucket
            if let Some(task) = seed
                .iter()
                .flatten()
                .find(|task| usize::from(task.priority()) >= PRIORITY_LEVELS)
            {
                return Err(out_of_range(task));
            }
            let mut buckets: Vec<ReadyList> =
                (0..PRIORITY_LEVELS).map(|_| ReadyList::new()).collect();
            for task in seed.into_iter().flatten() {
                enqueue(&mut buckets, task)?;
            }
            Ok(buckets)
        })
    }

    fn stop(&mut self) -> Option<ReadyList> {
        let buckets = self.state.finish()?;
        debug!("{NAME}: stopping");
        drain_queues(NAME, self.running.take(), buckets)
    }

    fn add_task(&mut self, task: TaskHandle) -> Result<()> {
        let buckets = self.state.queues(NAME)?;
        debug!("{NAME}: enqueue {} at priority {}", task.name(), task.priority());
        enqueue(buckets, task)
    }

    fn next_task(&mut self, remove: bool) -> Result<Option<TaskHandle>> {
        let buckets = self.state.queues(NAME)?;
        if let Some(previous) = self.running.take() {
            if !remove && previous.remaining_time() > 0 {
                debug!("{NAME}: requeue {} at tail of its bucket", previous.name());
                enqueue(buckets, previous)?;
            }
        }
        self.running = pop_first(buckets);
        match &self.running {
            Some(task) => debug!("{NAME}: run {} (priority {})", task.name(), task.priority()),
            None => debug!("{NAME}: no ready task, idle"),
        }
        Ok(self.running.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::policies::test_support::*;

    fn started() -> PriorityRoundRobin {
        let mut prr = PriorityRoundRobin::new();
        prr.start(None).unwrap();
        prr
    }

    #[test]
    fn test_descriptor_flags() {
        let d = descriptor();
        assert_eq!(d.name, "prr");
        assert_eq!(d.quantum, 5);
        assert!(d.reset_quantum);
        assert!(!d.is_preemptive);
    }

    #[test]
    fn test_highest_priority_first() {
        let mut prr = started();
        prr.add_task(task("low", 3, 3)).unwrap();
        prr.add_task(task("mid", 3, 1)).unwrap();
        prr.add_task(task("high", 3, 0)).unwrap();

        assert_eq!(next_name(&mut prr, true).as_deref(), Some("high"));
        assert_eq!(next_name(&mut prr, true).as_deref(), Some("mid"));
        assert_eq!(next_name(&mut prr, true).as_deref(), Some("low"));
        assert_eq!(next_name(&mut prr, true), None);
    }

    #[test]
    fn test_requeue_into_own_bucket() {
        let mut prr = started();
        let a = task("A", 10, 1);
        prr.add_task(a.clone()).unwrap();
        prr.add_task(task("B", 10, 1)).unwrap();
        prr.add_task(task("Z", 10, 2)).unwrap();

        assert_eq!(next_name(&mut prr, false).as_deref(), Some("A"));
        run_for(&a, 5);
        // A goes behind B in bucket 1; Z in bucket 2 still waits
        assert_eq!(next_name(&mut prr, false).as_deref(), Some("B"));
        let drained = prr.stop().unwrap();
        assert_eq!(names(&drained), vec!["B", "A", "Z"]);
    }

    #[test]
    fn test_priority_out_of_range() {
        let mut prr = started();
        let err = prr.add_task(task("bad", 1, 4)).unwrap_err();
        assert!(matches!(err, SchedError::InvalidArgument(_)));
    }

    #[test]
    fn test_start_buckets_seed_by_priority() {
        let a = task("A", 2, 2);
        let b = task("B", 2, 0);
        let c = task("C", 2, 2);
        let mut prr = PriorityRoundRobin::new();
        prr.start(Some(ready_list(&[&a, &b, &c]))).unwrap();
        let drained = prr.stop().unwrap();
        assert_eq!(names(&drained), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_start_rejects_bad_seed() {
        let bad = task("bad", 1, 9);
        let mut prr = PriorityRoundRobin::new();
        assert!(prr.start(Some(ready_list(&[&bad]))).is_err());
        // Still unstarted
        assert!(prr.add_task(task("A", 1, 0)).is_err());
    }

    #[test]
    fn test_bad_seed_rejected_before_bucketing() {
        let good = task("good", 1, 0);
        let bad = task("bad", 1, 9);
        let seed = ready_list(&[&good, &bad]);
        let err = PriorityRoundRobin::new().start(Some(seed)).unwrap_err();
        assert!(matches!(err, SchedError::InvalidArgument(ref m) if m.contains("bad")));
    }
}

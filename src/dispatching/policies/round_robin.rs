//! Round Robin.
//!
//! One FIFO queue and a fixed quantum. Each re-evaluation sends the running
//! task, if it still has work, to the back of the line before the head is
//! taken, so every ready task gets a turn.

use log::debug;

use super::{drain_queues, PolicyState};
use crate::dispatching::{PolicyDescriptor, ReadyList, SchedulingPolicy};
use crate::error::Result;
use crate::models::{End, TaskHandle};

/// Policy name.
pub const NAME: &str = "rr";

/// Ticks each task runs before the processor is handed on.
pub const QUANTUM: u32 = 5;

/// Descriptor: not preemptive, quantum 5, reset on every selection.
pub fn descriptor() -> PolicyDescriptor {
    PolicyDescriptor::new(NAME, construct).with_quantum(QUANTUM, true)
}

fn construct() -> Box<dyn SchedulingPolicy> {
    Box::new(RoundRobin::new())
}

/// Round-robin policy instance.
#[derive(Debug, Default)]
pub struct RoundRobin {
    state: PolicyState<ReadyList>,
    running: Option<TaskHandle>,
}

impl RoundRobin {
    /// Creates an unstarted instance.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for RoundRobin {
    fn start(&mut self, seed: Option<ReadyList>) -> Result<()> {
        debug!("{NAME}: starting");
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
        if let Some(previous) = self.running.take() {
            if !remove && previous.remaining_time() > 0 {
                debug!("{NAME}: requeue {} at tail", previous.name());
                queue.push(previous, End::Tail)?;
            }
        }
        self.running = queue.pop(End::Head);
        match &self.running {
            Some(task) => debug!("{NAME}: run {}", task.name()),
            None => debug!("{NAME}: no ready task, idle"),
        }
        Ok(self.running.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::policies::test_support::*;
    use crate::error::SchedError;

    fn started() -> RoundRobin {
        let mut rr = RoundRobin::new();
        rr.start(None).unwrap();
        rr
    }

    #[test]
    fn test_descriptor_flags() {
        let d = descriptor();
        assert_eq!(d.name, "rr");
        assert!(!d.is_preemptive);
        assert_eq!(d.quantum, 5);
        assert!(d.reset_quantum);
    }

    #[test]
    fn test_not_started() {
        let mut rr = RoundRobin::new();
        assert!(matches!(rr.add_task(task("A", 1, 0)), Err(SchedError::Usage(_))));
        assert!(matches!(rr.next_task(false), Err(SchedError::Usage(_))));
    }

    #[test]
    fn test_requeues_at_tail() {
        let mut rr = started();
        let a = task("A", 12, 0);
        let b = task("B", 3, 0);
        let c = task("C", 3, 0);
        rr.add_task(a.clone()).unwrap();
        rr.add_task(b).unwrap();
        rr.add_task(c).unwrap();

        assert_eq!(next_name(&mut rr, false).as_deref(), Some("A"));
        run_for(&a, 5);
        assert_eq!(next_name(&mut rr, false).as_deref(), Some("B"));
        let drained = rr.stop().unwrap();
        // B is running, A went behind C
        assert_eq!(names(&drained), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_single_task_keeps_running() {
        let mut rr = started();
        let a = task("A", 12, 0);
        rr.add_task(a.clone()).unwrap();
        assert_eq!(next_name(&mut rr, false).as_deref(), Some("A"));
        run_for(&a, 5);
        assert_eq!(next_name(&mut rr, false).as_deref(), Some("A"));
    }

    #[test]
    fn test_finished_task_not_requeued() {
        let mut rr = started();
        let a = task("A", 2, 0);
        rr.add_task(a.clone()).unwrap();
        rr.add_task(task("B", 2, 0)).unwrap();
        assert_eq!(next_name(&mut rr, false).as_deref(), Some("A"));
        run_for(&a, 2);
        assert_eq!(next_name(&mut rr, true).as_deref(), Some("B"));
        assert_eq!(next_name(&mut rr, true), None);
    }

    #[test]
    fn test_remove_withdraws_running_task() {
        let mut rr = started();
        rr.add_task(task("A", 4, 0)).unwrap();
        assert_eq!(next_name(&mut rr, false).as_deref(), Some("A"));
        assert_eq!(next_name(&mut rr, true), None);
        assert!(rr.stop().is_none());
    }

    #[test]
    fn test_fairness_over_rounds() {
        let mut rr = started();
        let tasks: Vec<_> = ["A", "B", "C"].iter().map(|n| task(n, 20, 0)).collect();
        for t in &tasks {
            rr.add_task(t.clone()).unwrap();
        }
        let mut order = Vec::new();
        for _ in 0..6 {
            let current = rr.next_task(false).unwrap().unwrap();
            run_for(&current, 1);
            order.push(current.name());
        }
        assert_eq!(order, vec!["A", "B", "C", "A", "B", "C"]);
    }
}

//! Shortest Remaining Time Next.
//!
//! One ready list kept sorted ascending by `remaining_time`. The policy is
//! preemptive: on every arrival the dispatcher re-evaluates, and a ready
//! task with strictly less remaining time than the running one takes over.
//!
//! # Ties
//! A new task is inserted before the first entry with strictly more
//! remaining time, so equal entries keep insertion order. A ready task
//! whose remaining time equals the running task's never preempts it.
//!
//! This differs from a first-match insert, which places a task before the
//! first entry with remaining time greater than or equal to its own and
//! so puts it ahead of its ties. The difference shows up for preempted
//! tasks too: one put back in the queue lands behind ready tasks with the
//! same remaining time.

use log::debug;

use super::{drain_queues, PolicyState};
use crate::dispatching::{PolicyDescriptor, ReadyList, SchedulingPolicy};
use crate::error::Result;
use crate::models::{End, TaskHandle};

/// Policy name.
pub const NAME: &str = "srtn";

/// Descriptor: preemptive, no quantum.
pub fn descriptor() -> PolicyDescriptor {
    PolicyDescriptor::new(NAME, construct).preemptive()
}

fn construct() -> Box<dyn SchedulingPolicy> {
    Box::new(Srtn::new())
}

/// Shortest-remaining-time-next policy instance.
#[derive(Debug, Default)]
pub struct Srtn {
    state: PolicyState<ReadyList>,
    running: Option<TaskHandle>,
}

impl Srtn {
    /// Creates an unstarted instance.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inserts `task` before the first entry with strictly more remaining time.
fn sorted_insert(queue: &mut ReadyList, task: TaskHandle) -> Result<()> {
    let remaining = task.remaining_time();
    {
        let mut cursor = queue.iter_start(End::Head);
        loop {
            let longer = match cursor.current() {
                Some(entry) => entry.remaining_time() > remaining,
                None => break,
            };
            if longer {
                return cursor.insert_before(task);
            }
            cursor.next()?;
        }
    }
    queue.push(task, End::Tail)
}

impl SchedulingPolicy for Srtn {
    fn start(&mut self, seed: Option<ReadyList>) -> Result<()> {
        debug!("{NAME}: starting, sorting seed by remaining time");
        self.state.start_with(NAME, || {
            let mut queue = ReadyList::new();
            for task in seed.into_iter().flatten() {
                sorted_insert(&mut queue, task)?;
            }
            Ok(queue)
        })
    }

    fn stop(&mut self) -> Option<ReadyList> {
        let queue = self.state.finish()?;
        debug!("{NAME}: stopping with {} queued task(s)", queue.len());
        drain_queues(NAME, self.running.take(), [queue])
    }

    fn add_task(&mut self, task: TaskHandle) -> Result<()> {
        let queue = self.state.queues(NAME)?;
        debug!("{NAME}: enqueue {} (remaining {})", task.name(), task.remaining_time());
        sorted_insert(queue, task)
    }

    fn next_task(&mut self, remove: bool) -> Result<Option<TaskHandle>> {
        let queue = self.state.queues(NAME)?;
        match self.running.take() {
            Some(running) if !remove => {
                let shorter = queue
                    .front()
                    .is_some_and(|head| head.remaining_time() < running.remaining_time());
                if shorter {
                    let head = queue.pop(End::Head);
                    debug!("{NAME}: preempt {}", running.name());
                    sorted_insert(queue, running)?;
                    self.running = head;
                } else {
                    self.running = Some(running);
                }
            }
            _ => {
                self.running = queue.pop(End::Head);
                match &self.running {
                    Some(task) => debug!("{NAME}: run shortest {}", task.name()),
                    None => debug!("{NAME}: no ready task, idle"),
                }
            }
        }
        Ok(self.running.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::policies::test_support::*;

    fn started() -> Srtn {
        let mut srtn = Srtn::new();
        srtn.start(None).unwrap();
        srtn
    }

    #[test]
    fn test_descriptor_flags() {
        let d = descriptor();
        assert_eq!(d.name, "srtn");
        assert!(d.is_preemptive);
        assert_eq!(d.quantum, 0);
    }

    #[test]
    fn test_sorted_insert_keeps_ties_in_order() {
        let mut srtn = started();
        srtn.add_task(task("five", 5, 0)).unwrap();
        srtn.add_task(task("one", 1, 0)).unwrap();
        srtn.add_task(task("three_a", 3, 0)).unwrap();
        srtn.add_task(task("three_b", 3, 0)).unwrap();
        srtn.add_task(task("nine", 9, 0)).unwrap();

        let drained = srtn.stop().unwrap();
        assert_eq!(
            names(&drained),
            vec!["one", "three_a", "three_b", "five", "nine"]
        );
    }

    #[test]
    fn test_preempts_on_strictly_shorter() {
        let mut srtn = started();
        let a = task("A", 5, 0);
        srtn.add_task(a.clone()).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
        run_for(&a, 1);

        srtn.add_task(task("C", 1, 0)).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("C"));
        let drained = srtn.stop().unwrap();
        assert_eq!(names(&drained), vec!["C", "A"]);
    }

    #[test]
    fn test_preempted_task_requeued_behind_equal() {
        let mut srtn = started();
        srtn.add_task(task("A", 5, 0)).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
        srtn.add_task(task("C", 5, 0)).unwrap();
        srtn.add_task(task("B", 1, 0)).unwrap();

        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("B"));
        assert_eq!(names(&srtn.stop().unwrap()), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_no_preemption_on_tie() {
        let mut srtn = started();
        let a = task("A", 5, 0);
        srtn.add_task(a.clone()).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
        run_for(&a, 2);

        srtn.add_task(task("tie", 3, 0)).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
        srtn.add_task(task("longer", 4, 0)).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
    }

    #[test]
    fn test_empty_queue_keeps_running_task() {
        let mut srtn = started();
        srtn.add_task(task("A", 5, 0)).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
    }

    #[test]
    fn test_remove_pops_minimum() {
        let mut srtn = started();
        let a = task("A", 1, 0);
        srtn.add_task(a.clone()).unwrap();
        srtn.add_task(task("B", 7, 0)).unwrap();
        srtn.add_task(task("C", 4, 0)).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("A"));
        run_for(&a, 1);
        assert_eq!(next_name(&mut srtn, true).as_deref(), Some("C"));
        assert_eq!(next_name(&mut srtn, true).as_deref(), Some("B"));
        assert_eq!(next_name(&mut srtn, true), None);
    }

    #[test]
    fn test_never_keeps_longest_when_shorter_ready() {
        let mut srtn = started();
        let long = task("long", 10, 0);
        srtn.add_task(long.clone()).unwrap();
        assert_eq!(next_name(&mut srtn, false).as_deref(), Some("long"));
        for (name, remaining) in [("m", 6), ("s", 2), ("xs", 1)] {
            srtn.add_task(task(name, remaining, 0)).unwrap();
            let current = srtn.next_task(false).unwrap().unwrap();
            assert_eq!(current.name(), name);
        }
    }

    #[test]
    fn test_seed_sorted_on_start() {
        let a = task("A", 8, 0);
        let b = task("B", 2, 0);
        let c = task("C", 2, 0);
        let mut srtn = Srtn::new();
        srtn.start(Some(ready_list(&[&a, &b, &c]))).unwrap();
        assert_eq!(names(&srtn.stop().unwrap()), vec!["B", "C", "A"]);
    }
}

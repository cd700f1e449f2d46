//! Built-in scheduling policies.
//!
//! | Policy | Name | Queues | Preemptive | Quantum |
//! |--------|------|--------|------------|---------|
//! | [`Fcfs`] | `fcfs` | 1 FIFO | no | 0 |
//! | [`RoundRobin`] | `rr` | 1 FIFO | no | 5 (reset) |
//! | [`PriorityRoundRobin`] | `prr` | 4 FIFO by priority | no | 5 (reset) |
//! | [`OddEven`] | `oddeven` | 2 FIFO by add parity | no | 100 (reset) |
//! | [`Srtn`] | `srtn` | 1 sorted by remaining time | yes | 0 |

pub mod fcfs;
pub mod odd_even;
pub mod priority_rr;
pub mod round_robin;
pub mod srtn;

pub use fcfs::Fcfs;
pub use odd_even::OddEven;
pub use priority_rr::PriorityRoundRobin;
pub use round_robin::RoundRobin;
pub use srtn::Srtn;

use log::error;

use super::ReadyList;
use crate::error::{Result, SchedError};
use crate::models::{End, TaskHandle};

/// Lifecycle of a policy instance holding queue state `Q`.
#[derive(Debug, Default)]
pub(crate) enum PolicyState<Q> {
    #[default]
    Unstarted,
    Running(Q),
    Stopped,
}

impl<Q> PolicyState<Q> {
    /// Builds the queues and enters `Running`. Fails with `Usage` unless
    /// unstarted; `build` is not called in that case.
    pub(crate) fn start_with(
        &mut self,
        policy: &str,
        build: impl FnOnce() -> Result<Q>,
    ) -> Result<()> {
        match self {
            PolicyState::Unstarted => {
                *self = PolicyState::Running(build()?);
                Ok(())
            }
            PolicyState::Running(_) => Err(SchedError::usage(format!(
                "policy '{policy}' already started"
            ))),
            PolicyState::Stopped => Err(SchedError::usage(format!(
                "policy '{policy}' was stopped; construct a new instance"
            ))),
        }
    }

    /// Queues of a running instance. Fails with `Usage` otherwise.
    pub(crate) fn queues(&mut self, policy: &str) -> Result<&mut Q> {
        match self {
            PolicyState::Running(queues) => Ok(queues),
            _ => Err(SchedError::usage(format!(
                "policy '{policy}' has not been started"
            ))),
        }
    }

    /// Leaves `Running`, handing back the queues. `None` if not running.
    pub(crate) fn finish(&mut self) -> Option<Q> {
        match std::mem::replace(self, PolicyState::Stopped) {
            PolicyState::Running(queues) => Some(queues),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Flattens a stopped policy's queues into one ready list.
///
/// `running` goes first if it still has work; `queues` follow in order.
pub(crate) fn drain_queues(
    policy: &str,
    running: Option<TaskHandle>,
    queues: impl IntoIterator<Item = ReadyList>,
) -> Option<ReadyList> {
    let mut drained = ReadyList::new();
    let running = running.filter(|task| task.remaining_time() > 0);
    let tasks = running
        .into_iter()
        .chain(queues.into_iter().flat_map(|queue| queue.into_iter()));
    for task in tasks {
        let name = task.name();
        if let Err(err) = drained.push(task, End::Tail) {
            error!("{policy}: dropping task {name} while draining: {err}");
        }
    }
    (!drained.is_empty()).then_some(drained)
}

/// Pops the head of the first non-empty queue.
pub(crate) fn pop_first(queues: &mut [ReadyList]) -> Option<TaskHandle> {
    queues.iter_mut().find_map(|queue| queue.pop(End::Head))
}

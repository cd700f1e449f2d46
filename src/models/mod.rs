//! Scheduling domain models.
//!
//! | Type | Role |
//! |------|------|
//! | [`Task`] | Schedulable unit with timing and priority |
//! | [`TaskHandle`] | Shared identity reference moved between queues |
//! | [`TaskList`] | Ordered double-ended ready queue with a cursor |

mod task;
mod task_list;

pub use task::{record_start, record_stop, Task, TaskHandle, MAX_TASK_NAME_LEN};
pub use task_list::{CursorMut, End, IntoIter, Iter, TaskList};

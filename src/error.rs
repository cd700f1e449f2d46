//! Error kinds shared by the collection, policies, dispatcher and harness.

use thiserror::Error;

/// Errors returned by scheduler operations.
#[derive(Debug, Error)]
pub enum SchedError {
    /// Malformed input to a constructor or registration call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Allocation failure while growing a queue.
    #[error("Out of memory")]
    OutOfMemory,

    /// A stateful operation was called outside its required state.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Unknown policy name.
    #[error("Policy not found: {0}")]
    NotFound(String),

    /// The simulation did not drain its tasks within the tick limit.
    #[error("Simulation exceeded {limit} ticks with {outstanding} task(s) outstanding")]
    TickLimit {
        /// Configured tick limit.
        limit: u64,
        /// Tasks that never completed.
        outstanding: usize,
    },

    /// Report output failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report encoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedError>;

impl SchedError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

use crate::core::state::Ticks;
use crate::sim::process::ProcessId;
use thiserror::Error;

/// Validation and engine failures. A run either completes for every process
/// or is never started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("unsupported scheduling policy '{0}' (valid: fcfs, sjf, srtf, rr)")]
    UnsupportedPolicy(String),

    #[error("invalid time quantum {0}: must be greater than zero")]
    InvalidQuantum(i64),

    #[error("unsupported requeue order '{0}' (valid: arrivals_first, preempted_first)")]
    UnsupportedRequeueOrder(String),

    #[error("round robin requires a time quantum")]
    MissingQuantum,

    #[error("no processes to schedule")]
    NoProcesses,

    #[error("process {id} has a burst time of zero")]
    ZeroBurst { id: ProcessId },

    #[error("process id {id} is used more than once")]
    DuplicateId { id: ProcessId },

    #[error("process {id} never completed")]
    Incomplete { id: ProcessId },

    #[error("process {id} has inconsistent timings: {reason}")]
    InconsistentTimes { id: ProcessId, reason: &'static str },

    #[error("scheduler idled at t={at} with nothing left to arrive")]
    Stalled { at: Ticks },
}

pub type SimResult<T> = Result<T, SimError>;

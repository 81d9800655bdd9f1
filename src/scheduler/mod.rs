pub mod fcfs;
pub mod round_robin;
pub mod sjf;
pub mod srtf;

use crate::core::{
    Ticks,
    state::{SchedCtx, TaskId},
};
pub use fcfs::FcfsScheduler;
pub use round_robin::{RequeueOrder, RoundRobinScheduler};
pub use sjf::SjfScheduler;
pub use srtf::SrtfScheduler;

pub type EnqueueFlags = u64;

// Task just arrived
pub const ENQ_WAKEUP: EnqueueFlags = 1 << 0;
// Task's slice ended with work left
pub const ENQ_PREEMPT: EnqueueFlags = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchDecision {
    /// Give `task` the CPU for `slice` ticks. The slice must be non-zero and
    /// no longer than the task's remaining service.
    Run { task: TaskId, slice: Ticks },
    /// Leave the CPU idle for one tick.
    Idle,
    /// Leave the CPU idle until the next pending arrival.
    IdleUntilArrival,
}

/// A single-CPU scheduling policy driven by `SchedCore`.
///
/// The core admits arrivals and returns preempted tasks through `enqueue`,
/// and asks `dispatch` what to run whenever the CPU is free. Policies keep
/// their ready queues as DSQs in the `SchedCtx`.
pub trait Scheduler {
    fn init(&mut self, ctx: &mut SchedCtx);

    /// Display name, used as the report title.
    fn name(&self) -> String;

    fn enqueue(&mut self, ctx: &mut SchedCtx, task: TaskId, flags: EnqueueFlags);

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> DispatchDecision;
}

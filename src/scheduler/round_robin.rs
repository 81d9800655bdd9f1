use super::{DispatchDecision, ENQ_PREEMPT, ENQ_WAKEUP, EnqueueFlags, SchedCtx, Scheduler, TaskId};
use crate::config::Quantum;
use crate::core::DsqId;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a preempted task rejoins the ready queue relative to tasks that
/// arrived while it was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequeueOrder {
    /// New arrivals first, preempted task at the tail.
    #[default]
    ArrivalsFirst,
    /// Preempted task ahead of anything that arrived during its slice. A task
    /// may then run several quanta back to back while those arrivals wait,
    /// but never overtakes tasks that were queued before its slice began.
    PreemptedFirst,
}

impl FromStr for RequeueOrder {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "arrivals_first" | "arrivals" => Ok(Self::ArrivalsFirst),
            "preempted_first" | "preempted" => Ok(Self::PreemptedFirst),
            other => Err(SimError::UnsupportedRequeueOrder(other.to_string())),
        }
    }
}

/// Round-robin over a single FIFO DSQ with a fixed quantum.
#[derive(Debug)]
pub struct RoundRobinScheduler {
    quantum: Quantum,
    order: RequeueOrder,
    ready: DsqId,
    // Tasks admitted since the last dispatch
    fresh: usize,
}

impl RoundRobinScheduler {
    pub fn new(quantum: Quantum, order: RequeueOrder) -> Self {
        Self {
            quantum,
            order,
            ready: DsqId::default(),
            fresh: 0,
        }
    }
}

impl Scheduler for RoundRobinScheduler {
    fn init(&mut self, ctx: &mut SchedCtx) {
        self.ready = ctx.create_dsq_fifo();
        self.fresh = 0;
    }

    fn name(&self) -> String {
        format!("Round Robin (quantum={})", self.quantum)
    }

    fn enqueue(&mut self, ctx: &mut SchedCtx, task: TaskId, flags: EnqueueFlags) {
        if flags & ENQ_PREEMPT != 0 && self.order == RequeueOrder::PreemptedFirst {
            let index = ctx.dsq_len(self.ready).saturating_sub(self.fresh);
            ctx.dsq_insert_fifo(self.ready, index, task);
            return;
        }

        ctx.dsq_push_fifo(self.ready, task);
        if flags & ENQ_WAKEUP != 0 {
            self.fresh += 1;
        }
    }

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> DispatchDecision {
        match ctx.dsq_pop(self.ready) {
            Some(task) => {
                self.fresh = 0;
                let slice = self.quantum.get().min(ctx.task(task).remaining_service);
                DispatchDecision::Run { task, slice }
            }
            None => DispatchDecision::Idle,
        }
    }
}

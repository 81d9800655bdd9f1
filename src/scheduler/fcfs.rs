use super::{DispatchDecision, EnqueueFlags, SchedCtx, Scheduler, TaskId};
use crate::core::DsqId;

/// First-come-first-served. Tasks run to completion in arrival order; ties
/// keep input order.
#[derive(Debug, Default)]
pub struct FcfsScheduler {
    ready: DsqId,
}

impl FcfsScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for FcfsScheduler {
    fn init(&mut self, ctx: &mut SchedCtx) {
        self.ready = ctx.create_dsq_priq();
    }

    fn name(&self) -> String {
        "FCFS".to_string()
    }

    fn enqueue(&mut self, ctx: &mut SchedCtx, task: TaskId, _flags: EnqueueFlags) {
        let arrival = ctx.task(task).arrival_time;
        ctx.dsq_push_priq(self.ready, task, arrival);
    }

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> DispatchDecision {
        match ctx.dsq_pop(self.ready) {
            Some(task) => DispatchDecision::Run {
                task,
                slice: ctx.task(task).remaining_service,
            },
            None => DispatchDecision::IdleUntilArrival,
        }
    }
}

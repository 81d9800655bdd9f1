use super::{DispatchDecision, EnqueueFlags, SchedCtx, Scheduler, TaskId};
use crate::core::DsqId;

/// Non-preemptive shortest-job-first. The choice is only revisited when the
/// running job completes; ties go to the lowest input index.
#[derive(Debug, Default)]
pub struct SjfScheduler {
    ready: DsqId,
}

impl SjfScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SjfScheduler {
    fn init(&mut self, ctx: &mut SchedCtx) {
        self.ready = ctx.create_dsq_priq();
    }

    fn name(&self) -> String {
        "SJF".to_string()
    }

    fn enqueue(&mut self, ctx: &mut SchedCtx, task: TaskId, _flags: EnqueueFlags) {
        let burst = ctx.task(task).required_service;
        ctx.dsq_push_priq(self.ready, task, burst);
    }

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> DispatchDecision {
        match ctx.dsq_pop(self.ready) {
            Some(task) => DispatchDecision::Run {
                task,
                slice: ctx.task(task).remaining_service,
            },
            None => DispatchDecision::Idle,
        }
    }
}

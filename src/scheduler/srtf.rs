use super::{DispatchDecision, EnqueueFlags, SchedCtx, Scheduler, TaskId};
use crate::core::DsqId;

/// Preemptive shortest-remaining-time-first at one-tick granularity.
///
/// Every dispatch grants a single tick, so a newly arrived task with less
/// remaining work takes over at the next tick boundary. Ties go to the lowest
/// input index.
#[derive(Debug, Default)]
pub struct SrtfScheduler {
    ready: DsqId,
}

impl SrtfScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SrtfScheduler {
    fn init(&mut self, ctx: &mut SchedCtx) {
        self.ready = ctx.create_dsq_priq();
    }

    fn name(&self) -> String {
        "SRTF".to_string()
    }

    // Preempted tasks come back ranked by what they have left
    fn enqueue(&mut self, ctx: &mut SchedCtx, task: TaskId, _flags: EnqueueFlags) {
        let remaining = ctx.task(task).remaining_service;
        ctx.dsq_push_priq(self.ready, task, remaining);
    }

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> DispatchDecision {
        match ctx.dsq_pop(self.ready) {
            Some(task) => DispatchDecision::Run { task, slice: 1 },
            None => DispatchDecision::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SchedCore, SchedCoreEvent};

    fn run(tasks: &[(u64, u64)]) -> (SchedCore<SrtfScheduler>, Vec<SchedCoreEvent>) {
        let mut core = SchedCore::new(SrtfScheduler::new());
        for &(arrival, burst) in tasks {
            core.ctx.create_task(arrival, burst);
        }
        let mut events = Vec::new();
        while !core.all_completed() {
            events.extend(core.step().unwrap());
        }
        (core, events)
    }

    #[test]
    fn shorter_arrival_preempts() {
        let (core, events) = run(&[(0, 5), (1, 3), (2, 1)]);
        let starts: Vec<_> = core.ctx.tasks.iter().map(|t| t.start_time).collect();
        let completions: Vec<_> = core.ctx.tasks.iter().map(|t| t.completion_time).collect();

        assert_eq!(starts, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(completions, vec![Some(9), Some(5), Some(3)]);

        // Task 2 takes the CPU the moment it arrives
        assert!(events.contains(&SchedCoreEvent::Dispatch {
            task: 2,
            at: 2,
            slice: 1
        }));
    }

    #[test]
    fn equal_remaining_prefers_lower_index() {
        let (core, _) = run(&[(0, 3), (1, 2)]);

        // At t=1 both have 2 ticks left; task 0 keeps going
        assert_eq!(core.ctx.task(0).completion_time, Some(3));
        assert_eq!(core.ctx.task(1).start_time, Some(3));
        assert_eq!(core.ctx.task(1).completion_time, Some(5));
    }

    #[test]
    fn every_slice_is_one_tick() {
        let (_, events) = run(&[(0, 4), (2, 2)]);

        assert!(events.iter().all(|event| match event {
            SchedCoreEvent::Dispatch { slice, .. } => *slice == 1,
            _ => true,
        }));
    }
}

use super::{
    event::SchedCoreEvent,
    observer::Observer,
    state::{SchedCtx, TaskId, TaskState, Ticks},
};
use crate::error::{SimError, SimResult};
use crate::scheduler::{DispatchDecision, ENQ_PREEMPT, ENQ_WAKEUP, Scheduler};
use log::trace;

pub struct SchedCore<S: Scheduler> {
    pub ctx: SchedCtx,
    pub scheduler: S,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(mut scheduler: S) -> Self {
        let mut ctx = SchedCtx::new();
        scheduler.init(&mut ctx);
        Self {
            ctx,
            scheduler,
            observer: Observer::new(),
        }
    }

    /// Run one scheduling event: admit arrivals, then either execute one
    /// dispatched slice or idle.
    pub fn step(&mut self) -> SimResult<Vec<SchedCoreEvent>> {
        let mut events = Vec::new();
        self.handle_arrivals(&mut events);

        match self.scheduler.dispatch(&mut self.ctx) {
            DispatchDecision::Run { task, slice } => self.run_task(task, slice, &mut events),
            DispatchDecision::Idle => {
                let until = self.ctx.now.saturating_add(1);
                self.idle_until(until, &mut events)?;
            }
            DispatchDecision::IdleUntilArrival => {
                let until = self
                    .ctx
                    .next_arrival()
                    .ok_or(SimError::Stalled { at: self.ctx.now })?;
                self.idle_until(until, &mut events)?;
            }
        }

        self.observer.observe(&self.ctx);
        for event in &events {
            trace!("{event:?}");
        }
        Ok(events)
    }

    fn run_task(&mut self, task: TaskId, slice: Ticks, events: &mut Vec<SchedCoreEvent>) {
        let remaining = self.ctx.task(task).remaining_service;
        debug_assert!(
            slice > 0 && slice <= remaining,
            "Scheduler granted task {task} a slice of {slice} with {remaining} remaining"
        );
        let slice = slice.clamp(1, remaining.max(1));

        let at = self.ctx.now;
        let prev_state = self.ctx.set_running(task);
        debug_assert_eq!(
            prev_state,
            TaskState::Runnable,
            "Scheduler dispatched task {task} which was not runnable"
        );
        events.push(SchedCoreEvent::Dispatch { task, at, slice });

        self.ctx.advance_time(slice);
        self.ctx.consume(task, slice);

        // Tasks that arrived during the slice are enqueued before the
        // dispatched task is resolved
        self.handle_arrivals(events);
        self.ctx.clear_cpu();

        let now = self.ctx.now;
        let remaining = self.ctx.task(task).remaining_service;
        if remaining == 0 {
            self.ctx.mark_completed(task, now);
            events.push(SchedCoreEvent::Complete { task, at: now });
        } else {
            self.ctx.mark_runnable(task);
            events.push(SchedCoreEvent::Preempt {
                task,
                at: now,
                remaining,
            });
            self.scheduler.enqueue(&mut self.ctx, task, ENQ_PREEMPT);
        }
    }

    fn idle_until(&mut self, until: Ticks, events: &mut Vec<SchedCoreEvent>) -> SimResult<()> {
        let from = self.ctx.now;
        if !self.ctx.has_pending() {
            return Err(SimError::Stalled { at: from });
        }
        debug_assert!(until > from, "Idle period must move the clock forward");
        let until = until.max(from.saturating_add(1));

        self.ctx.advance_time(until - from);
        self.ctx.idle_ticks += until - from;
        events.push(SchedCoreEvent::CpuIdle { from, until });

        self.handle_arrivals(events);
        Ok(())
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SchedCoreEvent>) {
        for task in self.ctx.take_arrivals() {
            self.ctx.mark_runnable(task);
            events.push(SchedCoreEvent::Arrival {
                task,
                at: self.ctx.task(task).arrival_time,
            });
            self.scheduler.enqueue(&mut self.ctx, task, ENQ_WAKEUP);
        }
    }

    pub fn all_completed(&self) -> bool {
        self.ctx.all_completed()
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::EnqueueFlags;

    // Runs whatever arrived first, one tick at a time, and never touches the
    // pending set; enough to exercise the core loop on its own.
    #[derive(Default)]
    struct OneTick {
        ready: Vec<TaskId>,
    }

    impl Scheduler for OneTick {
        fn init(&mut self, _ctx: &mut SchedCtx) {}

        fn name(&self) -> String {
            "one-tick".to_string()
        }

        fn enqueue(&mut self, _ctx: &mut SchedCtx, task: TaskId, _flags: EnqueueFlags) {
            self.ready.push(task);
        }

        fn dispatch(&mut self, _ctx: &mut SchedCtx) -> DispatchDecision {
            match self.ready.pop() {
                Some(task) => DispatchDecision::Run { task, slice: 1 },
                None => DispatchDecision::Idle,
            }
        }
    }

    #[test]
    fn idle_ticks_until_first_arrival() {
        let mut core = SchedCore::new(OneTick::default());
        core.ctx.create_task(2, 1);

        let events = core.step().unwrap();
        assert_eq!(events, vec![SchedCoreEvent::CpuIdle { from: 0, until: 1 }]);

        let events = core.step().unwrap();
        assert_eq!(
            events,
            vec![
                SchedCoreEvent::CpuIdle { from: 1, until: 2 },
                SchedCoreEvent::Arrival { task: 0, at: 2 },
            ]
        );

        let events = core.step().unwrap();
        assert_eq!(
            events,
            vec![
                SchedCoreEvent::Dispatch {
                    task: 0,
                    at: 2,
                    slice: 1
                },
                SchedCoreEvent::Complete { task: 0, at: 3 },
            ]
        );
        assert!(core.all_completed());
        assert_eq!(core.ctx.idle_ticks, 2);
        assert_eq!(core.observer().steps(), 3);
    }

    #[test]
    fn preempted_task_is_reenqueued() {
        let mut core = SchedCore::new(OneTick::default());
        core.ctx.create_task(0, 2);

        let events = core.step().unwrap();
        assert_eq!(
            events.last(),
            Some(&SchedCoreEvent::Preempt {
                task: 0,
                at: 1,
                remaining: 1
            })
        );
        assert_eq!(core.scheduler.ready, vec![0]);

        core.step().unwrap();
        assert!(core.all_completed());
        assert_eq!(core.ctx.task(0).start_time, Some(0));
        assert_eq!(core.ctx.task(0).completion_time, Some(2));
    }

    #[test]
    fn idling_with_nothing_pending_is_a_stall() {
        struct Lazy;
        impl Scheduler for Lazy {
            fn init(&mut self, _ctx: &mut SchedCtx) {}
            fn name(&self) -> String {
                "lazy".to_string()
            }
            fn enqueue(&mut self, _ctx: &mut SchedCtx, _task: TaskId, _flags: EnqueueFlags) {}
            fn dispatch(&mut self, _ctx: &mut SchedCtx) -> DispatchDecision {
                DispatchDecision::IdleUntilArrival
            }
        }

        let mut core = SchedCore::new(Lazy);
        core.ctx.create_task(0, 3);
        assert_eq!(core.step(), Err(SimError::Stalled { at: 0 }));
    }
}

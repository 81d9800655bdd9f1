use super::state::{SchedCtx, TaskState, Ticks};

/// Checks the task table and DSQ bookkeeping after every core step. All
/// checks are `debug_assert!`s, so release builds only count steps.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    last_now: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SchedCtx) {
        self.step += 1;

        debug_assert!(
            ctx.now >= self.last_now,
            "Clock went backwards: {} -> {}",
            self.last_now,
            ctx.now
        );
        self.last_now = ctx.now;

        debug_assert!(
            ctx.current.is_none(),
            "CPU still holds task {:?} between steps",
            ctx.current
        );

        for task in &ctx.tasks {
            let id = task.id;
            debug_assert!(
                task.remaining_service <= task.required_service,
                "Task {id} has more service left than it asked for"
            );
            debug_assert_eq!(
                task.state == TaskState::Completed,
                task.remaining_service == 0,
                "Task {id} completion state disagrees with remaining service"
            );
            debug_assert_eq!(
                task.state == TaskState::Completed,
                task.completion_time.is_some(),
                "Task {id} completion time disagrees with its state"
            );
            debug_assert_ne!(
                task.state,
                TaskState::Running,
                "Task {id} left Running between steps"
            );
            if let Some(start) = task.start_time {
                debug_assert!(
                    start >= task.arrival_time,
                    "Task {id} started at {start} before arriving at {}",
                    task.arrival_time
                );
            }
            if let Some(done) = task.completion_time {
                debug_assert!(
                    task.start_time.is_some_and(|start| done >= start + task.required_service),
                    "Task {id} completed at {done} without enough service"
                );
            }
            if task.state == TaskState::Pending {
                debug_assert!(
                    task.arrival_time > ctx.now,
                    "Task {id} still pending after its arrival time"
                );
            }
        }

        if ctx.all_completed() {
            for (dsq_id, dsq) in &ctx.dsqs {
                debug_assert!(
                    dsq.is_empty(),
                    "DSQ {dsq_id:?} still holds {} tasks after every task completed",
                    dsq.len()
                );
            }
        }

        for (&task_id, &dsq_id) in &ctx.task_to_dsq {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Runnable,
                "Task {task_id} in DSQ {dsq_id:?} must be Runnable"
            );
            if let Some(dsq) = ctx.dsqs.get(dsq_id) {
                debug_assert!(
                    dsq.contains(task_id),
                    "task_to_dsq claims task {task_id} in DSQ {dsq_id:?}, but queue does not contain it"
                );
            } else {
                debug_assert!(false, "task_to_dsq references unknown DSQ {dsq_id:?}");
            }
        }
    }
}

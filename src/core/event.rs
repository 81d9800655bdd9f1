use crate::core::{TaskId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedCoreEvent {
    Arrival {
        task: TaskId,
        at: Ticks,
    },
    Dispatch {
        task: TaskId,
        at: Ticks,
        slice: Ticks,
    },
    // Slice ended with work left; task went back to its DSQ
    Preempt {
        task: TaskId,
        at: Ticks,
        remaining: Ticks,
    },
    Complete {
        task: TaskId,
        at: Ticks,
    },
    // Nothing runnable after dispatch()
    CpuIdle {
        from: Ticks,
        until: Ticks,
    },
}

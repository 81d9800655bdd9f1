use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;

// Index into Task Vec
pub type TaskId = usize;
pub type Ticks = u64;
new_key_type! {
    pub struct DsqId;
}

/// Position of a task in a ranked DSQ: smallest `key` first, lowest task
/// index on ties.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct Rank {
    pub key: Ticks,
    pub task: TaskId,
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop Rank's Ord
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.key, other.task).cmp(&(self.key, self.task))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    // Not yet arrived
    Pending,
    Runnable,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub state: TaskState,
    pub arrival_time: Ticks,
    pub required_service: Ticks,
    pub remaining_service: Ticks,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
    pub dispatches: u64,
}

#[derive(Debug)]
pub enum Dsq {
    Fifo {
        tasks: VecDeque<TaskId>,
    },
    Priq {
        tasks: KeyedPriorityQueue<TaskId, Rank>,
    },
}

impl Dsq {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            tasks: VecDeque::new(),
        }
    }

    pub fn new_priq() -> Self {
        Self::Priq {
            tasks: KeyedPriorityQueue::new(),
        }
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&task_id),
            Self::Priq { tasks } => tasks.iter().any(|t| *t.0 == task_id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { tasks } => tasks.len(),
            Self::Priq { tasks } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Simulation state for a single CPU: the clock, the task table and the
/// dispatch queues policies create. Owned by one `SchedCore`, never shared
/// between runs.
#[derive(Debug)]
pub struct SchedCtx {
    pub now: Ticks,
    pub current: Option<TaskId>,
    pub tasks: Vec<Task>,
    pub dsqs: SlotMap<DsqId, Dsq>,
    pub task_to_dsq: FxHashMap<TaskId, DsqId>,
    pub idle_ticks: Ticks,

    // Task ids sorted by (arrival_time, id); everything before the cursor has
    // been admitted
    arrival_order: Vec<TaskId>,
    arrival_cursor: usize,
}

impl Default for SchedCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedCtx {
    pub fn new() -> Self {
        Self {
            now: 0,
            current: None,
            tasks: Vec::new(),
            dsqs: SlotMap::with_key(),
            task_to_dsq: FxHashMap::default(),
            idle_ticks: 0,
            arrival_order: Vec::new(),
            arrival_cursor: 0,
        }
    }

    pub fn create_task(&mut self, arrival_time: Ticks, required_service: Ticks) -> TaskId {
        let id = self.tasks.len();

        let task = Task {
            id,
            state: TaskState::Pending,
            arrival_time,
            required_service,
            remaining_service: required_service,
            start_time: None,
            completion_time: None,
            dispatches: 0,
        };
        self.tasks.push(task);

        let pos = self
            .arrival_order
            .partition_point(|&t| self.tasks[t].arrival_time <= arrival_time);
        debug_assert!(
            pos >= self.arrival_cursor,
            "Task {id} created behind the arrival cursor"
        );
        self.arrival_order.insert(pos, id);

        id
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    /// Arrival time of the earliest task that has not been admitted yet.
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.arrival_order
            .get(self.arrival_cursor)
            .map(|&t| self.tasks[t].arrival_time)
    }

    pub fn has_pending(&self) -> bool {
        self.arrival_cursor < self.arrival_order.len()
    }

    // Returned in index order, not arrival order
    pub fn take_arrivals(&mut self) -> Vec<TaskId> {
        let now = self.now;
        let arrived = self.arrival_order[self.arrival_cursor..]
            .iter()
            .take_while(|&&t| self.tasks[t].arrival_time <= now) // Contiguous, since arrival_order is sorted
            .count();

        let mut batch = self.arrival_order[self.arrival_cursor..self.arrival_cursor + arrived].to_vec();
        self.arrival_cursor += arrived;
        batch.sort_unstable();
        batch
    }

    pub fn all_completed(&self) -> bool {
        self.tasks
            .iter()
            .all(|task| task.state == TaskState::Completed)
    }

    pub fn create_dsq_fifo(&mut self) -> DsqId {
        self.dsqs.insert(Dsq::new_fifo())
    }

    pub fn create_dsq_priq(&mut self) -> DsqId {
        self.dsqs.insert(Dsq::new_priq())
    }

    fn dsq_push(&mut self, dsq_id: DsqId, task_id: TaskId, at: Option<usize>, rank: Option<Rank>) {
        assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Task {task_id} already present in some DSQ"
        );

        let task = self.task(task_id);
        debug_assert!(
            task.state == TaskState::Runnable,
            "Task {task_id} must be Runnable when enqueued, found {:?}",
            task.state
        );

        let dsq = self.dsqs.get_mut(dsq_id).expect("Unknown DSQ");
        match dsq {
            Dsq::Fifo { tasks } => match at {
                Some(index) => {
                    let index = index.min(tasks.len());
                    tasks.insert(index, task_id);
                }
                None => tasks.push_back(task_id),
            },
            Dsq::Priq { tasks } => {
                tasks.push(
                    task_id,
                    rank.expect("Attempted to push to a priority DSQ with no rank"),
                );
            }
        };

        self.task_to_dsq.insert(task_id, dsq_id);
    }

    pub fn dsq_push_fifo(&mut self, dsq_id: DsqId, task_id: TaskId) {
        self.dsq_push(dsq_id, task_id, None, None);
    }

    /// Insert into a FIFO DSQ at `index` (clamped to the tail).
    pub fn dsq_insert_fifo(&mut self, dsq_id: DsqId, index: usize, task_id: TaskId) {
        self.dsq_push(dsq_id, task_id, Some(index), None);
    }

    pub fn dsq_push_priq(&mut self, dsq_id: DsqId, task_id: TaskId, key: Ticks) {
        let rank = Rank { key, task: task_id };
        self.dsq_push(dsq_id, task_id, None, Some(rank));
    }

    pub fn dsq_pop(&mut self, dsq_id: DsqId) -> Option<TaskId> {
        let dsq = self.dsqs.get_mut(dsq_id)?;
        let task = match dsq {
            Dsq::Fifo { tasks } => tasks.pop_front(),
            Dsq::Priq { tasks } => tasks.pop().map(|t| t.0),
        }?;

        let removed = self.task_to_dsq.remove(&task);
        debug_assert!(removed.is_some(), "Task {task} missing DSQ membership");

        Some(task)
    }

    pub fn dsq_len(&self, dsq_id: DsqId) -> usize {
        self.dsqs.get(dsq_id).map_or(0, Dsq::len)
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn mark_runnable(&mut self, task_id: TaskId) {
        let task = self.task_mut(task_id);
        debug_assert!(
            task.state != TaskState::Completed,
            "Completed task {} cannot be runnable",
            task.id
        );
        task.state = TaskState::Runnable;
    }

    // Return previous state (Runnable unless the policy dispatched something
    // it never enqueued)
    pub fn set_running(&mut self, task_id: TaskId) -> TaskState {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Running task {task_id} must not be enqueued"
        );
        debug_assert!(self.cpu_is_idle(), "CPU already running a task");

        let now = self.now;
        self.current = Some(task_id);
        let task = self.task_mut(task_id);
        let prev_state = task.state;
        task.state = TaskState::Running;
        task.start_time.get_or_insert(now);
        task.dispatches += 1;
        prev_state
    }

    /// Charge `service` ticks of execution to the running task.
    pub fn consume(&mut self, task_id: TaskId, service: Ticks) {
        let task = self.task_mut(task_id);
        debug_assert!(
            service <= task.remaining_service,
            "Task {task_id} charged {service} ticks with only {} remaining",
            task.remaining_service
        );
        task.remaining_service = task.remaining_service.saturating_sub(service);
    }

    pub fn mark_completed(&mut self, task_id: TaskId, completion_time: Ticks) {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Completing task {} that is still enqueued",
            task_id
        );

        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.state == TaskState::Running,
            "Task {task_id} must have been running before marked complete"
        );
        debug_assert_eq!(task.remaining_service, 0, "Task {task_id} has work left");

        task.state = TaskState::Completed;
        task.completion_time = Some(completion_time);
    }

    pub fn clear_cpu(&mut self) {
        self.current = None;
    }
}

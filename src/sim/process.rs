use crate::core::state::Ticks;
use serde::{Deserialize, Serialize};

pub type ProcessId = u32;

/// Static description of a process. `memory_requirement` is carried through
/// to the report and never seen by a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub memory_requirement: u64,
}

impl Process {
    pub fn new(id: ProcessId, arrival_time: Ticks, burst_time: Ticks, memory_requirement: u64) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            memory_requirement,
        }
    }

    /// Build descriptors from `(arrival, burst, memory)` tuples, numbering
    /// them 1..=N in input order.
    pub fn batch(specs: impl IntoIterator<Item = (Ticks, Ticks, u64)>) -> Vec<Process> {
        specs
            .into_iter()
            .zip(1..)
            .map(|((arrival, burst, memory), id)| Process::new(id, arrival, burst, memory))
            .collect()
    }
}

/// A process together with what one simulation run recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInstance {
    pub process: Process,
    pub remaining_time: Ticks,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl ProcessInstance {
    pub fn new(process: Process) -> Self {
        Self {
            remaining_time: process.burst_time,
            process,
            start_time: None,
            completion_time: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    pub fn turnaround_time(&self) -> Option<Ticks> {
        self.completion_time
            .map(|done| done.saturating_sub(self.process.arrival_time))
    }

    pub fn waiting_time(&self) -> Option<Ticks> {
        self.turnaround_time()
            .map(|turnaround| turnaround.saturating_sub(self.process.burst_time))
    }

    pub fn response_time(&self) -> Option<Ticks> {
        self.start_time
            .map(|start| start.saturating_sub(self.process.arrival_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_numbers_from_one() {
        let procs = Process::batch([(0, 5, 64), (1, 3, 0)]);
        assert_eq!(procs[0], Process::new(1, 0, 5, 64));
        assert_eq!(procs[1], Process::new(2, 1, 3, 0));
    }

    #[test]
    fn derived_times() {
        let mut inst = ProcessInstance::new(Process::new(1, 2, 3, 0));
        assert_eq!(inst.remaining_time, 3);
        assert_eq!(inst.turnaround_time(), None);
        assert_eq!(inst.waiting_time(), None);

        inst.start_time = Some(4);
        inst.completion_time = Some(9);
        inst.remaining_time = 0;

        assert_eq!(inst.turnaround_time(), Some(7));
        assert_eq!(inst.waiting_time(), Some(4));
        assert_eq!(inst.response_time(), Some(2));
    }
}

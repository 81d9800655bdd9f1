use super::process::{Process, ProcessInstance};
use super::report::Report;
use crate::{
    config::{PolicyKind, SimConfig},
    core::{SchedCore, SchedCoreEvent, state::Ticks},
    error::{SimError, SimResult},
    scheduler::{FcfsScheduler, RoundRobinScheduler, Scheduler, SjfScheduler, SrtfScheduler},
};
use log::{debug, info};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Whole-run counters alongside the per-process metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SimStats {
    pub makespan: Ticks,
    pub idle_ticks: Ticks,
    pub dispatches: u64,
    pub steps: u64,
}

#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub policy: String,
    pub processes: Vec<ProcessInstance>,
    pub stats: SimStats,
}

/// One simulation run of a process set under scheduler `S`.
///
/// Task ids in the core are indices into `processes`.
pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    pub processes: Vec<ProcessInstance>,
}

impl<S: Scheduler> Sim<S> {
    /// Validate the process set and load it into a fresh core. The caller's
    /// slice is only read.
    pub fn new(processes: &[Process], scheduler: S) -> SimResult<Self> {
        if processes.is_empty() {
            return Err(SimError::NoProcesses);
        }

        let mut seen = FxHashSet::default();
        for process in processes {
            if process.burst_time == 0 {
                return Err(SimError::ZeroBurst { id: process.id });
            }
            if !seen.insert(process.id) {
                return Err(SimError::DuplicateId { id: process.id });
            }
        }

        let mut core = SchedCore::new(scheduler);
        let processes: Vec<_> = processes.iter().cloned().map(ProcessInstance::new).collect();
        for (index, inst) in processes.iter().enumerate() {
            let task_id = core
                .ctx
                .create_task(inst.process.arrival_time, inst.process.burst_time);
            debug_assert_eq!(task_id, index, "TaskId must match process index");
        }

        Ok(Self { core, processes })
    }

    pub fn step(&mut self) -> SimResult<Vec<SchedCoreEvent>> {
        let events = self.core.step()?;

        for event in &events {
            match *event {
                SchedCoreEvent::Preempt { task, .. } | SchedCoreEvent::Complete { task, .. } => {
                    let state = self.core.ctx.task(task);
                    let inst = &mut self.processes[task];
                    inst.remaining_time = state.remaining_service;
                    inst.start_time = state.start_time;
                    inst.completion_time = state.completion_time;
                }
                _ => {}
            }
        }

        Ok(events)
    }

    pub fn all_processes_completed(&self) -> bool {
        self.processes.iter().all(ProcessInstance::is_completed)
    }

    pub fn processes_map<T>(&self, f: impl Fn(&ProcessInstance) -> T) -> impl Iterator<Item = T> {
        self.processes.iter().map(f)
    }

    /// Step until every process has completed, handing each event to
    /// `on_event`.
    pub fn run_with(mut self, mut on_event: impl FnMut(Ticks, &SchedCoreEvent)) -> SimResult<SimOutcome> {
        let policy = self.core.scheduler.name();
        debug!(
            "Starting {policy} run with {} processes",
            self.processes.len()
        );

        while !self.all_processes_completed() {
            let now = self.core.now();
            for event in self.step()? {
                on_event(now, &event);
            }
        }

        let ctx = &self.core.ctx;
        let stats = SimStats {
            makespan: self
                .processes_map(|p| p.completion_time.unwrap_or_default())
                .max()
                .unwrap_or_default(),
            idle_ticks: ctx.idle_ticks,
            dispatches: ctx.tasks.iter().map(|task| task.dispatches).sum(),
            steps: self.core.observer().steps(),
        };
        info!(
            "{policy} finished at t={} ({} dispatches, {} idle ticks)",
            stats.makespan, stats.dispatches, stats.idle_ticks
        );

        Ok(SimOutcome {
            policy,
            processes: self.processes,
            stats,
        })
    }

    pub fn run(self) -> SimResult<SimOutcome> {
        self.run_with(|_, _| {})
    }
}

/// Run `processes` under the policy chosen in `config` and aggregate the
/// result.
pub fn simulate(processes: &[Process], config: &SimConfig) -> SimResult<Report> {
    let outcome = run_policy(processes, config)?;
    Report::from_outcome(&outcome)
}

pub fn run_policy(processes: &[Process], config: &SimConfig) -> SimResult<SimOutcome> {
    match config.policy {
        PolicyKind::Fcfs => Sim::new(processes, FcfsScheduler::new())?.run(),
        PolicyKind::Sjf => Sim::new(processes, SjfScheduler::new())?.run(),
        PolicyKind::Srtf => Sim::new(processes, SrtfScheduler::new())?.run(),
        PolicyKind::RoundRobin => {
            let quantum = config.quantum.ok_or(SimError::MissingQuantum)?;
            Sim::new(processes, RoundRobinScheduler::new(quantum, config.requeue))?.run()
        }
    }
}

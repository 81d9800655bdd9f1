use super::driver::{SimOutcome, SimStats};
use super::process::{ProcessId, ProcessInstance};
use crate::core::state::Ticks;
use crate::error::{SimError, SimResult};
use average::{Estimate, Mean};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub pid: ProcessId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub memory_requirement: u64,
    pub remaining_time: Ticks,
    pub start_time: Ticks,
    pub completion_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

impl ReportRow {
    fn from_instance(inst: &ProcessInstance) -> SimResult<Self> {
        let p = &inst.process;
        let incomplete = || SimError::Incomplete { id: p.id };
        let inconsistent = |reason| SimError::InconsistentTimes { id: p.id, reason };
        let start_time = inst.start_time.ok_or_else(incomplete)?;
        let completion_time = inst.completion_time.ok_or_else(incomplete)?;

        if start_time < p.arrival_time {
            return Err(inconsistent("started before arriving"));
        }
        if completion_time < start_time {
            return Err(inconsistent("completed before starting"));
        }
        let turnaround_time = completion_time - p.arrival_time;
        let waiting_time = turnaround_time
            .checked_sub(p.burst_time)
            .ok_or_else(|| inconsistent("completed with less service than its burst"))?;

        Ok(Self {
            pid: p.id,
            arrival_time: p.arrival_time,
            burst_time: p.burst_time,
            memory_requirement: p.memory_requirement,
            remaining_time: inst.remaining_time,
            start_time,
            completion_time,
            waiting_time,
            turnaround_time,
        })
    }

    pub fn response_time(&self) -> Ticks {
        self.start_time - self.arrival_time
    }
}

/// Per-process results ordered by start time, plus averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub rows: Vec<ReportRow>,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
    pub average_response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SimStats>,
}

impl Report {
    /// Aggregate a completed process list. Fails on an empty list or on a
    /// process that never finished.
    pub fn from_completed(title: impl Into<String>, processes: &[ProcessInstance]) -> SimResult<Self> {
        if processes.is_empty() {
            return Err(SimError::NoProcesses);
        }

        let mut rows = processes
            .iter()
            .map(ReportRow::from_instance)
            .collect::<SimResult<Vec<_>>>()?;
        rows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.pid.cmp(&b.pid)));

        Ok(Self {
            title: title.into(),
            average_waiting_time: avg(rows.iter().map(|r| r.waiting_time as f64)),
            average_turnaround_time: avg(rows.iter().map(|r| r.turnaround_time as f64)),
            average_response_time: avg(rows.iter().map(|r| r.response_time() as f64)),
            rows,
            stats: None,
        })
    }

    pub fn from_outcome(outcome: &SimOutcome) -> SimResult<Self> {
        let mut report = Self::from_completed(outcome.policy.clone(), &outcome.processes)?;
        report.stats = Some(outcome.stats);
        Ok(report)
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Results:", self.title)?;
        writeln!(
            f,
            "{:<6}{:<14}{:<10}{:<10}{:<12}{:<12}{:<12}{:<14}",
            "PID", "Arrival", "Burst", "MemReq", "Start", "Complete", "Waiting", "Turnaround"
        )?;
        writeln!(f, "{}", "-".repeat(90))?;

        for row in &self.rows {
            writeln!(
                f,
                "{:<6}{:<14}{:<10}{:<10}{:<12}{:<12}{:<12}{:<14}",
                row.pid,
                row.arrival_time,
                row.burst_time,
                row.memory_requirement,
                row.start_time,
                row.completion_time,
                row.waiting_time,
                row.turnaround_time
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Average waiting time:    {:.2}", self.average_waiting_time)?;
        writeln!(f, "Average turnaround time: {:.2}", self.average_turnaround_time)?;
        writeln!(f, "Average response time:   {:.2}", self.average_response_time)?;

        if let Some(stats) = &self.stats {
            writeln!(f, "Makespan:                {}", stats.makespan)?;
            writeln!(f, "CPU idle ticks:          {}", stats.idle_ticks)?;
            writeln!(f, "Dispatches:              {}", stats.dispatches)?;
        }
        Ok(())
    }
}

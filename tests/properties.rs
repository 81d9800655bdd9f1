/*!
 * Scheduling Invariant Tests
 * Cross-policy properties over generated process sets
 */

use proptest::prelude::*;
use sched_sim::core::SchedCoreEvent;
use sched_sim::scheduler::{RoundRobinScheduler, SjfScheduler, SrtfScheduler};
use sched_sim::sim::BernoulliWorkload;
use sched_sim::{PolicyKind, Process, Quantum, RequeueOrder, Sim, SimConfig, run_policy};

fn process_set() -> impl Strategy<Value = Vec<Process>> {
    prop::collection::vec((0u64..20, 1u64..8, 0u64..1024), 1..10)
        .prop_map(|specs| Process::batch(specs))
}

proptest! {
    #[test]
    fn every_policy_completes_consistently(procs in process_set(), quantum in 1i64..5) {
        for policy in PolicyKind::ALL {
            let config = SimConfig::new(policy, Some(quantum)).unwrap();
            let outcome = run_policy(&procs, &config).unwrap();

            let total_burst: u64 = procs.iter().map(|p| p.burst_time).sum();
            prop_assert_eq!(outcome.stats.makespan, total_burst + outcome.stats.idle_ticks);

            for inst in &outcome.processes {
                let start = inst.start_time.unwrap();
                let done = inst.completion_time.unwrap();
                prop_assert_eq!(inst.remaining_time, 0);
                prop_assert!(start >= inst.process.arrival_time);
                prop_assert!(done >= start + inst.process.burst_time);
                prop_assert_eq!(inst.turnaround_time(), Some(done - inst.process.arrival_time));
                prop_assert_eq!(
                    inst.waiting_time(),
                    Some(done - inst.process.arrival_time - inst.process.burst_time)
                );
            }
        }
    }

    #[test]
    fn fcfs_preserves_arrival_order(procs in process_set()) {
        let outcome = run_policy(&procs, &SimConfig::fcfs()).unwrap();

        for a in &outcome.processes {
            for b in &outcome.processes {
                if a.process.arrival_time < b.process.arrival_time {
                    prop_assert!(a.start_time <= b.start_time);
                }
            }
        }
    }

    #[test]
    fn sjf_never_skips_a_shorter_ready_job(procs in process_set()) {
        let outcome = Sim::new(&procs, SjfScheduler::new()).unwrap().run().unwrap();

        // Whenever a job starts, no other job that had already arrived and
        // was still waiting may be strictly shorter
        for chosen in &outcome.processes {
            let at = chosen.start_time.unwrap();
            for other in &outcome.processes {
                let waiting = other.process.arrival_time <= at && other.start_time.unwrap() > at;
                if waiting {
                    prop_assert!(other.process.burst_time >= chosen.process.burst_time);
                }
            }
        }
    }

    #[test]
    fn srtf_runs_the_least_remaining_work(procs in process_set()) {
        let mut sim = Sim::new(&procs, SrtfScheduler::new()).unwrap();

        while !sim.all_processes_completed() {
            let remaining: Vec<_> = sim.core.ctx.tasks.iter().map(|t| t.remaining_service).collect();
            for event in sim.step().unwrap() {
                if let SchedCoreEvent::Dispatch { task, at, .. } = event {
                    for other in &sim.core.ctx.tasks {
                        if other.arrival_time <= at && remaining[other.id] > 0 {
                            prop_assert!(remaining[other.id] >= remaining[task]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn round_robin_bounds_consecutive_service(
        procs in process_set(),
        quantum in 1i64..5,
        order in prop_oneof![Just(RequeueOrder::ArrivalsFirst), Just(RequeueOrder::PreemptedFirst)],
    ) {
        let q = Quantum::new(quantum).unwrap();
        let sim = Sim::new(&procs, RoundRobinScheduler::new(q, order)).unwrap();

        let mut events = Vec::new();
        let outcome = sim.run_with(|_, event| events.push(event.clone())).unwrap();
        prop_assert!(outcome.processes.iter().all(|p| p.remaining_time == 0));

        // `ready` counts queued tasks, preempted ones included; `fresh` is
        // how many of them arrived since the last dispatch
        let mut ready = 0usize;
        let mut fresh = 0usize;
        let mut last: Option<usize> = None;
        for event in &events {
            match *event {
                SchedCoreEvent::Arrival { .. } => {
                    ready += 1;
                    fresh += 1;
                }
                SchedCoreEvent::Preempt { .. } => ready += 1,
                SchedCoreEvent::Dispatch { task, slice, .. } => {
                    prop_assert!(slice <= q.get());
                    prop_assert!(ready > 0);
                    ready -= 1;
                    if last == Some(task) {
                        match order {
                            RequeueOrder::ArrivalsFirst => {
                                prop_assert_eq!(ready, 0, "task {} re-dispatched over waiting tasks", task);
                            }
                            RequeueOrder::PreemptedFirst => {
                                prop_assert!(ready <= fresh, "task {} overtook a task queued before its slice", task);
                            }
                        }
                    }
                    last = Some(task);
                    fresh = 0;
                }
                SchedCoreEvent::Complete { .. } | SchedCoreEvent::CpuIdle { .. } => last = None,
            }
        }
        prop_assert_eq!(ready, 0);
    }
}

#[test]
fn generated_workloads_run_under_every_policy() {
    let workload = BernoulliWorkload::default();

    for seed in 0..16 {
        let procs = workload.generate(40, seed);
        for policy in PolicyKind::ALL {
            let config = SimConfig::new(policy, Some(3)).unwrap();
            let outcome = run_policy(&procs, &config).unwrap();
            assert!(outcome.processes.iter().all(|p| p.completion_time.is_some()));
        }
    }
}

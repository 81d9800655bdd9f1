use super::process::Process;
use crate::core::state::Ticks;
use rand::prelude::*;

/// Shape of a generated workload: each tick a process arrives with
/// probability `p_arrival`; it is short with probability `p_short`.
#[derive(Debug, Clone, Copy)]
pub struct BernoulliWorkload {
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub max_memory: u64,
}

impl Default for BernoulliWorkload {
    fn default() -> Self {
        Self {
            p_arrival: 0.3,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 6,
            max_memory: 512,
        }
    }
}

impl BernoulliWorkload {
    /// Generate `count` processes, ids 1..=count. The same seed always gives
    /// the same workload.
    pub fn generate(&self, count: usize, seed: u64) -> Vec<Process> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut specs = Vec::with_capacity(count);
        // NaN would never pass the arrival check
        let p_arrival = if self.p_arrival.is_nan() {
            Self::default().p_arrival
        } else {
            self.p_arrival.clamp(f64::EPSILON, 1.0)
        };

        let mut t: Ticks = 0;
        while specs.len() < count {
            if rng.random::<f64>() < p_arrival {
                let run_time = if rng.random::<f64>() < self.p_short {
                    self.short_ticks
                } else {
                    self.long_ticks
                };
                let memory = rng.random_range(0..=self.max_memory);

                specs.push((t, run_time.max(1), memory));
            }
            t += 1;
        }

        Process::batch(specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_a_seed() {
        let workload = BernoulliWorkload::default();
        assert_eq!(workload.generate(20, 7), workload.generate(20, 7));
    }

    #[test]
    fn shape() {
        let workload = BernoulliWorkload::default();
        let procs = workload.generate(50, 1);

        assert_eq!(procs.len(), 50);
        assert_eq!(procs.first().map(|p| p.id), Some(1));
        assert_eq!(procs.last().map(|p| p.id), Some(50));
        assert!(procs.windows(2).all(|w| w[0].arrival_time < w[1].arrival_time));
        assert!(procs.iter().all(|p| p.burst_time == 2 || p.burst_time == 6));
        assert!(procs.iter().all(|p| p.memory_requirement <= 512));
    }

    #[test]
    fn nan_arrival_probability_falls_back_to_default() {
        let nan = BernoulliWorkload {
            p_arrival: f64::NAN,
            ..BernoulliWorkload::default()
        };
        assert_eq!(nan.generate(10, 3), BernoulliWorkload::default().generate(10, 3));
    }
}

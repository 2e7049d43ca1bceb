use rand::prelude::*;

use super::job::JobSpec;
use crate::core::{Priority, Ticks};

/// Bernoulli arrivals: at most one job per tick, so arrival times are unique.
#[derive(Debug, Clone)]
pub struct BernoulliWorkload {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub priority_levels: Priority,
    pub seed: u64,
}

impl Default for BernoulliWorkload {
    fn default() -> Self {
        Self {
            ticks: 500,
            p_arrival: 0.3,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 6,
            priority_levels: 4,
            seed: 0,
        }
    }
}

impl BernoulliWorkload {
    pub fn generate(&self) -> Vec<JobSpec> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut jobs = Vec::new();
        let levels = self.priority_levels.max(1);

        for t in 0..self.ticks {
            if rng.random::<f64>() < self.p_arrival {
                let run_time = if rng.random::<f64>() < self.p_short {
                    self.short_ticks
                } else {
                    self.long_ticks
                };

                jobs.push(JobSpec {
                    id: jobs.len() as u64,
                    arrival_time: t,
                    run_time,
                    priority: rng.random_range(0..levels),
                });
            }
        }

        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_jobs() {
        let workload = BernoulliWorkload::default();
        assert_eq!(workload.generate(), workload.generate());
    }

    #[test]
    fn arrivals_strictly_increase() {
        let jobs = BernoulliWorkload {
            p_arrival: 0.9,
            seed: 7,
            ..Default::default()
        }
        .generate();
        assert!(!jobs.is_empty());
        assert!(jobs.windows(2).all(|w| w[0].arrival_time < w[1].arrival_time));
        assert!(jobs.iter().all(|j| (0..4).contains(&j.priority)));
    }

    #[test]
    fn certain_arrivals_fill_every_tick() {
        let jobs = BernoulliWorkload {
            ticks: 10,
            p_arrival: 1.0,
            p_short: 1.0,
            ..Default::default()
        }
        .generate();
        assert_eq!(jobs.len(), 10);
        assert!(jobs.iter().all(|j| j.run_time == 2));
    }
}

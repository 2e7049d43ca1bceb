use super::state::KernelCtx;
use crate::scheduler::Scheme;

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &KernelCtx) {
        self.step += 1;

        for core in &ctx.cores {
            if let Some(job_id) = core.current {
                let key = ctx.find_job(job_id);
                debug_assert!(key.is_some(), "core {} runs unknown job {job_id}", core.id);
                if let Some(key) = key {
                    let job = ctx.job(key);
                    debug_assert!(!job.finished, "finished job {job_id} still on core {}", core.id);
                    debug_assert_eq!(
                        job.core_assigned,
                        Some(core.id),
                        "job {job_id} metadata core_assigned mismatch"
                    );
                }
            }
        }

        for job in ctx.jobs.values() {
            if let Some(core) = job.core_assigned {
                debug_assert_eq!(
                    ctx.cores[core].current,
                    Some(job.id),
                    "job {} claims core {core}, but core does not hold it",
                    job.id
                );
            }
            if job.finished {
                debug_assert!(job.end_time.is_some(), "finished job {} has no end time", job.id);
                debug_assert!(
                    job.schedule_latency.is_some(),
                    "finished job {} was never dispatched",
                    job.id
                );
            }
        }

        debug_assert_eq!(
            ctx.queue.len(),
            ctx.jobs.len(),
            "queue must hold every job ever seen"
        );

        // Round-robin ranks by insertion only; there is no order to check.
        if ctx.scheme() != Scheme::Rr {
            debug_assert!(ctx.queue_is_sorted(), "queue out of order after step {}", self.step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Job;

    #[test]
    fn consistent_state_passes() {
        let mut ctx = KernelCtx::new(1, Scheme::Fcfs);
        let key = ctx.insert_job(Job::new(0, 0, 4, 0)).unwrap();
        ctx.assign(0, key);
        ctx.update_timings(0);
        ctx.mark_finished(key, 4);

        let mut observer = Observer::new();
        observer.observe(&ctx);
        assert_eq!(observer.steps(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "never dispatched")]
    fn finished_job_without_latency_is_flagged() {
        let mut ctx = KernelCtx::new(1, Scheme::Fcfs);
        let key = ctx.insert_job(Job::new(0, 0, 4, 0)).unwrap();
        ctx.mark_finished(key, 4);
        Observer::new().observe(&ctx);
    }
}

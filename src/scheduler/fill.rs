use tracing::debug;

use crate::core::KernelCtx;

// Finished jobs stay in the queue, so walk it rather than trusting the head.
pub fn fill_idle_cores(ctx: &mut KernelCtx) {
    while let Some(core) = ctx.pick_idle_core() {
        let next = ctx
            .queue
            .iter()
            .copied()
            .find(|&key| ctx.job(key).is_waiting());

        let Some(key) = next else {
            break;
        };

        debug!(job = ctx.job(key).id, core, time = ctx.now, "dispatch");
        ctx.assign(core, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Job;
    use crate::scheduler::Scheme;

    fn ctx_with(cores: usize, scheme: Scheme, jobs: &[(u64, u64, u64, i32)]) -> KernelCtx {
        let mut ctx = KernelCtx::new(cores, scheme);
        for &(id, arrival, duration, priority) in jobs {
            ctx.insert_job(Job::new(id, arrival, duration, priority))
                .unwrap();
        }
        ctx
    }

    fn occupants(ctx: &KernelCtx) -> Vec<Option<u64>> {
        ctx.cores.iter().map(|c| c.current).collect()
    }

    #[test]
    fn fills_lowest_cores_in_priority_order() {
        let mut ctx = ctx_with(2, Scheme::Sjf, &[(0, 0, 9, 0), (1, 1, 2, 0), (2, 2, 5, 0)]);
        fill_idle_cores(&mut ctx);
        assert_eq!(occupants(&ctx), vec![Some(1), Some(2)]);
        assert!(ctx.job(ctx.find_job(0).unwrap()).is_waiting());
    }

    #[test]
    fn leaves_spare_cores_idle() {
        let mut ctx = ctx_with(3, Scheme::Fcfs, &[(4, 0, 3, 0)]);
        fill_idle_cores(&mut ctx);
        assert_eq!(occupants(&ctx), vec![Some(4), None, None]);
    }

    #[test]
    fn running_jobs_are_not_displaced() {
        let mut ctx = ctx_with(1, Scheme::Pri, &[(0, 0, 5, 4)]);
        fill_idle_cores(&mut ctx);
        ctx.insert_job(Job::new(1, 1, 5, 0)).unwrap();
        fill_idle_cores(&mut ctx);
        assert_eq!(occupants(&ctx), vec![Some(0)]);
    }

    #[test]
    fn skips_finished_jobs() {
        let mut ctx = ctx_with(1, Scheme::Fcfs, &[(0, 0, 1, 0), (1, 1, 1, 0)]);
        fill_idle_cores(&mut ctx);
        let first = ctx.find_job(0).unwrap();
        ctx.mark_finished(first, 1);
        fill_idle_cores(&mut ctx);
        assert_eq!(occupants(&ctx), vec![Some(1)]);
    }
}

use std::cmp::Ordering;

use tracing::debug;

use crate::core::{Comparator, KernelCtx, SchedCoreEvent, Ticks};

// Seat every waiting job, best first, on an idle core or in place of the
// worst running job it strictly outranks.
pub fn preempt_cores(ctx: &mut KernelCtx, now: Ticks) {
    let scheme = ctx.scheme();
    if scheme.reads_run_time() {
        ctx.refresh_running(now);
        ctx.resort_queue();
    }

    // Membership does not change during the pass, only job state.
    let order = ctx.queue_keys();

    for &key in &order {
        if !ctx.job(key).is_waiting() {
            continue;
        }

        if let Some(core) = ctx.pick_idle_core() {
            debug!(job = ctx.job(key).id, core, time = now, "dispatch");
            ctx.assign(core, key);
            continue;
        }

        // Queue order is rank order, so the last running job is the worst.
        let victim = order.iter().rev().copied().find(|&other| {
            other != key
                && ctx.job(other).is_running()
                && scheme.compare(&ctx.jobs, &key, &other) == Ordering::Less
        });

        let Some(victim) = victim else {
            continue;
        };

        let Some(core) = ctx.evict(victim, now) else {
            continue;
        };

        let (job, by) = (ctx.job(victim).id, ctx.job(key).id);
        debug!(job, by, core, time = now, "preempt");
        ctx.events.push(SchedCoreEvent::Preempted { job, core, by });
        ctx.assign(core, key);
    }
}

use std::fmt;

use tracing::{debug, trace, warn};

use super::{
    event::SchedCoreEvent,
    observer::Observer,
    state::{CoreId, Job, JobId, KernelCtx, Priority, Ticks},
    stats::{self, RunStats},
};
use crate::error::SchedError;
use crate::scheduler::{self, Scheme, fill_idle_cores};

/// What a quantum expiry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantumExpiry {
    /// Under round-robin, send the running job to the back of the queue
    /// and refill the core.
    #[default]
    Rotate,
    /// Leave everything as it is and report the core as idle.
    Ignore,
}

#[derive(Debug, Clone, Default)]
pub struct SchedConfig {
    pub quantum_expiry: QuantumExpiry,
}

/// One scheduling run: the job table, the cores and the active scheme.
///
/// Every call handles one event to completion. Callers must deliver events
/// in non-decreasing time order.
pub struct SchedCore {
    pub ctx: KernelCtx,
    config: SchedConfig,
    observer: Observer,
}

impl SchedCore {
    pub fn start(num_cores: usize, scheme: Scheme) -> Result<Self, SchedError> {
        Self::with_config(num_cores, scheme, SchedConfig::default())
    }

    pub fn with_config(
        num_cores: usize,
        scheme: Scheme,
        config: SchedConfig,
    ) -> Result<Self, SchedError> {
        if num_cores == 0 {
            return Err(SchedError::NoCores);
        }
        debug!(cores = num_cores, %scheme, "scheduler start");
        Ok(Self {
            ctx: KernelCtx::new(num_cores, scheme),
            config,
            observer: Observer::new(),
        })
    }

    /// Returns the core the new job was seated on, if any.
    pub fn job_arrived(
        &mut self,
        job: JobId,
        time: Ticks,
        duration: Ticks,
        priority: Priority,
    ) -> Result<Option<CoreId>, SchedError> {
        self.advance_to(time);
        let key = self.ctx.insert_job(Job::new(job, time, duration, priority))?;

        scheduler::reschedule(&mut self.ctx, time);
        self.update_timings(time);
        self.finish_step();

        Ok(self.ctx.job(key).core_assigned)
    }

    /// Returns the job now occupying `core`, if any.
    pub fn job_finished(
        &mut self,
        core: CoreId,
        job: JobId,
        time: Ticks,
    ) -> Result<Option<JobId>, SchedError> {
        self.ctx.check_core(core)?;
        self.advance_to(time);

        let Some(key) = self.ctx.find_job(job) else {
            warn!(job, core, time, "completion for unknown job");
            return Ok(self.ctx.cores[core].current);
        };

        let never_ran = {
            let record = self.ctx.job(key);
            record.core_assigned.is_none() && record.schedule_latency.is_none()
        };
        if never_ran {
            warn!(job, core, time, "completion for a job that never ran");
            return Ok(self.ctx.cores[core].current);
        }

        let held = self.ctx.mark_finished(key, time);
        if held != Some(core) {
            warn!(
                job,
                core,
                ?held,
                time,
                "completion reported on a core that did not hold the job"
            );
            if self.ctx.cores[core].current == Some(job) {
                self.ctx.cores[core].current = None;
            }
        }
        debug!(job, core, time, "finished");
        self.ctx
            .events
            .push(SchedCoreEvent::Finished { job, core: held });

        self.update_timings(time);
        scheduler::reschedule(&mut self.ctx, time);
        self.update_timings(time);
        self.finish_step();

        Ok(self.ctx.cores[core].current)
    }

    /// Returns the job that should run on `core` next, if any.
    pub fn quantum_expired(
        &mut self,
        core: CoreId,
        time: Ticks,
    ) -> Result<Option<JobId>, SchedError> {
        self.ctx.check_core(core)?;

        if self.config.quantum_expiry == QuantumExpiry::Ignore {
            return Ok(None);
        }
        if self.ctx.scheme() != Scheme::Rr {
            return Ok(self.ctx.cores[core].current);
        }

        self.advance_to(time);
        self.update_timings(time);

        let running = self.ctx.cores[core]
            .current
            .and_then(|job| self.ctx.find_job(job).map(|key| (job, key)));
        if let Some((job, key)) = running {
            self.ctx.evict(key, time);
            self.ctx.queue.remove_all(&key);
            self.ctx.queue.offer(key, &self.ctx.jobs)?;
            debug!(job, core, time, "rotate");
            self.ctx.events.push(SchedCoreEvent::Rotated { job, core });
        }

        fill_idle_cores(&mut self.ctx);
        self.update_timings(time);
        self.finish_step();

        Ok(self.ctx.cores[core].current)
    }

    pub fn average_waiting_time(&self) -> Result<f64, SchedError> {
        stats::average_waiting_time(&self.ctx)
    }

    pub fn average_turnaround_time(&self) -> Result<f64, SchedError> {
        stats::average_turnaround_time(&self.ctx)
    }

    pub fn average_response_time(&self) -> Result<f64, SchedError> {
        stats::average_response_time(&self.ctx)
    }

    pub fn stats(&self) -> Result<RunStats, SchedError> {
        stats::run_stats(&self.ctx)
    }

    pub fn core_occupant(&self, core: CoreId) -> Option<JobId> {
        self.ctx.cores.get(core).and_then(|c| c.current)
    }

    pub fn core_count(&self) -> usize {
        self.ctx.cores.len()
    }

    pub fn scheme(&self) -> Scheme {
        self.ctx.scheme()
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.ctx.find_job(id).map(|key| self.ctx.job(key))
    }

    pub fn drain_events(&mut self) -> Vec<SchedCoreEvent> {
        std::mem::take(&mut self.ctx.events)
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        QueueSnapshot(
            self.ctx
                .queue
                .iter()
                .map(|&key| {
                    let job = self.ctx.job(key);
                    (job.id, job.core_assigned)
                })
                .collect(),
        )
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn shutdown(mut self) {
        debug!(
            jobs = self.ctx.jobs.len(),
            steps = self.observer.steps(),
            "scheduler shutdown"
        );
        self.ctx.queue.clear();
    }

    fn advance_to(&mut self, time: Ticks) {
        if time < self.ctx.now {
            warn!(time, now = self.ctx.now, "event time went backwards");
        }
        self.ctx.now = time;
    }

    fn update_timings(&mut self, time: Ticks) {
        self.ctx.update_timings(time);
        if self.ctx.scheme().reads_run_time() {
            self.ctx.resort_queue();
        }
    }

    fn finish_step(&mut self) {
        trace!(queue = %self.queue_snapshot(), "step");
        self.observer.observe(&self.ctx);
    }
}

/// Queue contents in order, as `id(core)` with `-1` for no core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot(pub Vec<(JobId, Option<CoreId>)>);

impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (job, core)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match core {
                Some(core) => write!(f, "{job}({core})")?,
                None => write!(f, "{job}(-1)")?,
            }
        }
        Ok(())
    }
}

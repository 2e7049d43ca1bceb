use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use super::event::SchedCoreEvent;
use super::queue::OrderedQueue;
use crate::error::SchedError;
use crate::scheduler::Scheme;

pub type JobId = u64;
pub type CoreId = usize;
pub type Ticks = u64;
pub type Priority = i32;

new_key_type! {
    pub struct JobKey;
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub duration: Ticks,
    // Lower value wins
    pub priority: Priority,
    pub core_assigned: Option<CoreId>,
    pub finished: bool,
    pub end_time: Option<Ticks>,
    // Arrival-relative: time - arrival_time at the last update while running
    pub time_run: Ticks,
    pub schedule_latency: Option<Ticks>,
}

impl Job {
    pub fn new(id: JobId, arrival_time: Ticks, duration: Ticks, priority: Priority) -> Self {
        Self {
            id,
            arrival_time,
            duration,
            priority,
            core_assigned: None,
            finished: false,
            end_time: None,
            time_run: 0,
            schedule_latency: None,
        }
    }

    pub fn remaining(&self) -> Ticks {
        self.duration.saturating_sub(self.time_run)
    }

    pub fn is_waiting(&self) -> bool {
        !self.finished && self.core_assigned.is_none()
    }

    pub fn is_running(&self) -> bool {
        !self.finished && self.core_assigned.is_some()
    }

    fn since_arrival(&self, now: Ticks) -> Ticks {
        now.saturating_sub(self.arrival_time)
    }
}

#[derive(Debug)]
pub struct CoreState {
    pub id: CoreId,
    pub current: Option<JobId>,
}

#[derive(Debug)]
pub struct KernelCtx {
    pub now: Ticks,
    pub cores: Vec<CoreState>,
    pub jobs: SlotMap<JobKey, Job>,
    pub by_id: FxHashMap<JobId, JobKey>,
    // Every job ever seen, finished ones included
    pub queue: OrderedQueue<JobKey, Scheme>,
    pub events: Vec<SchedCoreEvent>,
}

impl KernelCtx {
    pub fn new(num_cores: usize, scheme: Scheme) -> Self {
        Self {
            now: 0,
            cores: (0..num_cores)
                .map(|id| CoreState { id, current: None })
                .collect(),
            jobs: SlotMap::with_key(),
            by_id: FxHashMap::default(),
            queue: OrderedQueue::new(scheme),
            events: Vec::new(),
        }
    }

    pub fn scheme(&self) -> Scheme {
        *self.queue.comparator()
    }

    pub fn insert_job(&mut self, job: Job) -> Result<JobKey, SchedError> {
        if self.by_id.contains_key(&job.id) {
            return Err(SchedError::DuplicateJob(job.id));
        }

        let id = job.id;
        let key = self.jobs.insert(job);
        if let Err(err) = self.queue.offer(key, &self.jobs) {
            self.jobs.remove(key);
            return Err(err);
        }
        self.by_id.insert(id, key);
        Ok(key)
    }

    pub fn job(&self, key: JobKey) -> &Job {
        &self.jobs[key]
    }

    pub fn job_mut(&mut self, key: JobKey) -> &mut Job {
        &mut self.jobs[key]
    }

    pub fn find_job(&self, id: JobId) -> Option<JobKey> {
        self.by_id.get(&id).copied()
    }

    pub fn check_core(&self, core: CoreId) -> Result<(), SchedError> {
        if core < self.cores.len() {
            Ok(())
        } else {
            Err(SchedError::CoreOutOfRange {
                core,
                count: self.cores.len(),
            })
        }
    }

    pub fn pick_idle_core(&self) -> Option<CoreId> {
        self.cores
            .iter()
            .find(|core| core.current.is_none())
            .map(|core| core.id)
    }

    /// Queue position order snapshot, so passes can mutate jobs while walking it.
    pub fn queue_keys(&self) -> Vec<JobKey> {
        self.queue.iter().copied().collect()
    }

    pub fn assign(&mut self, core: CoreId, key: JobKey) {
        debug_assert!(
            self.cores[core].current.is_none(),
            "core {core} already running a job"
        );

        let job = &mut self.jobs[key];
        job.core_assigned = Some(core);
        self.cores[core].current = Some(job.id);
        self.events
            .push(SchedCoreEvent::Dispatched { job: job.id, core });
    }

    /// Take `key` off its core, recording arrival-relative run time.
    ///
    /// A job that is pulled off in the same tick it arrived never really
    /// started, so its first-dispatch latency is forgotten.
    pub fn evict(&mut self, key: JobKey, now: Ticks) -> Option<CoreId> {
        let job = &mut self.jobs[key];
        let core = job.core_assigned.take()?;
        job.time_run = job.since_arrival(now);
        if job.time_run == 0 {
            job.schedule_latency = None;
        }
        self.cores[core].current = None;
        Some(core)
    }

    pub fn mark_finished(&mut self, key: JobKey, now: Ticks) -> Option<CoreId> {
        let job = &mut self.jobs[key];
        let core = job.core_assigned.take();
        job.finished = true;
        job.end_time = Some(now);
        if let Some(core) = core {
            self.cores[core].current = None;
        }
        core
    }

    /// Refresh `time_run` of running jobs and of jobs that finished at `now`,
    /// and stamp the first-dispatch latency of newly seated jobs.
    pub fn update_timings(&mut self, now: Ticks) {
        for job in self.jobs.values_mut() {
            if job.core_assigned.is_some() || job.end_time == Some(now) {
                job.time_run = job.since_arrival(now);
            }
            if job.core_assigned.is_some() && job.schedule_latency.is_none() {
                job.schedule_latency = Some(job.since_arrival(now));
            }
        }
    }

    pub fn refresh_running(&mut self, now: Ticks) {
        for job in self.jobs.values_mut().filter(|j| j.is_running()) {
            job.time_run = job.since_arrival(now);
        }
    }

    pub fn resort_queue(&mut self) {
        self.queue.resort(&self.jobs);
    }

    pub fn queue_is_sorted(&self) -> bool {
        self.queue.is_sorted(&self.jobs)
    }
}

use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::job::{JobInstance, JobSpec};
use crate::{
    core::{CoreId, JobId, RunStats, SchedCore, SchedCoreEvent, Ticks},
    error::SchedError,
    scheduler::Scheme,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimEvent {
    // Variant order is the processing order within one tick
    Finish { core: CoreId, job: JobId },
    QuantumExpired { core: CoreId },
    Arrival { job: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Due {
    at: Ticks,
    event: SimEvent,
    seq: u64,
}

// KeyedPriorityQueue is a max-heap, so flip the order to pop the earliest first
impl Ord for Due {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.event, other.seq).cmp(&(self.at, self.event, self.seq))
    }
}

impl PartialOrd for Due {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct Step {
    pub time: Ticks,
    pub event: SimEvent,
    pub decisions: Vec<SchedCoreEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scheme: Scheme,
    pub cores: usize,
    pub quantum: Option<Ticks>,
    pub events: u64,
    pub preemptions: u64,
    pub rotations: u64,
    pub makespan: Ticks,
    pub max_response_time: Ticks,
    #[serde(flatten)]
    pub stats: RunStats,
}

// Feeds a job list through a `SchedCore` in simulated time. The driver owns
// the notion of work and turns core assignments into completion timers.
pub struct Sim {
    pub core: SchedCore,
    pub jobs: Vec<JobInstance>,
    timeline: KeyedPriorityQueue<u64, Due>,
    next_seq: u64,
    // JobId --> jobs[index]
    job_index: FxHashMap<JobId, usize>,
    // What the driver last saw on each core, and the timers armed for it
    running: Vec<Option<JobId>>,
    armed: Vec<Vec<u64>>,
    quantum: Option<Ticks>,
    now: Ticks,
    events: u64,
    preemptions: u64,
    rotations: u64,
}

impl Sim {
    pub fn new(mut jobs: Vec<JobSpec>, core: SchedCore, quantum: Option<Ticks>) -> Self {
        jobs.sort_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        let num_cores = core.core_count();
        let jobs: Vec<JobInstance> = jobs.into_iter().map(JobInstance::new).collect();
        let job_index = jobs
            .iter()
            .enumerate()
            .map(|(index, inst)| (inst.job.id, index))
            .collect();

        let mut sim = Self {
            core,
            jobs,
            timeline: KeyedPriorityQueue::new(),
            next_seq: 0,
            job_index,
            running: vec![None; num_cores],
            armed: vec![Vec::new(); num_cores],
            quantum: quantum.filter(|&q| q > 0),
            now: 0,
            events: 0,
            preemptions: 0,
            rotations: 0,
        };

        for index in 0..sim.jobs.len() {
            let at = sim.jobs[index].job.arrival_time;
            sim.schedule(at, SimEvent::Arrival { job: index });
        }
        sim
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.jobs.iter().all(JobInstance::completed)
    }

    /// Handle the next pending event. `None` once the timeline is empty.
    pub fn step(&mut self) -> Result<Option<Step>, SchedError> {
        let Some((seq, due)) = self.timeline.pop() else {
            return Ok(None);
        };
        self.now = due.at;
        self.events += 1;

        match due.event {
            SimEvent::Arrival { job } => {
                let spec = &self.jobs[job].job;
                self.core
                    .job_arrived(spec.id, spec.arrival_time, spec.run_time, spec.priority)?;
            }
            SimEvent::Finish { core, job } => {
                self.disarm(core);
                self.running[core] = None;
                if let Some(&index) = self.job_index.get(&job) {
                    let inst = &mut self.jobs[index];
                    inst.remaining = 0;
                    inst.running_since = None;
                    inst.completion_time = Some(due.at);
                }
                self.core.job_finished(core, job, due.at)?;
            }
            SimEvent::QuantumExpired { core } => {
                self.armed[core].retain(|&key| key != seq);
                self.core.quantum_expired(core, due.at)?;
            }
        }

        let decisions = self.core.drain_events();
        for decision in &decisions {
            match decision {
                SchedCoreEvent::Preempted { .. } => self.preemptions += 1,
                SchedCoreEvent::Rotated { .. } => self.rotations += 1,
                _ => {}
            }
        }
        self.reconcile();

        if let SimEvent::QuantumExpired { core } = due.event {
            // Same job kept the core: give it a fresh slice
            if self.running[core].is_some() && !self.has_quantum_armed(core) {
                self.arm_quantum(core);
            }
        }

        Ok(Some(Step {
            time: due.at,
            event: due.event,
            decisions,
        }))
    }

    pub fn run(&mut self) -> Result<(), SchedError> {
        while self.step()?.is_some() {}
        if !self.all_jobs_completed() {
            let stuck = self.jobs.iter().filter(|j| !j.completed()).count();
            warn!(stuck, now = self.now, "timeline drained with unfinished jobs");
        }
        Ok(())
    }

    pub fn report(&self) -> Result<Report, SchedError> {
        Ok(Report {
            scheme: self.core.scheme(),
            cores: self.core.core_count(),
            quantum: self.quantum,
            events: self.events,
            preemptions: self.preemptions,
            rotations: self.rotations,
            makespan: self
                .jobs
                .iter()
                .filter_map(|j| j.completion_time)
                .max()
                .unwrap_or(0),
            max_response_time: self
                .jobs
                .iter()
                .filter_map(JobInstance::response_time)
                .max()
                .unwrap_or(0),
            stats: self.core.stats()?,
        })
    }

    // Bring the driver's view of each core in line with the engine's.
    // Stop every displaced job before starting anything, since a job can
    // leave one core and land on another within the same event.
    fn reconcile(&mut self) {
        let now = self.now;
        let changed: Vec<(CoreId, Option<JobId>)> = (0..self.running.len())
            .filter_map(|core| {
                let occupant = self.core.core_occupant(core);
                (occupant != self.running[core]).then_some((core, occupant))
            })
            .collect();

        for &(core, _) in &changed {
            self.disarm(core);
            if let Some(job) = self.running[core].take() {
                if let Some(inst) = self.instance_mut(job) {
                    if let Some(since) = inst.running_since.take() {
                        inst.remaining = inst.remaining.saturating_sub(now - since);
                    }
                }
                debug!(job, core, time = now, "driver: stop");
            }
        }

        for &(core, occupant) in &changed {
            let Some(job) = occupant else {
                continue;
            };
            let Some(inst) = self.instance_mut(job) else {
                warn!(job, core, "engine seated a job the driver does not know");
                continue;
            };
            inst.running_since = Some(now);
            inst.start_time.get_or_insert(now);
            let finish_at = now.saturating_add(inst.remaining);

            self.running[core] = Some(job);
            debug!(job, core, time = now, finish_at, "driver: start");
            let key = self.schedule(finish_at, SimEvent::Finish { core, job });
            self.armed[core].push(key);
            self.arm_quantum(core);
        }
    }

    fn arm_quantum(&mut self, core: CoreId) {
        if self.core.scheme() != Scheme::Rr {
            return;
        }
        if let Some(quantum) = self.quantum {
            let at = self.now.saturating_add(quantum);
            let key = self.schedule(at, SimEvent::QuantumExpired { core });
            self.armed[core].push(key);
        }
    }

    fn has_quantum_armed(&self, core: CoreId) -> bool {
        self.armed[core].iter().any(|key| {
            matches!(
                self.timeline.get_priority(key),
                Some(Due {
                    event: SimEvent::QuantumExpired { .. },
                    ..
                })
            )
        })
    }

    fn disarm(&mut self, core: CoreId) {
        for key in self.armed[core].drain(..) {
            self.timeline.remove(&key);
        }
    }

    fn schedule(&mut self, at: Ticks, event: SimEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timeline.push(seq, Due { at, event, seq });
        seq
    }

    fn instance_mut(&mut self, job: JobId) -> Option<&mut JobInstance> {
        let index = *self.job_index.get(&job)?;
        self.jobs.get_mut(index)
    }
}

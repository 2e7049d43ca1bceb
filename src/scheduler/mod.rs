pub mod fill;
pub mod preempt;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use slotmap::SlotMap;

use crate::core::{Comparator, Job, JobKey, KernelCtx, Ticks};
use crate::error::SchedError;
pub use fill::fill_idle_cores;
pub use preempt::preempt_cores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scheme {
    Fcfs,
    Sjf,
    Psjf,
    Pri,
    Ppri,
    Rr,
}

impl Scheme {
    pub const ALL: [Scheme; 6] = [
        Scheme::Fcfs,
        Scheme::Sjf,
        Scheme::Psjf,
        Scheme::Pri,
        Scheme::Ppri,
        Scheme::Rr,
    ];

    pub fn is_preemptive(self) -> bool {
        matches!(self, Scheme::Psjf | Scheme::Ppri)
    }

    /// Ranking depends on `time_run`, which moves between events.
    pub fn reads_run_time(self) -> bool {
        matches!(self, Scheme::Psjf)
    }

    pub fn compare_jobs(self, a: &Job, b: &Job) -> Ordering {
        match self {
            Scheme::Fcfs => compare_fcfs(a, b),
            Scheme::Sjf => compare_sjf(a, b),
            Scheme::Psjf => compare_psjf(a, b),
            Scheme::Pri | Scheme::Ppri => compare_pri(a, b),
            Scheme::Rr => compare_rr(a, b),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Fcfs => "fcfs",
            Scheme::Sjf => "sjf",
            Scheme::Psjf => "psjf",
            Scheme::Pri => "pri",
            Scheme::Ppri => "ppri",
            Scheme::Rr => "rr",
        }
    }
}

impl Comparator<JobKey> for Scheme {
    type Store = SlotMap<JobKey, Job>;

    fn compare(&self, jobs: &Self::Store, a: &JobKey, b: &JobKey) -> Ordering {
        self.compare_jobs(&jobs[*a], &jobs[*b])
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchedError::UnknownScheme(s.to_string()))
    }
}

pub fn compare_fcfs(a: &Job, b: &Job) -> Ordering {
    a.arrival_time.cmp(&b.arrival_time)
}

pub fn compare_sjf(a: &Job, b: &Job) -> Ordering {
    a.duration
        .cmp(&b.duration)
        .then_with(|| compare_fcfs(a, b))
}

pub fn compare_psjf(a: &Job, b: &Job) -> Ordering {
    a.remaining()
        .cmp(&b.remaining())
        .then_with(|| compare_fcfs(a, b))
}

pub fn compare_pri(a: &Job, b: &Job) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| compare_fcfs(a, b))
}

// Newcomers always go to the back.
pub fn compare_rr(_a: &Job, _b: &Job) -> Ordering {
    Ordering::Greater
}

pub fn reschedule(ctx: &mut KernelCtx, now: Ticks) {
    if ctx.scheme().is_preemptive() {
        preempt_cores(ctx, now);
    } else {
        fill_idle_cores(ctx);
    }
}

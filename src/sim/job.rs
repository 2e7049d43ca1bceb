use crate::core::{JobId, Priority, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub run_time: Ticks,
    pub priority: Priority,
}

/// Driver-side record of one job: how much work is left and when it ran.
#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: JobSpec,
    pub remaining: Ticks,
    pub running_since: Option<Ticks>,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl JobInstance {
    pub fn new(job: JobSpec) -> Self {
        Self {
            remaining: job.run_time,
            job,
            running_since: None,
            start_time: None,
            completion_time: None,
        }
    }

    // Arrival to first dispatch, as seen by the driver
    pub fn response_time(&self) -> Option<Ticks> {
        self.start_time
            .map(|start| start.saturating_sub(self.job.arrival_time))
    }

    pub fn completed(&self) -> bool {
        self.completion_time.is_some()
    }
}

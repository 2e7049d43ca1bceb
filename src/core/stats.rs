use average::{Estimate, Mean};
use serde::Serialize;

use super::state::{Job, KernelCtx};
use crate::error::SchedError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunStats {
    pub jobs: usize,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
    pub average_response_time: f64,
}

fn turnaround(job: &Job) -> f64 {
    let end = job.end_time.unwrap_or(job.arrival_time);
    end as f64 - job.arrival_time as f64
}

// Means over every job, only once all of them have finished
fn mean_over(ctx: &KernelCtx, f: impl Fn(&Job) -> f64) -> Result<f64, SchedError> {
    if ctx.jobs.is_empty() {
        return Err(SchedError::EmptyRun);
    }
    let unfinished = ctx.jobs.values().filter(|j| !j.finished).count();
    if unfinished > 0 {
        return Err(SchedError::RunIncomplete(unfinished));
    }

    let mean: Mean = ctx.jobs.values().map(f).collect();
    Ok(mean.estimate())
}

pub fn average_waiting_time(ctx: &KernelCtx) -> Result<f64, SchedError> {
    mean_over(ctx, |job| turnaround(job) - job.duration as f64)
}

pub fn average_turnaround_time(ctx: &KernelCtx) -> Result<f64, SchedError> {
    mean_over(ctx, turnaround)
}

pub fn average_response_time(ctx: &KernelCtx) -> Result<f64, SchedError> {
    mean_over(ctx, |job| job.schedule_latency.unwrap_or(0) as f64)
}

pub fn run_stats(ctx: &KernelCtx) -> Result<RunStats, SchedError> {
    Ok(RunStats {
        jobs: ctx.jobs.len(),
        average_waiting_time: average_waiting_time(ctx)?,
        average_turnaround_time: average_turnaround_time(ctx)?,
        average_response_time: average_response_time(ctx)?,
    })
}

use std::collections::TryReserveError;

use thiserror::Error;

use crate::core::{CoreId, JobId};

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("scheduler requires at least one core")]
    NoCores,

    #[error("core {core} out of range ({count} cores)")]
    CoreOutOfRange { core: CoreId, count: usize },

    #[error("job {0} already arrived")]
    DuplicateJob(JobId),

    #[error("statistics requested for a run with no jobs")]
    EmptyRun,

    #[error("statistics requested while {0} jobs are unfinished")]
    RunIncomplete(usize),

    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    #[error("trace line {line}: {reason}")]
    Trace { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

use serde::Serialize;

use crate::core::{CoreId, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedCoreEvent {
    Dispatched {
        job: JobId,
        core: CoreId,
    },
    // `job` lost `core` to `by`
    Preempted {
        job: JobId,
        core: CoreId,
        by: JobId,
    },
    Finished {
        job: JobId,
        core: Option<CoreId>,
    },
    // Quantum ran out; job went to the back of the queue
    Rotated {
        job: JobId,
        core: CoreId,
    },
}

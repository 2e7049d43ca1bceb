pub mod driver;
pub mod event;
pub mod observer;
pub mod queue;
pub mod state;
pub mod stats;

pub use driver::{QuantumExpiry, QueueSnapshot, SchedConfig, SchedCore};
pub use event::SchedCoreEvent;
pub use queue::{Comparator, OrderedQueue};
pub use state::{CoreId, CoreState, Job, JobId, JobKey, KernelCtx, Priority, Ticks};
pub use stats::RunStats;

pub mod driver;
pub mod job;
pub mod trace;
pub mod workload;

pub use driver::{Report, Sim, SimEvent, Step};
pub use job::{JobInstance, JobSpec};
pub use trace::{load_trace, parse_trace};
pub use workload::BernoulliWorkload;

pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use crate::core::{QuantumExpiry, SchedConfig, SchedCore, SchedCoreEvent};
pub use error::SchedError;
pub use scheduler::Scheme;
pub use sim::{JobSpec, Sim};

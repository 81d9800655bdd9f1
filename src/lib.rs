pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use config::{PolicyKind, Quantum, SimConfig};
pub use crate::core::SchedCoreEvent;
pub use error::{SimError, SimResult};
pub use scheduler::{RequeueOrder, Scheduler};
pub use sim::{Process, ProcessInstance, Report, ReportRow, Sim, run_policy, simulate};

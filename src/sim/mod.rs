pub mod driver;
pub mod process;
pub mod report;
pub mod workload;

pub use driver::{Sim, SimOutcome, SimStats, run_policy, simulate};
pub use process::{Process, ProcessId, ProcessInstance};
pub use report::{Report, ReportRow};
pub use workload::BernoulliWorkload;

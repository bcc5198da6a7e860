//! Decision scheduler: background loops and the synchronous decision path.
//!
//! - **search sweep**: periodically re-searches monitored items
//! - **rss sync**: matches recent feed releases against monitored items
//! - **pending grabs**: promotes deferred grabs once their delay elapses

mod config;
mod guard;
mod runner;
mod types;

pub use config::SchedulerConfig;
pub use guard::{TaskGuard, TaskPermit};
pub use runner::Scheduler;
pub use types::{
    DecisionOutcome, DecisionReport, SchedulerError, SchedulerStatus, StorageMonitor,
    TASK_PENDING, TASK_RSS, TASK_SEARCH,
};

//! Weekplan: week-keyed task storage with hour tracking and burnout metrics.
//!
//! Tasks belong to a day of an ISO-8601 week and carry an hour estimate and a
//! completion flag. The crate stores them in SQLite and derives a weekly
//! workload picture from them.
//!
//! # Architecture
//!
//! - **Week keys**: ISO week arithmetic and `YYYY-Www` keys ([`week`])
//! - **Model**: tasks, provisional vs stored ids, per-day buckets ([`task`])
//! - **Storage**: the [`store::TaskStore`] trait and its SQLite backend
//! - **Assembly**: stored rows shaped into seven day buckets ([`assemble`])
//! - **Metrics**: totals, burnout risk, productivity score ([`metrics`])
//! - **Facade**: [`planner::Planner`], the entry point for a UI
//! - **Host bridge**: newline-delimited JSON over stdio ([`host`])

pub mod assemble;
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod planner;
pub mod planner_dirs;
pub mod store;
pub mod task;
pub mod week;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use metrics::{BurnoutRisk, WeekMetrics};
pub use planner::{Clock, FixedClock, Planner, SystemClock};
pub use store::{SqliteTaskStore, TaskStore};
pub use task::{Day, Task, TaskId, WeeklyData};
pub use week::WeekKey;

//! The planner facade: the narrow set of operations the presentation layer
//! and the host bridge call into.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assemble::assemble;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::metrics::{CompletedTask, DaySummary, WeekMetrics, completed_tasks, day_summaries};
use crate::store::{SqliteTaskStore, TaskStore};
use crate::task::{Day, Task, TaskId, WeeklyData};
use crate::week::{WeekKey, format_week_range};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for week derivation, pending task tokens and stored
/// timestamps.
pub trait Clock: Send + Sync {
    /// Today's date in the user's local time zone.
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub millis: u64,
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> u64 {
        self.millis
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Everything the planner screen needs for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekOverview {
    pub week: WeekKey,
    /// Display label such as `30.06 - 06.07.2025`.
    pub range: String,
    pub data: WeeklyData,
    pub metrics: WeekMetrics,
    pub days: Vec<DaySummary>,
    pub completed: Vec<CompletedTask>,
}

/// Process and storage details for troubleshooting. Not part of the data
/// model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub db_path: Option<PathBuf>,
    pub portable_dir: Option<String>,
    pub portable_file: Option<String>,
    pub cwd: Option<PathBuf>,
    pub exec_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub version: String,
    pub schema_version: Option<u32>,
    pub current_week: WeekKey,
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Entry point for reading and mutating the weekly plan.
pub struct Planner<S: TaskStore = SqliteTaskStore> {
    store: S,
    clock: Box<dyn Clock>,
}

impl Planner<SqliteTaskStore> {
    /// Open the store configured in `config`.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened; the planner cannot serve
    /// anything without it.
    pub fn open(config: &PlannerConfig) -> Result<Self> {
        let path = config.storage.resolved_db_path();
        let planner = Self::new(SqliteTaskStore::open(&path)?);
        if config.storage.seed_demo_week {
            planner.store.seed_demo_week(planner.stamp())?;
        }
        Ok(planner)
    }
}

impl<S: TaskStore> Planner<S> {
    /// Wrap `store` using the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    pub fn with_clock(store: S, clock: impl Clock + 'static) -> Self {
        Self {
            store,
            clock: Box::new(clock),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key of the week containing today.
    #[must_use]
    pub fn current_week(&self) -> WeekKey {
        WeekKey::containing(self.clock.today())
    }

    /// The current week's tasks, creating the week row on first access.
    pub fn weekly_data(&self) -> Result<WeeklyData> {
        self.current_week_data().map(|(_, data)| data)
    }

    /// The current week's key together with its tasks. Both come from a
    /// single reading of the clock.
    pub fn current_week_data(&self) -> Result<(WeekKey, WeeklyData)> {
        let week = self.store.ensure_current_week(self.clock.today())?;
        let data = assemble(&self.store, &week.key)?;
        Ok((week.key, data))
    }

    /// Tasks of the week containing `date`. Does not create the week.
    pub fn weekly_data_by_date(&self, date: NaiveDate) -> Result<WeeklyData> {
        assemble(&self.store, &WeekKey::containing(date))
    }

    /// Tasks plus derived statistics for the week containing `date`.
    pub fn week_overview(&self, date: NaiveDate) -> Result<WeekOverview> {
        let week = WeekKey::containing(date);
        let data = assemble(&self.store, &week)?;
        Ok(WeekOverview {
            week,
            range: format_week_range(&week),
            metrics: WeekMetrics::compute(&data),
            days: day_summaries(&data),
            completed: completed_tasks(&data),
            data,
        })
    }

    /// A new task with a pending identifier, ready to be shown and saved.
    #[must_use]
    pub fn new_task(&self, text: &str) -> Task {
        Task::draft(self.clock.now_millis(), text)
    }

    /// Save `task` on `day` of `week`, defaulting to the current week.
    ///
    /// The returned id is authoritative; use it for every later call.
    pub fn save_task(&self, week: Option<WeekKey>, day: Day, task: Task) -> Result<Task> {
        let week = week.unwrap_or_else(|| self.current_week());
        self.store.save(&week, day, task, self.stamp())
    }

    /// Save a day's tasks in order. See [`TaskStore::save_day`].
    pub fn save_day(&self, week: Option<WeekKey>, day: Day, tasks: Vec<Task>) -> Result<Vec<Task>> {
        let week = week.unwrap_or_else(|| self.current_week());
        self.store.save_day(&week, day, tasks, self.stamp())
    }

    pub fn delete_task(&self, id: TaskId) -> Result<()> {
        self.store.delete(id)
    }

    /// Database file backing the store.
    #[must_use]
    pub fn db_path(&self) -> Option<PathBuf> {
        self.store.location().map(|p| p.to_path_buf())
    }

    #[must_use]
    pub fn debug_info(&self) -> DebugInfo {
        let env_string = |name: &str| std::env::var_os(name).map(|v| v.to_string_lossy().into_owned());
        DebugInfo {
            db_path: self.db_path(),
            portable_dir: env_string("PORTABLE_EXECUTABLE_DIR"),
            portable_file: env_string("PORTABLE_EXECUTABLE_FILE"),
            cwd: std::env::current_dir().ok(),
            exec_path: std::env::current_exe().ok(),
            data_dir: crate::planner_dirs::data_dir(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            schema_version: match self.store.schema_version() {
                Ok(version) => version,
                Err(e) => {
                    tracing::warn!(error = %e, "schema version unavailable");
                    None
                }
            },
            current_week: self.current_week(),
        }
    }

    /// Timestamp for rows written now.
    fn stamp(&self) -> i64 {
        i64::try_from(self.clock.now_millis()).unwrap_or(i64::MAX)
    }

    /// Release the store.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}

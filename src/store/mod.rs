//! Week-keyed task storage.
//!
//! Sub-modules:
//! - `schema`: SQLite DDL definitions.
//! - `sqlite`: SQLite-backed [`SqliteTaskStore`].
//!
//! Callers depend on the [`TaskStore`] trait; the concrete backend is picked
//! once at startup.

pub(crate) mod schema;
pub mod sqlite;

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{PlannerError, Result};
use crate::task::{Day, Task, TaskId, TaskRecord, Week};
use crate::week::WeekKey;

pub use sqlite::SqliteTaskStore;

/// Persistent storage for weeks and their tasks.
pub trait TaskStore: Send + Sync {
    /// Return the row for `key`, creating it with the week's Monday as start
    /// date if it does not exist yet. A concurrent duplicate insert is not an
    /// error.
    fn ensure_week(&self, key: &WeekKey) -> Result<Week>;

    /// Return the row for `key` without creating it.
    fn find_week(&self, key: &WeekKey) -> Result<Option<Week>>;

    /// All tasks of the week, Monday first, then in insertion order.
    fn load_tasks(&self, key: &WeekKey) -> Result<Vec<TaskRecord>>;

    /// Insert or update a task, stamping it with `now_millis`.
    ///
    /// A `Persisted` id that matches a stored row updates `day`, `text`,
    /// `hours`, `completed`, and `updated_at` in place. Anything else is
    /// inserted under `week` and `day` with both timestamps set to
    /// `now_millis`. The returned task matches what a later load yields.
    fn save(&self, week: &WeekKey, day: Day, task: Task, now_millis: i64) -> Result<Task>;

    /// Remove a task. Unknown and pending ids are a silent no-op.
    fn delete(&self, id: TaskId) -> Result<()>;

    /// Location of the backing file, if any.
    fn location(&self) -> Option<&Path>;

    /// Schema version recorded in the backing storage, if it keeps one.
    fn schema_version(&self) -> Result<Option<u32>> {
        Ok(None)
    }

    /// Flush and release the backing storage.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Ensure the row for the week containing `today` exists.
    fn ensure_current_week(&self, today: NaiveDate) -> Result<Week> {
        self.ensure_week(&WeekKey::containing(today))
    }

    /// Save a day's tasks one at a time, in order.
    ///
    /// There is no rollback. If task `k` fails, tasks before it stay
    /// persisted and the error carries both halves so the caller can retry
    /// the remainder.
    fn save_day(
        &self,
        week: &WeekKey,
        day: Day,
        tasks: Vec<Task>,
        now_millis: i64,
    ) -> Result<Vec<Task>> {
        let mut saved = Vec::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            match self.save(week, day, task.clone(), now_millis) {
                Ok(stored) => saved.push(stored),
                Err(e) => {
                    tracing::warn!(
                        week = %week,
                        day = %day,
                        saved = i,
                        total = tasks.len(),
                        error = %e,
                        "day save stopped partway"
                    );
                    return Err(PlannerError::PartialSave {
                        saved,
                        unsaved: tasks[i..].to_vec(),
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(saved)
    }
}

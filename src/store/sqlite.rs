//! SQLite-backed task store.
//!
//! A single database file holds the `weeks` and `tasks` tables. The
//! connection sits behind a `Mutex`, so one writer at a time is the only
//! concurrency model supported.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};

use super::schema::{apply_schema, read_schema_version};
use super::TaskStore;
use crate::error::{PlannerError, Result};
use crate::task::{Day, Task, TaskId, TaskRecord, Week};
use crate::week::WeekKey;

/// Week used by [`SqliteTaskStore::seed_demo_week`].
const DEMO_WEEK_KEY: &str = "2025-W27";

const DEMO_TASKS: &[(Day, &str, f64, bool)] = &[
    (Day::Monday, "Visit the Queen 👑", 2.5, true),
    (Day::Tuesday, "Walk through Jurassic Park 🦕", 4.0, true),
    (Day::Wednesday, "Feed the T-Rex 🦖", 1.5, false),
    (Day::Thursday, "Repair the time machine ⏰", 3.0, true),
    (Day::Friday, "Train the velociraptors 🦘", 2.0, true),
    (Day::Saturday, "Negotiate with aliens 👽", 1.0, false),
];

/// Orders rows Monday first regardless of how the day names sort as text.
const DAY_ORDER_SQL: &str = "CASE t.day \
     WHEN 'monday' THEN 0 WHEN 'tuesday' THEN 1 WHEN 'wednesday' THEN 2 \
     WHEN 'thursday' THEN 3 WHEN 'friday' THEN 4 WHEN 'saturday' THEN 5 \
     ELSE 6 END";

/// SQLite-backed implementation of [`TaskStore`].
pub struct SqliteTaskStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Open (or create) the database file at `path`, creating parent
    /// directories and applying the schema.
    ///
    /// Failure here is fatal for the planner: nothing can be served without
    /// storage.
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |reason: String| PlannerError::Storage {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        apply_schema(&conn).map_err(|e| unavailable(e.to_string()))?;

        tracing::info!(path = %path.display(), "opened task store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Create the demo week with a handful of sample tasks.
    ///
    /// Tasks are only inserted when the demo week has none, so calling this
    /// repeatedly does not duplicate them.
    pub fn seed_demo_week(&self, now_millis: i64) -> Result<Week> {
        let key = WeekKey::parse(DEMO_WEEK_KEY)?;
        let conn = self.lock()?;
        let week = ensure_week_row(&conn, &key)?;

        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE week_id = ?1",
            params![week.id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            tracing::debug!(week = %key, existing, "demo week already seeded");
            return Ok(week);
        }

        let tx = conn.unchecked_transaction()?;
        for (day, text, hours, completed) in DEMO_TASKS {
            tx.execute(
                "INSERT INTO tasks (week_id, day, text, hours, completed, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![week.id, day.as_str(), text, hours, completed, now_millis],
            )?;
        }
        tx.commit()?;

        tracing::info!(week = %key, tasks = DEMO_TASKS.len(), "seeded demo week");
        Ok(week)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Acquire the connection mutex.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PlannerError::Lock(e.to_string()))
    }
}

impl TaskStore for SqliteTaskStore {
    fn ensure_week(&self, key: &WeekKey) -> Result<Week> {
        let conn = self.lock()?;
        Ok(ensure_week_row(&conn, key)?)
    }

    fn find_week(&self, key: &WeekKey) -> Result<Option<Week>> {
        let conn = self.lock()?;
        Ok(find_week_row(&conn, key)?)
    }

    fn load_tasks(&self, key: &WeekKey) -> Result<Vec<TaskRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT t.id, t.day, t.text, t.hours, t.completed, t.created_at, t.updated_at \
             FROM tasks t JOIN weeks w ON w.id = t.week_id \
             WHERE w.week_key = ?1 \
             ORDER BY {DAY_ORDER_SQL}, t.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![key.to_string()], |row| row_to_record(row, *key))?;

        let mut records = Vec::new();
        for r in rows {
            records.push(r?);
        }
        Ok(records)
    }

    fn save(&self, week: &WeekKey, day: Day, task: Task, now_millis: i64) -> Result<Task> {
        task.validate()?;
        let conn = self.lock()?;

        if let TaskId::Persisted(id) = task.id {
            let created_at: Option<i64> = conn
                .query_row(
                    "UPDATE tasks SET day = ?1, text = ?2, hours = ?3, completed = ?4, updated_at = ?5 \
                     WHERE id = ?6 RETURNING created_at",
                    params![day.as_str(), task.text, task.hours, task.completed, now_millis, id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(created_at) = created_at {
                tracing::debug!(task_id = id, day = %day, "updated task");
                return Ok(Task {
                    created_at: Some(created_at),
                    updated_at: Some(now_millis),
                    ..task
                });
            }
            tracing::debug!(task_id = id, "persisted id has no row; inserting instead");
        }

        let week_row = ensure_week_row(&conn, week)?;
        conn.execute(
            "INSERT INTO tasks (week_id, day, text, hours, completed, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                week_row.id,
                day.as_str(),
                task.text,
                task.hours,
                task.completed,
                now_millis
            ],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!(
            previous_id = %task.id,
            task_id = id,
            week = %week,
            day = %day,
            "inserted task"
        );
        Ok(Task {
            id: TaskId::Persisted(id),
            created_at: Some(now_millis),
            updated_at: Some(now_millis),
            ..task
        })
    }

    fn delete(&self, id: TaskId) -> Result<()> {
        let TaskId::Persisted(id) = id else {
            tracing::debug!(task_id = %id, "delete of pending task ignored");
            return Ok(());
        };
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        tracing::debug!(task_id = id, removed = rows, "deleted task");
        Ok(())
    }

    fn schema_version(&self) -> Result<Option<u32>> {
        let conn = self.lock()?;
        Ok(read_schema_version(&conn)?)
    }

    fn location(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| PlannerError::Lock(e.to_string()))?;
        conn.close().map_err(|(_, e)| PlannerError::Sqlite(e))?;
        tracing::info!("task store closed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Week rows
// ---------------------------------------------------------------------------

fn find_week_row(conn: &Connection, key: &WeekKey) -> rusqlite::Result<Option<Week>> {
    conn.query_row(
        "SELECT id, week_key, start_date FROM weeks WHERE week_key = ?1",
        params![key.to_string()],
        row_to_week,
    )
    .optional()
}

fn ensure_week_row(conn: &Connection, key: &WeekKey) -> rusqlite::Result<Week> {
    if let Some(week) = find_week_row(conn, key)? {
        return Ok(week);
    }

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO weeks (week_key, start_date) VALUES (?1, ?2)",
        params![key.to_string(), key.monday().format("%Y-%m-%d").to_string()],
    )?;
    if inserted > 0 {
        tracing::info!(week = %key, start_date = %key.monday(), "created week");
    }

    conn.query_row(
        "SELECT id, week_key, start_date FROM weeks WHERE week_key = ?1",
        params![key.to_string()],
        row_to_week,
    )
}

// ---------------------------------------------------------------------------
// Row conversion helpers
// ---------------------------------------------------------------------------

fn row_to_week(row: &rusqlite::Row<'_>) -> rusqlite::Result<Week> {
    let key_str: String = row.get(1)?;
    let start_str: String = row.get(2)?;

    let key = WeekKey::parse(&key_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Week {
        id: row.get(0)?,
        key,
        start_date,
    })
}

fn row_to_record(row: &rusqlite::Row<'_>, week: WeekKey) -> rusqlite::Result<TaskRecord> {
    let day_str: String = row.get(1)?;
    let day = day_str
        .parse::<Day>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(TaskRecord {
        week,
        day,
        task: Task {
            id: TaskId::Persisted(row.get(0)?),
            text: row.get(2)?,
            hours: row.get(3)?,
            completed: row.get(4)?,
            created_at: Some(row.get(5)?),
            updated_at: Some(row.get(6)?),
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Task, week, and weekly view types shared by the store, assembler, and
//! metrics.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::week::WeekKey;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Bare numeric ids at or above this value were generated by a client clock
/// (milliseconds since the epoch) and have never been persisted.
pub const LEGACY_PENDING_THRESHOLD: i64 = 1_000_000_000_000;

/// Upper bound of the hour slider in the planner UI.
pub const MAX_TASK_HOURS: f64 = 12.0;

// ---------------------------------------------------------------------------
// Day
// ---------------------------------------------------------------------------

/// Day of the week a task is planned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in canonical order, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Wire and storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Position in the week, Monday = 0.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day a calendar date falls on.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlannerError::InvalidTask(format!("unknown day: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Task identifier.
///
/// A task typed into the UI gets a `Pending` client token so it can be shown
/// before it is stored. Saving it yields a `Persisted` id assigned by the
/// store, which the caller must use from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "WireTaskId")]
pub enum TaskId {
    Pending(u64),
    Persisted(i64),
}

impl TaskId {
    /// Classify a bare numeric id sent by an older client.
    #[must_use]
    pub fn from_legacy(raw: i64) -> Self {
        if raw >= LEGACY_PENDING_THRESHOLD || raw <= 0 {
            Self::Pending(raw.unsigned_abs())
        } else {
            Self::Persisted(raw)
        }
    }

    /// Store id, if this task has been persisted.
    #[must_use]
    pub fn persisted(self) -> Option<i64> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Pending(_) => None,
        }
    }

    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(token) => write!(f, "pending:{token}"),
            Self::Persisted(id) => write!(f, "{id}"),
        }
    }
}

/// Accepted wire forms: `{"pending": n}`, `{"persisted": n}`, or a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireTaskId {
    Legacy(i64),
    Tagged(TaggedTaskId),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedTaskId {
    Pending(u64),
    Persisted(i64),
}

impl From<WireTaskId> for TaskId {
    fn from(wire: WireTaskId) -> Self {
        match wire {
            WireTaskId::Legacy(raw) => Self::from_legacy(raw),
            WireTaskId::Tagged(TaggedTaskId::Pending(token)) => Self::Pending(token),
            WireTaskId::Tagged(TaggedTaskId::Persisted(id)) => Self::Persisted(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A unit of planned work with the hours spent on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub hours: f64,
    #[serde(default)]
    pub completed: bool,
    /// Epoch milliseconds, set by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Epoch milliseconds, set by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Task {
    /// A freshly typed task: one hour, not completed, pending identifier.
    #[must_use]
    pub fn draft(token: u64, text: impl Into<String>) -> Self {
        Self {
            id: TaskId::Pending(token),
            text: text.into().trim().to_owned(),
            hours: 1.0,
            completed: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Reject tasks the store must never hold.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.text.trim().is_empty() {
            return Err(PlannerError::InvalidTask("text must not be empty".to_owned()));
        }
        if !self.hours.is_finite() || self.hours < 0.0 {
            return Err(PlannerError::InvalidTask(format!(
                "hours must be a non-negative number, got {}",
                self.hours
            )));
        }
        Ok(())
    }
}

/// Clamp an hour value to the planner's slider range `[0, 12]`.
#[must_use]
pub fn clamp_hours(hours: f64) -> f64 {
    if hours.is_nan() {
        return 0.0;
    }
    hours.clamp(0.0, MAX_TASK_HOURS)
}

/// A task as loaded from storage, with its owning week and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub week: WeekKey,
    pub day: Day,
    #[serde(flatten)]
    pub task: Task,
}

/// A stored week row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: i64,
    pub key: WeekKey,
    pub start_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Weekly view
// ---------------------------------------------------------------------------

/// Tasks planned for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTasks {
    pub tasks: Vec<Task>,
}

impl DayTasks {
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.tasks.iter().map(|t| t.hours).sum()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

/// Per-day projection of one week's tasks. Every day is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyData {
    pub monday: DayTasks,
    pub tuesday: DayTasks,
    pub wednesday: DayTasks,
    pub thursday: DayTasks,
    pub friday: DayTasks,
    pub saturday: DayTasks,
    pub sunday: DayTasks,
}

impl WeeklyData {
    #[must_use]
    pub fn day(&self, day: Day) -> &DayTasks {
        match day {
            Day::Monday => &self.monday,
            Day::Tuesday => &self.tuesday,
            Day::Wednesday => &self.wednesday,
            Day::Thursday => &self.thursday,
            Day::Friday => &self.friday,
            Day::Saturday => &self.saturday,
            Day::Sunday => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, day: Day) -> &mut DayTasks {
        match day {
            Day::Monday => &mut self.monday,
            Day::Tuesday => &mut self.tuesday,
            Day::Wednesday => &mut self.wednesday,
            Day::Thursday => &mut self.thursday,
            Day::Friday => &mut self.friday,
            Day::Saturday => &mut self.saturday,
            Day::Sunday => &mut self.sunday,
        }
    }

    /// Days in canonical order with their tasks.
    pub fn iter(&self) -> impl Iterator<Item = (Day, &DayTasks)> {
        Day::ALL.into_iter().map(move |d| (d, self.day(d)))
    }

    /// Every task of the week, Monday first.
    pub fn tasks(&self) -> impl Iterator<Item = (Day, &Task)> {
        self.iter()
            .flat_map(|(d, bucket)| bucket.tasks.iter().map(move |t| (d, t)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, bucket)| bucket.tasks.is_empty())
    }
}

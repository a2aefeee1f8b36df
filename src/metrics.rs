//! Workload and burnout statistics for one assembled week.
//!
//! Everything here is a pure function of [`WeeklyData`]; nothing touches
//! storage.

use serde::{Deserialize, Serialize};

use crate::task::{Day, Task, WeeklyData};

/// Days longer than this many hours push the risk to [`BurnoutRisk::Medium`].
pub const MEDIUM_RISK_HOURS: f64 = 8.0;

/// Days longer than this many hours push the risk to [`BurnoutRisk::High`].
pub const HIGH_RISK_HOURS: f64 = 10.0;

/// Productivity points lost per hour above [`MEDIUM_RISK_HOURS`] on the
/// heaviest day.
const OVERLOAD_PENALTY_PER_HOUR: f64 = 10.0;

const COMPLETION_WEIGHT: f64 = 0.7;
const BALANCE_WEIGHT: f64 = 0.3;

/// Classification of the week's heaviest day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnoutRisk {
    Low,
    Medium,
    High,
}

impl BurnoutRisk {
    /// Risk for a given heaviest-day load. Both thresholds are exclusive.
    #[must_use]
    pub fn from_max_day_hours(hours: f64) -> Self {
        if hours > HIGH_RISK_HOURS {
            Self::High
        } else if hours > MEDIUM_RISK_HOURS {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Headline shown next to the risk level.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Low => "🌱 Healthy balance!",
            Self::Medium => "⚠️ Careful, don't overload yourself",
            Self::High => "🚨 Burnout danger!",
        }
    }

    /// Short follow-up advice.
    #[must_use]
    pub fn advice(self) -> &'static str {
        match self {
            Self::Low => "Keep it up!",
            Self::Medium => "Cut back if you can",
            Self::High => "Schedule breaks!",
        }
    }
}

/// Derived statistics for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_hours: f64,
    pub completed_hours: f64,
    /// Hours per day, Monday first.
    pub daily_hours: [f64; 7],
    pub max_day_hours: f64,
    /// Always `total_hours / 7`, regardless of how many days have work.
    pub avg_day_hours: f64,
    pub active_days: usize,
    pub burnout_risk: BurnoutRisk,
    /// Percentage of tasks completed, 0 for an empty week.
    pub completion_rate: u32,
    /// 0–100 blend of completion and overload penalty, 0 for an empty week.
    pub productivity_score: u32,
}

impl WeekMetrics {
    #[must_use]
    pub fn compute(data: &WeeklyData) -> Self {
        let mut daily_hours = [0.0_f64; 7];
        let mut total_tasks = 0;
        let mut completed_tasks = 0;
        let mut completed_hours = 0.0;

        for (day, task) in data.tasks() {
            daily_hours[day.index()] += task.hours;
            total_tasks += 1;
            if task.completed {
                completed_tasks += 1;
                completed_hours += task.hours;
            }
        }

        let total_hours: f64 = daily_hours.iter().sum();
        let max_day_hours = daily_hours.iter().copied().fold(0.0_f64, f64::max);
        let active_days = daily_hours.iter().filter(|h| **h > 0.0).count();

        let completion_rate = if total_tasks == 0 {
            0
        } else {
            round_half_up(completed_tasks as f64 / total_tasks as f64 * 100.0)
        };

        let productivity_score = if total_tasks == 0 {
            0
        } else {
            let overload = (max_day_hours - MEDIUM_RISK_HOURS).max(0.0);
            let balance = (100.0 - overload * OVERLOAD_PENALTY_PER_HOUR).max(0.0);
            round_half_up(
                f64::from(completion_rate) * COMPLETION_WEIGHT + balance * BALANCE_WEIGHT,
            )
        };

        Self {
            total_tasks,
            completed_tasks,
            total_hours,
            completed_hours,
            daily_hours,
            max_day_hours,
            avg_day_hours: total_hours / 7.0,
            active_days,
            burnout_risk: BurnoutRisk::from_max_day_hours(max_day_hours),
            completion_rate,
            productivity_score,
        }
    }

    /// Hours logged on `day`.
    #[must_use]
    pub fn hours_on(&self, day: Day) -> f64 {
        self.daily_hours[day.index()]
    }
}

/// Load summary for one day column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: Day,
    pub tasks: usize,
    pub completed: usize,
    pub hours: f64,
}

/// Per-day summaries, Monday first.
#[must_use]
pub fn day_summaries(data: &WeeklyData) -> Vec<DaySummary> {
    data.iter()
        .map(|(day, bucket)| DaySummary {
            day,
            tasks: bucket.tasks.len(),
            completed: bucket.completed_count(),
            hours: bucket.total_hours(),
        })
        .collect()
}

/// A completed task together with the day it was planned on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub day: Day,
    #[serde(flatten)]
    pub task: Task,
}

/// Every completed task of the week, Monday first.
#[must_use]
pub fn completed_tasks(data: &WeeklyData) -> Vec<CompletedTask> {
    data.tasks()
        .filter(|(_, t)| t.completed)
        .map(|(day, t)| CompletedTask {
            day,
            task: t.clone(),
        })
        .collect()
}

/// Round to the nearest integer with halves going up, like JavaScript's
/// `Math.round`.
fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().max(0.0) as u32
}

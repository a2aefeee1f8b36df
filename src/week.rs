//! ISO-8601 week identification.
//!
//! Every week key in the planner is computed here. A key has the form
//! `YYYY-Www`, where the year is the calendar year of the week's Thursday,
//! not of the date that was passed in. That is what makes 2024-12-30 belong to
//! `2025-W01` and 2021-01-03 belong to `2020-W53`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Canonical identifier of an ISO-8601 calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    year: i32,
    week: u32,
    monday: NaiveDate,
}

impl WeekKey {
    /// Week key of the week containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let monday = week_start(date);
        let thursday = monday + TimeDelta::days(3);
        let year = thursday.year();

        let jan1 = thursday - TimeDelta::days(i64::from(thursday.ordinal0()));
        let to_thursday = (3 + 7 - i64::from(jan1.weekday().num_days_from_monday())) % 7;
        let first_thursday = jan1 + TimeDelta::days(to_thursday);

        // Both ends are Thursdays, so the ceiling is exact.
        let elapsed = (thursday - first_thursday).num_days();
        let week = 1 + (elapsed + 6) / 7;

        Self {
            year,
            week: week as u32,
            monday,
        }
    }

    /// Parse a `YYYY-Www` key, rejecting weeks the ISO year does not have.
    pub fn parse(raw: &str) -> Result<Self, PlannerError> {
        let invalid = || PlannerError::InvalidWeekKey(raw.to_owned());

        let (year_part, week_part) = raw.trim().split_once("-W").ok_or_else(invalid)?;
        let digits =
            |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(year_part, 4) || !digits(week_part, 2) {
            return Err(invalid());
        }
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let week: u32 = week_part.parse().map_err(|_| invalid())?;

        // January 4th always falls in week 1.
        let jan4 = NaiveDate::from_ymd_opt(year, 1, 4).ok_or_else(invalid)?;
        let week_one = Self::containing(jan4);
        if week == 0 || week > weeks_in_year(year).ok_or_else(invalid)? {
            return Err(invalid());
        }

        Ok(Self {
            year,
            week,
            monday: week_one.monday + TimeDelta::weeks(i64::from(week - 1)),
        })
    }

    /// ISO year (the year of this week's Thursday).
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// ISO week number, 1 through 52 or 53.
    #[must_use]
    pub fn week(&self) -> u32 {
        self.week
    }

    /// Date of this week's Monday.
    #[must_use]
    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// The seven dates of this week, Monday first.
    #[must_use]
    pub fn days(&self) -> [NaiveDate; 7] {
        std::array::from_fn(|i| self.monday + TimeDelta::days(i as i64))
    }

    /// The week before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::containing(self.monday - TimeDelta::weeks(1))
    }

    /// The week after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::containing(self.monday + TimeDelta::weeks(1))
    }

    /// Whether `date` falls inside this week.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        week_start(date) == self.monday
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> Self {
        key.to_string()
    }
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Number of ISO weeks in `year` (52 or 53), `None` outside chrono's range.
#[must_use]
pub fn weeks_in_year(year: i32) -> Option<u32> {
    // December 28th always falls in the last week of its ISO year.
    NaiveDate::from_ymd_opt(year, 12, 28).map(|d| WeekKey::containing(d).week)
}

/// Human-readable range label, e.g. `30.06 - 06.07.2025`.
#[must_use]
pub fn format_week_range(key: &WeekKey) -> String {
    let days = key.days();
    format!(
        "{} - {}",
        days[0].format("%d.%m"),
        days[6].format("%d.%m.%Y")
    )
}

//! Shapes stored task rows into the per-day [`WeeklyData`] view.

use crate::error::Result;
use crate::store::TaskStore;
use crate::task::{TaskRecord, WeeklyData};
use crate::week::WeekKey;

/// Load the week `key` and bucket its tasks by day.
///
/// A week with no row yields seven empty days. The week is not created here;
/// that is the caller's job via [`TaskStore::ensure_week`].
pub fn assemble<S: TaskStore + ?Sized>(store: &S, key: &WeekKey) -> Result<WeeklyData> {
    if store.find_week(key)?.is_none() {
        tracing::debug!(week = %key, "no week row; returning empty week");
        return Ok(WeeklyData::default());
    }
    let records = store.load_tasks(key)?;
    tracing::debug!(week = %key, tasks = records.len(), "assembled week");
    Ok(bucket(records))
}

/// Group records by day, keeping their relative order.
#[must_use]
pub fn bucket(records: impl IntoIterator<Item = TaskRecord>) -> WeeklyData {
    let mut data = WeeklyData::default();
    for record in records {
        data.day_mut(record.day).tasks.push(record.task);
    }
    data
}

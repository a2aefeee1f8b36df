//! Routes host command envelopes to the [`Planner`].

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::error::{PlannerError, Result};
use crate::host::contract::{CONTRACT_VERSION, CommandEnvelope, CommandName, ResponseEnvelope};
use crate::planner::Planner;
use crate::store::TaskStore;
use crate::task::{Day, Task, TaskId};
use crate::week::WeekKey;

/// Synchronous command router. One instance serves the whole bridge.
pub struct CommandRouter<S: TaskStore> {
    planner: Planner<S>,
}

impl<S: TaskStore> CommandRouter<S> {
    #[must_use]
    pub fn new(planner: Planner<S>) -> Self {
        Self { planner }
    }

    pub fn planner(&self) -> &Planner<S> {
        &self.planner
    }

    /// Validate and route `envelope`, turning every failure into an error
    /// response so the channel never goes silent.
    #[must_use]
    pub fn dispatch(&self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        if let Err(e) = envelope.validate() {
            tracing::warn!(request_id = %envelope.request_id, error = %e, "rejected envelope");
            return ResponseEnvelope::error(envelope.request_id.clone(), e.to_string());
        }

        match self.route(envelope) {
            Ok(response) => response,
            Err(PlannerError::PartialSave {
                saved,
                unsaved,
                source,
            }) => {
                let message = format!(
                    "saved {} of {} tasks before failure: {source}",
                    saved.len(),
                    saved.len() + unsaved.len()
                );
                tracing::warn!(request_id = %envelope.request_id, %message, "partial day save");
                ResponseEnvelope::error_with_payload(
                    envelope.request_id.clone(),
                    message,
                    serde_json::json!({ "saved": saved, "unsaved": unsaved }),
                )
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %envelope.request_id,
                    command = envelope.command.as_str(),
                    error = %e,
                    "host command failed"
                );
                ResponseEnvelope::error(envelope.request_id.clone(), e.to_string())
            }
        }
    }

    /// Route a command envelope to the appropriate handler.
    pub fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        tracing::debug!(
            request_id = %envelope.request_id,
            command = envelope.command.as_str(),
            "routing host command"
        );
        let payload = match envelope.command {
            CommandName::HostPing => serde_json::json!({"pong": true}),
            CommandName::HostVersion => serde_json::json!({
                "contract_version": CONTRACT_VERSION,
                "version": env!("CARGO_PKG_VERSION"),
            }),
            CommandName::HostStop => serde_json::json!({"accepted": true}),
            CommandName::WeekGet => self.handle_week_get()?,
            CommandName::WeekGetByDate => self.handle_week_get_by_date(&envelope.payload)?,
            CommandName::WeekOverview => self.handle_week_overview(&envelope.payload)?,
            CommandName::TaskNew => self.handle_task_new(&envelope.payload)?,
            CommandName::TaskSave => self.handle_task_save(&envelope.payload)?,
            CommandName::TaskSaveDay => self.handle_task_save_day(&envelope.payload)?,
            CommandName::TaskDelete => self.handle_task_delete(&envelope.payload)?,
            CommandName::DbPath => serde_json::json!({"path": self.planner.db_path()}),
            CommandName::DebugInfo => serde_json::to_value(self.planner.debug_info())?,
        };
        Ok(ResponseEnvelope::ok(envelope.request_id.clone(), payload))
    }

    fn handle_week_get(&self) -> Result<serde_json::Value> {
        let (week, data) = self.planner.current_week_data()?;
        Ok(serde_json::json!({ "week": week, "data": data }))
    }

    fn handle_week_get_by_date(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let date = parse_date(payload, "week.get_by_date")?;
        let data = self.planner.weekly_data_by_date(date)?;
        Ok(serde_json::json!({ "week": WeekKey::containing(date), "data": data }))
    }

    fn handle_week_overview(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let date = match payload.get("date") {
            None | Some(serde_json::Value::Null) => self.planner.current_week().monday(),
            Some(_) => parse_date(payload, "week.overview")?,
        };
        Ok(serde_json::to_value(self.planner.week_overview(date)?)?)
    }

    fn handle_task_new(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let text = payload
            .get("text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        Ok(serde_json::to_value(self.planner.new_task(text))?)
    }

    fn handle_task_save(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let week = parse_optional_week(payload)?;
        let day = parse_day(payload, "task.save")?;
        let task: Task = parse_field(payload, "task", "task.save")?;
        let saved = self.planner.save_task(week, day, task)?;
        Ok(serde_json::to_value(saved)?)
    }

    fn handle_task_save_day(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let week = parse_optional_week(payload)?;
        let day = parse_day(payload, "task.save_day")?;
        let tasks: Vec<Task> = parse_field(payload, "tasks", "task.save_day")?;
        let saved = self.planner.save_day(week, day, tasks)?;
        Ok(serde_json::json!({ "tasks": saved }))
    }

    fn handle_task_delete(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let id: TaskId = parse_field(payload, "id", "task.delete")?;
        self.planner.delete_task(id)?;
        Ok(serde_json::json!({ "accepted": true, "id": id }))
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

fn parse_field<T: DeserializeOwned>(
    payload: &serde_json::Value,
    field: &str,
    command: &str,
) -> Result<T> {
    let Some(raw) = payload.get(field) else {
        return Err(PlannerError::InvalidPayload(format!(
            "{command} requires payload.{field}"
        )));
    };
    serde_json::from_value(raw.clone()).map_err(|e| {
        PlannerError::InvalidPayload(format!("{command} payload.{field} is malformed: {e}"))
    })
}

fn parse_day(payload: &serde_json::Value, command: &str) -> Result<Day> {
    let Some(raw) = payload.get("day").and_then(serde_json::Value::as_str) else {
        return Err(PlannerError::InvalidPayload(format!(
            "{command} requires payload.day"
        )));
    };
    raw.parse()
}

fn parse_date(payload: &serde_json::Value, command: &str) -> Result<NaiveDate> {
    let Some(raw) = payload.get("date").and_then(serde_json::Value::as_str) else {
        return Err(PlannerError::InvalidPayload(format!(
            "{command} requires payload.date (YYYY-MM-DD)"
        )));
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        PlannerError::InvalidPayload(format!("{command} payload.date `{raw}`: {e}"))
    })
}

fn parse_optional_week(payload: &serde_json::Value) -> Result<Option<WeekKey>> {
    match payload.get("week") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(raw)) => WeekKey::parse(raw).map(Some),
        Some(_) => Err(PlannerError::InvalidPayload(
            "payload.week must be a string like 2025-W27".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::planner::{Clock, FixedClock};
    use crate::store::SqliteTaskStore;

    fn make_router() -> CommandRouter<SqliteTaskStore> {
        let clock = FixedClock {
            today: NaiveDate::from_ymd_opt(2025, 7, 2).expect("date"),
            millis: 1_750_000_000_000,
        };
        let store = SqliteTaskStore::open_in_memory().expect("store");
        CommandRouter::new(Planner::with_clock(store, clock))
    }

    fn make_envelope(command: CommandName, payload: serde_json::Value) -> CommandEnvelope {
        CommandEnvelope::new("test-req-1", command, payload)
    }

    #[test]
    fn ping_pongs() {
        let resp = make_router().dispatch(&make_envelope(CommandName::HostPing, serde_json::json!({})));
        assert!(resp.ok);
        assert_eq!(resp.payload["pong"], true);
        assert_eq!(resp.request_id, "test-req-1");
    }

    #[test]
    fn week_get_returns_seven_days_for_current_week() {
        let resp = make_router().dispatch(&make_envelope(CommandName::WeekGet, serde_json::Value::Null));
        assert!(resp.ok, "{:?}", resp.error);
        assert_eq!(resp.payload["week"], "2025-W27");
        for day in Day::ALL {
            assert!(resp.payload["data"][day.as_str()]["tasks"].is_array());
        }
    }

    /// Steps one day forward on every `today()` call.
    struct MidnightClock {
        start: NaiveDate,
        reads: AtomicU64,
    }

    impl Clock for MidnightClock {
        fn today(&self) -> NaiveDate {
            let step = self.reads.fetch_add(1, Ordering::SeqCst);
            self.start + chrono::Days::new(step)
        }

        fn now_millis(&self) -> u64 {
            1_750_000_000_000
        }
    }

    #[test]
    fn week_get_reports_the_week_its_data_belongs_to() {
        // Sunday of 2025-W27; the next read lands in W28.
        let start = NaiveDate::from_ymd_opt(2025, 7, 6).expect("date");
        let store = SqliteTaskStore::open_in_memory().expect("store");
        store
            .save(
                &WeekKey::containing(start),
                Day::Sunday,
                Task::draft(1, "late shift"),
                1_750_000_000_000,
            )
            .expect("save");
        let clock = MidnightClock {
            start,
            reads: AtomicU64::new(0),
        };
        let router = CommandRouter::new(Planner::with_clock(store, clock));

        let resp = router.dispatch(&make_envelope(CommandName::WeekGet, serde_json::json!({})));
        assert!(resp.ok, "{:?}", resp.error);
        assert_eq!(resp.payload["week"], "2025-W27");
        assert_eq!(
            resp.payload["data"]["sunday"]["tasks"]
                .as_array()
                .expect("sunday tasks")
                .len(),
            1
        );
    }

    #[test]
    fn save_with_legacy_provisional_id_then_update() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSave,
            serde_json::json!({
                "day": "monday",
                "task": {"id": 1_750_000_000_000_i64, "text": "Write report", "hours": 2.0}
            }),
        ));
        assert!(resp.ok, "{:?}", resp.error);
        let id = resp.payload["id"].clone();
        assert!(id["persisted"].is_i64());

        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSave,
            serde_json::json!({
                "day": "monday",
                "task": {"id": id, "text": "Write report", "hours": 3.0, "completed": true}
            }),
        ));
        assert!(resp.ok, "{:?}", resp.error);
        assert_eq!(resp.payload["id"], id);

        let week = router.planner().weekly_data().expect("load");
        assert_eq!(week.monday.tasks.len(), 1);
        assert_eq!(week.monday.tasks[0].hours, 3.0);
        assert!(week.monday.tasks[0].completed);
    }

    #[test]
    fn save_into_explicit_week() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSave,
            serde_json::json!({
                "week": "2025-W30",
                "day": "friday",
                "task": {"id": {"pending": 1}, "text": "Ship", "hours": 1.5}
            }),
        ));
        assert!(resp.ok, "{:?}", resp.error);

        let date = NaiveDate::from_ymd_opt(2025, 7, 25).expect("date");
        let data = router.planner().weekly_data_by_date(date).expect("load");
        assert_eq!(data.friday.tasks.len(), 1);
    }

    #[test]
    fn delete_accepts_legacy_and_tagged_ids() {
        let router = make_router();
        let saved = router
            .planner()
            .save_task(None, Day::Tuesday, router.planner().new_task("gone"))
            .expect("save");
        let raw = saved.id.persisted().expect("persisted");

        let resp = router.dispatch(&make_envelope(
            CommandName::TaskDelete,
            serde_json::json!({"id": raw}),
        ));
        assert!(resp.ok, "{:?}", resp.error);
        assert!(router.planner().weekly_data().expect("load").tuesday.tasks.is_empty());

        let resp = router.dispatch(&make_envelope(
            CommandName::TaskDelete,
            serde_json::json!({"id": {"persisted": raw}}),
        ));
        assert!(resp.ok, "double delete is fine");
    }

    #[test]
    fn get_by_date_requires_a_valid_date() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(CommandName::WeekGetByDate, serde_json::json!({})));
        assert!(!resp.ok);
        assert!(resp.error.expect("message").contains("payload.date"));

        let resp = router.dispatch(&make_envelope(
            CommandName::WeekGetByDate,
            serde_json::json!({"date": "2025-13-01"}),
        ));
        assert!(!resp.ok);

        let resp = router.dispatch(&make_envelope(
            CommandName::WeekGetByDate,
            serde_json::json!({"date": "2025-01-01"}),
        ));
        assert!(resp.ok);
        assert_eq!(resp.payload["week"], "2025-W01");
    }

    #[test]
    fn invalid_day_and_week_are_rejected() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSave,
            serde_json::json!({"day": "funday", "task": {"id": 1, "text": "x", "hours": 1.0}}),
        ));
        assert!(!resp.ok);

        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSave,
            serde_json::json!({"week": "2025-27", "day": "monday", "task": {"id": 1, "text": "x", "hours": 1.0}}),
        ));
        assert!(!resp.ok);
    }

    #[test]
    fn overview_defaults_to_current_week() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(CommandName::WeekOverview, serde_json::json!({})));
        assert!(resp.ok, "{:?}", resp.error);
        assert_eq!(resp.payload["week"], "2025-W27");
        assert_eq!(resp.payload["range"], "30.06 - 06.07.2025");
        assert_eq!(resp.payload["metrics"]["burnout_risk"], "low");
    }

    #[test]
    fn save_day_reconciles_ids() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSaveDay,
            serde_json::json!({
                "day": "wednesday",
                "tasks": [
                    {"id": {"pending": 1}, "text": "a", "hours": 1.0},
                    {"id": {"pending": 2}, "text": "b", "hours": 2.0}
                ]
            }),
        ));
        assert!(resp.ok, "{:?}", resp.error);
        let tasks = resp.payload["tasks"].as_array().expect("tasks");
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t["id"]["persisted"].is_i64()));
    }

    #[test]
    fn save_day_partial_failure_reports_both_halves() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(
            CommandName::TaskSaveDay,
            serde_json::json!({
                "day": "wednesday",
                "tasks": [
                    {"id": {"pending": 1}, "text": "ok", "hours": 1.0},
                    {"id": {"pending": 2}, "text": "   ", "hours": 1.0},
                    {"id": {"pending": 3}, "text": "never", "hours": 1.0}
                ]
            }),
        ));
        assert!(!resp.ok);
        assert_eq!(resp.payload["saved"].as_array().expect("saved").len(), 1);
        assert_eq!(resp.payload["unsaved"].as_array().expect("unsaved").len(), 2);
    }

    #[test]
    fn bad_version_is_rejected_before_routing() {
        let mut envelope = make_envelope(CommandName::HostPing, serde_json::json!({}));
        envelope.v = 9;
        let resp = make_router().dispatch(&envelope);
        assert!(!resp.ok);
        assert!(resp.error.expect("message").contains("version"));
    }

    #[test]
    fn db_path_and_debug_info() {
        let router = make_router();
        let resp = router.dispatch(&make_envelope(CommandName::DbPath, serde_json::json!({})));
        assert!(resp.ok);
        assert!(resp.payload["path"].is_null());

        let resp = router.dispatch(&make_envelope(CommandName::DebugInfo, serde_json::json!({})));
        assert!(resp.ok);
        assert_eq!(resp.payload["current_week"], "2025-W27");
        assert_eq!(resp.payload["schema_version"], 1);
    }

    #[test]
    fn task_new_hands_out_pending_draft() {
        let resp = make_router().dispatch(&make_envelope(
            CommandName::TaskNew,
            serde_json::json!({"text": "Stretch"}),
        ));
        assert!(resp.ok);
        assert_eq!(resp.payload["id"]["pending"], 1_750_000_000_000_u64);
        assert_eq!(resp.payload["hours"], 1.0);
    }
}

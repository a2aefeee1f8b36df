#![allow(clippy::unwrap_used, clippy::expect_used)]

use weekplan::host::contract::{
    CONTRACT_VERSION, CommandEnvelope, CommandName, ContractErrorKind, ResponseEnvelope,
};
use weekplan::{Task, TaskId};

#[test]
fn command_name_parse_known_and_unknown() {
    assert_eq!(CommandName::parse("week.get"), Some(CommandName::WeekGet));
    assert_eq!(
        CommandName::parse("week.get_by_date"),
        Some(CommandName::WeekGetByDate)
    );
    assert_eq!(CommandName::parse("task.save"), Some(CommandName::TaskSave));
    assert_eq!(CommandName::parse("task.delete"), Some(CommandName::TaskDelete));
    assert_eq!(CommandName::parse("db.path"), Some(CommandName::DbPath));
    assert_eq!(CommandName::parse("debug.info"), Some(CommandName::DebugInfo));
    assert!(CommandName::parse("week.not_real").is_none());

    assert_eq!(CommandName::WeekOverview.as_str(), "week.overview");
    assert_eq!(CommandName::TaskSaveDay.as_str(), "task.save_day");
}

#[test]
fn command_envelope_wire_shape() {
    let envelope = CommandEnvelope::new(
        "req-7",
        CommandName::TaskDelete,
        serde_json::json!({"id": {"persisted": 12}}),
    );
    let value = serde_json::to_value(&envelope).expect("serialize");
    assert_eq!(value["v"], CONTRACT_VERSION);
    assert_eq!(value["command"], "task.delete");
    assert_eq!(value["payload"]["id"]["persisted"], 12);

    let parsed: CommandEnvelope = serde_json::from_value(value).expect("deserialize");
    assert_eq!(parsed, envelope);
    assert!(parsed.validate().is_ok());
}

#[test]
fn unknown_command_fails_to_parse_as_envelope() {
    let raw = r#"{"v":1,"request_id":"x","command":"runtime.start","payload":{}}"#;
    assert!(serde_json::from_str::<CommandEnvelope>(raw).is_err());
}

#[test]
fn envelope_validation_errors() {
    let mut envelope = CommandEnvelope::new("r", CommandName::HostPing, serde_json::json!({}));
    envelope.v = CONTRACT_VERSION + 1;
    assert_eq!(
        envelope.validate().expect_err("version").kind,
        ContractErrorKind::UnsupportedVersion
    );

    let envelope = CommandEnvelope::new("", CommandName::HostPing, serde_json::json!({}));
    assert_eq!(
        envelope.validate().expect_err("empty id").kind,
        ContractErrorKind::InvalidEnvelope
    );
}

#[test]
fn response_envelope_roundtrip_json() {
    let resp = ResponseEnvelope::ok("req-1", serde_json::json!({"pong": true}));
    let json = serde_json::to_string(&resp).expect("serialize");
    let parsed: ResponseEnvelope = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, resp);
}

#[test]
fn task_ids_accept_tagged_and_legacy_forms() {
    let legacy_pending: Task =
        serde_json::from_str(r#"{"id":1750000000000,"text":"a","hours":1}"#).expect("legacy");
    assert_eq!(legacy_pending.id, TaskId::Pending(1_750_000_000_000));
    assert!(!legacy_pending.completed);

    let legacy_stored: Task =
        serde_json::from_str(r#"{"id":42,"text":"a","hours":1}"#).expect("legacy row id");
    assert_eq!(legacy_stored.id, TaskId::Persisted(42));

    let tagged: Task =
        serde_json::from_str(r#"{"id":{"pending":7},"text":"a","hours":1}"#).expect("tagged");
    assert_eq!(tagged.id, TaskId::Pending(7));

    let out = serde_json::to_value(&legacy_stored).expect("serialize");
    assert_eq!(out["id"]["persisted"], 42);
}

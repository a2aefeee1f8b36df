//! Versioned command/response envelopes for the planner host channel.

use serde::{Deserialize, Serialize};

/// Contract version for host command/response envelopes.
pub const CONTRACT_VERSION: u32 = 1;

/// Commands understood by the host bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.version")]
    HostVersion,
    #[serde(rename = "host.stop")]
    HostStop,
    #[serde(rename = "week.get")]
    WeekGet,
    #[serde(rename = "week.get_by_date")]
    WeekGetByDate,
    #[serde(rename = "week.overview")]
    WeekOverview,
    #[serde(rename = "task.new")]
    TaskNew,
    #[serde(rename = "task.save")]
    TaskSave,
    #[serde(rename = "task.save_day")]
    TaskSaveDay,
    #[serde(rename = "task.delete")]
    TaskDelete,
    #[serde(rename = "db.path")]
    DbPath,
    #[serde(rename = "debug.info")]
    DebugInfo,
}

impl CommandName {
    pub const ALL: [Self; 12] = [
        Self::HostPing,
        Self::HostVersion,
        Self::HostStop,
        Self::WeekGet,
        Self::WeekGetByDate,
        Self::WeekOverview,
        Self::TaskNew,
        Self::TaskSave,
        Self::TaskSaveDay,
        Self::TaskDelete,
        Self::DbPath,
        Self::DebugInfo,
    ];

    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::HostVersion => "host.version",
            Self::HostStop => "host.stop",
            Self::WeekGet => "week.get",
            Self::WeekGetByDate => "week.get_by_date",
            Self::WeekOverview => "week.overview",
            Self::TaskNew => "task.new",
            Self::TaskSave => "task.save",
            Self::TaskSaveDay => "task.save_day",
            Self::TaskDelete => "task.delete",
            Self::DbPath => "db.path",
            Self::DebugInfo => "debug.info",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

/// A versioned response envelope from host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::error_with_payload(request_id, message, serde_json::Value::Null)
    }

    /// Error response that still carries data, e.g. the part of a batch
    /// that was saved before the failure.
    #[must_use]
    pub fn error_with_payload(
        request_id: impl Into<String>,
        message: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload,
            error: Some(message.into()),
        }
    }
}

/// A versioned command envelope from frontend -> host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != CONTRACT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, CONTRACT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn command_names_round_trip_through_wire_format() {
        for command in CommandName::ALL {
            assert_eq!(CommandName::parse(command.as_str()), Some(command));
            let json = serde_json::to_string(&command).expect("serialize");
            assert_eq!(json, format!("\"{}\"", command.as_str()));
        }
        assert_eq!(CommandName::parse("runtime.start"), None);
    }

    #[test]
    fn envelope_without_payload_defaults_to_null() {
        let envelope: CommandEnvelope =
            serde_json::from_str(r#"{"v":1,"request_id":"r1","command":"week.get"}"#)
                .expect("parse");
        assert_eq!(envelope.command, CommandName::WeekGet);
        assert!(envelope.payload.is_null());
    }

    #[test]
    fn validate_rejects_wrong_version() {
        let mut envelope = CommandEnvelope::new("r1", CommandName::HostPing, serde_json::json!({}));
        envelope.v = 2;
        let err = envelope.validate().expect_err("version 2 must fail");
        assert_eq!(err.kind, ContractErrorKind::UnsupportedVersion);
    }

    #[test]
    fn validate_rejects_blank_request_id() {
        let envelope = CommandEnvelope::new("  ", CommandName::HostPing, serde_json::json!({}));
        let err = envelope.validate().expect_err("blank id must fail");
        assert_eq!(err.kind, ContractErrorKind::InvalidEnvelope);
        assert!(err.to_string().contains("request_id"));
    }

    #[test]
    fn error_envelope_shape() {
        let resp = ResponseEnvelope::error("r1", "boom");
        assert!(!resp.ok);
        assert_eq!(resp.v, CONTRACT_VERSION);
        assert!(resp.payload.is_null());
        assert_eq!(resp.error.as_deref(), Some("boom"));
    }
}

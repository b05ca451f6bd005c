//! Access log records.
//!
//! Each [`AccessEvent`] drained from the controller becomes one
//! [`AccessLogRecord`]: the event plus the device id, a timestamp and the
//! door state at the time it was logged. Records serialize to JSON with
//! camelCase keys, the shape the cloud log expects.

use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use thermogate_access::AccessEvent;

/// Door solenoid state as reported in logs and on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorState {
    Locked,
    /// Solenoid energised, door can be opened
    Unlocking,
}

impl DoorState {
    pub fn from_solenoid(energised: bool) -> Self {
        if energised {
            Self::Unlocking
        } else {
            Self::Locked
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Unlocking => "UNLOCKING",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the access log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogRecord {
    pub timestamp: String,
    pub device_id: String,
    pub user_id: String,
    pub display_name: String,
    /// `GRANTED`, `DENIED`, `LOCKOUT` or `INFO`
    pub result: String,
    pub reason: String,
    pub failed_count: u8,
    /// Wall-clock lockout end, 0 when not applicable
    pub lockout_until: u64,
    pub door_state: DoorState,
}

impl AccessLogRecord {
    /// Build a record. Events without a user are logged as `unknown` /
    /// `Unknown`.
    pub fn from_event(
        event: &AccessEvent,
        device_id: &str,
        timestamp: String,
        door_state: DoorState,
    ) -> Self {
        let user_id = event
            .user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or("unknown");
        let display_name = event
            .display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown");

        Self {
            timestamp,
            device_id: device_id.to_string(),
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            result: event.result().to_string(),
            reason: event.reason().to_string(),
            failed_count: event.failed_count,
            lockout_until: event.lockout_until_epoch.unwrap_or(0),
            door_state,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// ISO-8601 timestamp (`2024-05-01T13:45:00`, UTC) for a log record.
///
/// Before the wall clock has been set at all the monotonic milliseconds are
/// used instead, so records stay ordered.
pub fn log_timestamp(unix_secs: u64, now_ms: u64) -> String {
    i64::try_from(unix_secs)
        .ok()
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || now_ms.to_string(),
            |time| time.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )
}

//! Telemetry screen shown while the keypad menu is idle.
//!
//! ```text
//! 01/05/2024 13:45:00
//! T:26.5C H:41.0%
//! F1:ON  F2:OFF NORM
//! D:LOCKED READY
//! ```

use chrono::DateTime;
use thermogate_hardware::SensorReading;
use thermogate_ui::Screen;

use crate::access_log::DoorState;
use crate::thermal::FanState;

/// Wall-clock times before 2016-01-01 mean the clock was never synced.
const CLOCK_SYNCED_AFTER_UNIX_SECS: u64 = 1_451_606_400;

/// Everything the telemetry screen shows.
#[derive(Debug, Clone)]
pub struct StatusSnapshot<'a> {
    pub unix_secs: u64,
    pub reading: SensorReading,
    pub fans: FanState,
    pub door: DoorState,
    pub access_message: &'a str,
    /// Whole seconds left when a keypad lockout is active
    pub lockout_remaining_secs: Option<u64>,
}

pub fn monitoring_screen(status: &StatusSnapshot<'_>) -> Screen {
    let climate = if status.reading.valid {
        format!(
            "T:{:4.1}C H:{:4.1}%",
            status.reading.temperature_c, status.reading.humidity
        )
    } else {
        "T:---- H:----".to_string()
    };

    let security = match status.lockout_remaining_secs {
        Some(secs) => format!("D:{} LCK {secs}s", status.door),
        None => format!("D:{} {}", status.door, status.access_message),
    };

    Screen::new(
        clock_row(status.unix_secs),
        climate,
        status.fans.to_string(),
        security,
    )
}

fn clock_row(unix_secs: u64) -> String {
    if unix_secs < CLOCK_SYNCED_AFTER_UNIX_SECS {
        return "SYNCING TIME".to_string();
    }
    i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || "SYNCING TIME".to_string(),
            |time| time.format("%d/%m/%Y %H:%M:%S").to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(reading: SensorReading) -> StatusSnapshot<'static> {
        StatusSnapshot {
            unix_secs: 1_700_000_000,
            reading,
            fans: FanState {
                fan1: true,
                fan2: false,
                warning: false,
            },
            door: DoorState::Locked,
            access_message: "READY",
            lockout_remaining_secs: None,
        }
    }

    #[test]
    fn test_main_screen_rows() {
        let screen = monitoring_screen(&snapshot(SensorReading::new(26.54, 41.0)));

        assert_eq!(
            screen.rows(),
            &[
                "14/11/2023 22:13:20".to_string(),
                "T:26.5C H:41.0%".to_string(),
                "F1:ON  F2:OFF NORM".to_string(),
                "D:LOCKED READY".to_string(),
            ]
        );
    }

    #[test]
    fn test_single_digit_values_are_padded() {
        let screen = monitoring_screen(&snapshot(SensorReading::new(5.0, 9.3)));
        assert_eq!(screen.row(1), Some("T: 5.0C H: 9.3%"));
    }

    #[test]
    fn test_invalid_reading() {
        let screen = monitoring_screen(&snapshot(SensorReading::invalid()));
        assert_eq!(screen.row(1), Some("T:---- H:----"));
    }

    #[test]
    fn test_lockout_replaces_message() {
        let mut status = snapshot(SensorReading::invalid());
        status.lockout_remaining_secs = Some(97);
        status.door = DoorState::Unlocking;

        let screen = monitoring_screen(&status);
        assert_eq!(screen.row(3), Some("D:UNLOCKING LCK 97s"));
    }

    #[test]
    fn test_unsynced_clock() {
        let mut status = snapshot(SensorReading::invalid());
        status.unix_secs = 42;
        assert_eq!(monitoring_screen(&status).row(0), Some("SYNCING TIME"));
    }
}

//! Status line texts published by the access controller.
//!
//! The orchestrator shows [`AccessController::last_message`] on the status
//! row of the 20x4 display, so every message fits in 20 ASCII columns.
//!
//! [`AccessController::last_message`]: crate::AccessController::last_message

/// Status messages for keypad access control.
pub struct StatusMessages;

impl StatusMessages {
    /// Shown at power-up before any key is pressed
    pub const READY: &'static str = "READY";

    /// `*` pressed while typing a PIN
    pub const INPUT_CLEARED: &'static str = "INPUT CLEARED";

    /// Submitted buffer was not 4-8 digits
    pub const PIN_INVALID: &'static str = "PIN INVALID";

    pub const ACCESS_GRANTED: &'static str = "ACCESS GRANTED";

    pub const ACCESS_DENIED: &'static str = "ACCESS DENIED";

    /// Failure threshold reached
    pub const LOCKOUT_ACTIVE: &'static str = "LOCKOUT ACTIVE";

    pub const LOCKOUT_ENDED: &'static str = "LOCKOUT ENDED";

    /// Countdown shown when a key is pressed during lockout, e.g. `LOCKED 97s`.
    pub fn locked(remaining_secs: u64) -> String {
        format!("LOCKED {remaining_secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermogate_core::constants::LCD_COLS;

    #[test]
    fn test_messages_fit_status_row() {
        let messages = [
            StatusMessages::READY,
            StatusMessages::INPUT_CLEARED,
            StatusMessages::PIN_INVALID,
            StatusMessages::ACCESS_GRANTED,
            StatusMessages::ACCESS_DENIED,
            StatusMessages::LOCKOUT_ACTIVE,
            StatusMessages::LOCKOUT_ENDED,
        ];
        for message in messages {
            assert!(!message.is_empty());
            assert!(message.len() <= LCD_COLS, "{message} too long");
            assert!(message.is_ascii());
        }
    }

    #[test]
    fn test_locked_countdown() {
        assert_eq!(StatusMessages::locked(120), "LOCKED 120s");
        assert_eq!(StatusMessages::locked(0), "LOCKED 0s");
    }
}

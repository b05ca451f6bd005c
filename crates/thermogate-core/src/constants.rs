//! Core constants for the Thermogate access-control subsystem.
//!
//! These values are fixed by the appliance hardware (4x4 matrix keypad,
//! 20x4 character LCD, ten credential slots) and by the keypad menu timing.
//! Tunable policy values (attempt threshold, lockout length, solenoid hold
//! time) live in [`AccessConfig`](crate::AccessConfig) instead.
//!
//! # Usage
//!
//! ```
//! use thermogate_core::constants::*;
//!
//! fn fits_pin_buffer(len: usize) -> bool {
//!     len <= PIN_MAX_LEN
//! }
//!
//! assert!(fits_pin_buffer(8));
//! assert!(!fits_pin_buffer(9));
//! assert_eq!(ADMIN_SLOT, 0);
//! ```

// ============================================================================
// PIN Format
// ============================================================================

/// Minimum number of digits in a PIN.
pub const PIN_MIN_LEN: usize = 4;

/// Maximum number of digits in a PIN.
///
/// Also the capacity of every keypad entry buffer: digits beyond this
/// length are silently dropped.
pub const PIN_MAX_LEN: usize = 8;

/// Length of a hex-encoded SHA-256 PIN digest.
pub const PIN_HASH_HEX_LEN: usize = 64;

// ============================================================================
// Credential Store
// ============================================================================

/// Number of credential slots in the store.
pub const MAX_USERS: usize = 10;

/// Slot index reserved for the administrator account.
///
/// The administrator role is inferred purely from occupying this slot.
pub const ADMIN_SLOT: usize = 0;

/// User id of the factory administrator record.
pub const DEFAULT_ADMIN_ID: &str = "admin";

/// Display name of the factory administrator record.
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// SHA-256 digest of the factory administrator PIN (`1234`).
pub const DEFAULT_ADMIN_HASH: &str =
    "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4";

/// Prefix used when generating ids for users added from the keypad menu.
pub const GENERATED_USER_PREFIX: &str = "user";

// ============================================================================
// Event Queue
// ============================================================================

/// Maximum number of undelivered access events kept by the controller.
///
/// When full, pushing a new event drops the oldest one.
pub const EVENT_QUEUE_CAPACITY: usize = 50;

// ============================================================================
// Access Policy Defaults
// ============================================================================

/// Default number of consecutive failures before a lockout starts.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u8 = 3;

/// Default lockout length in seconds.
pub const DEFAULT_KEYPAD_LOCKOUT_SECS: u32 = 120;

/// Default time the door solenoid stays energised after a grant.
pub const DEFAULT_SOLENOID_UNLOCK_SECS: u32 = 10;

/// Default period between temperature/humidity samples.
pub const DEFAULT_SENSOR_READ_INTERVAL_SECS: u32 = 5;

/// Default device identifier stamped into access log records.
pub const DEFAULT_DEVICE_ID: &str = "thermogate-01";

/// Default warning threshold in degrees Celsius.
pub const DEFAULT_WARN_THRESHOLD_C: f32 = 27.0;

/// Default second-stage fan threshold in degrees Celsius.
pub const DEFAULT_STAGE2_THRESHOLD_C: f32 = 28.0;

// ============================================================================
// Keypad Menu Timing (milliseconds)
// ============================================================================

/// Inactivity period after which the menu falls back to monitoring.
pub const UI_IDLE_TIMEOUT_MS: u64 = 30_000;

/// How long the unlock confirmation screen stays up.
pub const UI_UNLOCK_DISPLAY_MS: u64 = 3_000;

/// How long a wrong-PIN notice stays up before PIN entry resumes.
pub const UI_PIN_FAILURE_DISPLAY_MS: u64 = 1_500;

/// How long the result of an admin operation stays up.
pub const UI_RESULT_DISPLAY_MS: u64 = 2_000;

/// Maximum number of selectable entries in the user list (keys 1-9).
pub const UI_MAX_SELECTABLE_USERS: usize = 9;

// ============================================================================
// Display Geometry
// ============================================================================

/// Character LCD line count.
pub const LCD_ROWS: usize = 4;

/// Character LCD column count.
pub const LCD_COLS: usize = 20;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEVICE_ID, DEFAULT_KEYPAD_LOCKOUT_SECS, DEFAULT_MAX_FAILED_ATTEMPTS,
    DEFAULT_SENSOR_READ_INTERVAL_SECS, DEFAULT_SOLENOID_UNLOCK_SECS, DEFAULT_STAGE2_THRESHOLD_C,
    DEFAULT_WARN_THRESHOLD_C,
};
use crate::error::{Error, Result};

/// How keypad input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    /// Keys go straight into the controller's PIN buffer (`#` submits).
    Basic,
    /// Keys drive the menu state machine with admin operations.
    #[default]
    Menu,
}

/// Fan thresholds for the cooling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    /// Temperature above which the warning flag is raised
    pub warn_threshold_c: f32,

    /// Temperature at or above which the second fan runs
    pub stage2_threshold_c: f32,

    /// Whether the first fan runs even when the room is cool
    pub fan1_baseline_on: bool,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            warn_threshold_c: DEFAULT_WARN_THRESHOLD_C,
            stage2_threshold_c: DEFAULT_STAGE2_THRESHOLD_C,
            fan1_baseline_on: true,
        }
    }
}

/// Access policy and device settings consumed by the core.
///
/// The configuration object is owned by the device; the core only reads it.
/// Every field has a default so partial TOML/JSON documents deserialize.
///
/// # Examples
///
/// ```
/// use thermogate_core::AccessConfig;
///
/// let config = AccessConfig::new("door-east")
///     .max_failed_attempts(5)
///     .keypad_lockout_secs(300);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.device_id, "door-east");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Consecutive failures that trigger a lockout
    pub max_failed_attempts: u8,

    /// Lockout length in seconds
    pub keypad_lockout_secs: u32,

    /// How long the door solenoid stays energised after a grant
    pub solenoid_unlock_secs: u32,

    /// Seconds between temperature/humidity samples
    pub sensor_read_interval_secs: u32,

    /// Device identifier stamped into access log records
    pub device_id: String,

    /// Cooling fan thresholds
    pub thermal: ThermalConfig,

    /// Keypad interaction mode
    pub ui_mode: UiMode,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            keypad_lockout_secs: DEFAULT_KEYPAD_LOCKOUT_SECS,
            solenoid_unlock_secs: DEFAULT_SOLENOID_UNLOCK_SECS,
            sensor_read_interval_secs: DEFAULT_SENSOR_READ_INTERVAL_SECS,
            device_id: DEFAULT_DEVICE_ID.to_string(),
            thermal: ThermalConfig::default(),
            ui_mode: UiMode::default(),
        }
    }
}

impl AccessConfig {
    /// Create a configuration with defaults for the given device id
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    /// Set the failure threshold
    pub fn max_failed_attempts(mut self, attempts: u8) -> Self {
        self.max_failed_attempts = attempts;
        self
    }

    /// Set the lockout length in seconds
    pub fn keypad_lockout_secs(mut self, secs: u32) -> Self {
        self.keypad_lockout_secs = secs;
        self
    }

    /// Set the solenoid hold time in seconds
    pub fn solenoid_unlock_secs(mut self, secs: u32) -> Self {
        self.solenoid_unlock_secs = secs;
        self
    }

    /// Set the sensor sampling period in seconds
    pub fn sensor_read_interval_secs(mut self, secs: u32) -> Self {
        self.sensor_read_interval_secs = secs;
        self
    }

    /// Set the keypad interaction mode
    pub fn ui_mode(mut self, mode: UiMode) -> Self {
        self.ui_mode = mode;
        self
    }

    /// Set the fan thresholds
    pub fn thermal(mut self, thermal: ThermalConfig) -> Self {
        self.thermal = thermal;
        self
    }

    /// Lockout length in milliseconds.
    #[must_use]
    pub fn lockout_ms(&self) -> u64 {
        u64::from(self.keypad_lockout_secs) * 1_000
    }

    /// Solenoid hold time in milliseconds.
    #[must_use]
    pub fn solenoid_unlock_ms(&self) -> u64 {
        u64::from(self.solenoid_unlock_secs) * 1_000
    }

    /// Sensor sampling period in milliseconds.
    #[must_use]
    pub fn sensor_read_interval_ms(&self) -> u64 {
        u64::from(self.sensor_read_interval_secs) * 1_000
    }

    /// Check the configuration for values the core cannot work with.
    ///
    /// # Errors
    /// Returns `Error::Config` if the failure threshold, lockout length or
    /// sensor period is zero, or if the second fan stage sits below the
    /// warning threshold.
    pub fn validate(&self) -> Result<()> {
        if self.max_failed_attempts == 0 {
            return Err(Error::Config(
                "max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if self.keypad_lockout_secs == 0 {
            return Err(Error::Config(
                "keypad_lockout_secs must be at least 1".to_string(),
            ));
        }
        if self.sensor_read_interval_secs == 0 {
            return Err(Error::Config(
                "sensor_read_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.thermal.stage2_threshold_c < self.thermal.warn_threshold_c {
            return Err(Error::Config(format!(
                "stage2 threshold {}C is below warn threshold {}C",
                self.thermal.stage2_threshold_c, self.thermal.warn_threshold_c
            )));
        }
        Ok(())
    }
}

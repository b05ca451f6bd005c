//! Common types shared across peripheral implementations.

use serde::{Deserialize, Serialize};

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Mock Keypad").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// One temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,

    /// Relative humidity in percent.
    pub humidity: f32,

    /// `false` when the sensor failed to produce a sample.
    pub valid: bool,
}

impl SensorReading {
    /// A valid sample.
    pub fn new(temperature_c: f32, humidity: f32) -> Self {
        Self {
            temperature_c,
            humidity,
            valid: true,
        }
    }

    /// A failed sample.
    pub fn invalid() -> Self {
        Self {
            temperature_c: f32::NAN,
            humidity: f32::NAN,
            valid: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Mock Keypad", "4x4 Matrix").with_firmware_version("1.0.0");

        assert_eq!(info.name, "Mock Keypad");
        assert_eq!(info.model, "4x4 Matrix");
        assert_eq!(info.firmware_version, Some("1.0.0".to_string()));
    }

    #[test]
    fn test_invalid_reading() {
        let reading = SensorReading::invalid();
        assert!(!reading.valid);
        assert!(reading.temperature_c.is_nan());
    }

    #[test]
    fn test_reading_serialization() {
        let reading = SensorReading::new(26.5, 40.0);
        let json = serde_json::to_string(&reading).unwrap();
        let parsed: SensorReading = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reading);
    }
}

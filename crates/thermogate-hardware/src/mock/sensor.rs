//! Mock temperature sensor.
//!
//! Readings are published through a [`tokio::sync::watch`] channel; the
//! sensor always returns the most recent value. Until the first value is
//! published, and after every handle is dropped, reads report an invalid
//! sample, the same way a failing probe does.

use tokio::sync::watch;

use crate::{traits::TemperatureSource, types::SensorReading};

/// Mock temperature/humidity sensor.
///
/// # Examples
///
/// ```
/// use thermogate_hardware::mock::MockSensor;
/// use thermogate_hardware::traits::TemperatureSource;
///
/// let (mut sensor, handle) = MockSensor::new();
/// assert!(!sensor.read().valid);
///
/// handle.set(27.5, 55.0);
/// assert_eq!(sensor.read().temperature_c, 27.5);
/// ```
#[derive(Debug)]
pub struct MockSensor {
    reading_rx: watch::Receiver<SensorReading>,
}

impl MockSensor {
    /// Create a sensor with no sample yet.
    pub fn new() -> (Self, MockSensorHandle) {
        let (reading_tx, reading_rx) = watch::channel(SensorReading::invalid());
        (Self { reading_rx }, MockSensorHandle { reading_tx })
    }
}

impl TemperatureSource for MockSensor {
    fn read(&mut self) -> SensorReading {
        if self.reading_rx.has_changed().is_err() {
            return SensorReading::invalid();
        }
        *self.reading_rx.borrow_and_update()
    }
}

/// Handle for publishing mock sensor readings.
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    reading_tx: watch::Sender<SensorReading>,
}

impl MockSensorHandle {
    /// Publish a valid sample.
    pub fn set(&self, temperature_c: f32, humidity: f32) {
        self.reading_tx
            .send_replace(SensorReading::new(temperature_c, humidity));
    }

    /// Simulate a failed read.
    pub fn fail(&self) {
        self.reading_tx.send_replace(SensorReading::invalid());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_returns_latest_value() {
        let (mut sensor, handle) = MockSensor::new();

        handle.set(25.0, 40.0);
        handle.set(28.5, 42.0);

        let reading = sensor.read();
        assert!(reading.valid);
        assert_eq!(reading.temperature_c, 28.5);
        // Reading again without a new sample keeps the value
        assert_eq!(sensor.read().temperature_c, 28.5);
    }

    #[test]
    fn test_sensor_failure() {
        let (mut sensor, handle) = MockSensor::new();
        handle.set(25.0, 40.0);
        handle.fail();

        assert!(!sensor.read().valid);
    }

    #[test]
    fn test_dropped_handle_reads_invalid() {
        let (mut sensor, handle) = MockSensor::new();
        handle.set(25.0, 40.0);
        drop(handle);

        assert!(!sensor.read().valid);
    }
}

//! Peripheral trait definitions.
//!
//! These traits are the contract between the control loop and the devices
//! around it. Every method is non-blocking: the loop polls each peripheral
//! once per tick and must never stall waiting for input.

use thermogate_core::Key;

use crate::error::Result;
use crate::types::{DeviceInfo, SensorReading};

/// Source of discrete keypresses from a matrix keypad scan.
///
/// One call yields at most one key. There are no repeat-while-held
/// semantics: holding a key produces a single press.
///
/// # Examples
///
/// ```
/// use thermogate_core::Key;
/// use thermogate_hardware::traits::KeySource;
/// use thermogate_hardware::Result;
///
/// fn drain_digits<K: KeySource>(keypad: &mut K) -> Result<String> {
///     let mut digits = String::new();
///     while let Some(key) = keypad.poll_key()? {
///         if let Some(d) = key.as_digit() {
///             digits.push(char::from(b'0' + d));
///         }
///     }
///     Ok(digits)
/// }
/// ```
pub trait KeySource {
    /// Return the next pending keypress, or `None` if no key was pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad is disconnected.
    fn poll_key(&mut self) -> Result<Option<Key>>;

    /// Get device information.
    fn info(&self) -> DeviceInfo;
}

/// A relay output (door solenoid or fan contactor).
pub trait Relay {
    /// Energise or release the relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be driven.
    fn set(&mut self, on: bool) -> Result<()>;

    /// Last state written to the relay.
    fn is_on(&self) -> bool;
}

/// Temperature/humidity sensor.
pub trait TemperatureSource {
    /// Latest sample. Failed reads are reported as an invalid sample,
    /// not as an error.
    fn read(&mut self) -> SensorReading;
}

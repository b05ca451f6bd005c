//! Enum wrappers for peripheral dispatch.
//!
//! The orchestrator owns its peripherals by value. These enums give it one
//! concrete type per peripheral role while still allowing different
//! implementations to be plugged in.

use thermogate_core::Key;

use crate::mock::{MockKeypad, MockRelay};
use crate::traits::{KeySource, Relay};
use crate::{DeviceInfo, Result};

/// Enum wrapper for keypad dispatch.
///
/// # Examples
///
/// ```
/// use thermogate_hardware::devices::AnyKeySource;
/// use thermogate_hardware::mock::MockKeypad;
/// use thermogate_hardware::traits::KeySource;
///
/// let (keypad, _handle) = MockKeypad::new();
/// let mut keypad = AnyKeySource::Mock(keypad);
/// assert_eq!(keypad.poll_key().unwrap(), None);
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyKeySource {
    /// Channel-backed mock keypad.
    Mock(MockKeypad),
}

impl KeySource for AnyKeySource {
    fn poll_key(&mut self) -> Result<Option<Key>> {
        match self {
            Self::Mock(device) => device.poll_key(),
        }
    }

    fn info(&self) -> DeviceInfo {
        match self {
            Self::Mock(device) => device.info(),
        }
    }
}

impl From<MockKeypad> for AnyKeySource {
    fn from(device: MockKeypad) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for relay dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyRelay {
    /// Mock relay.
    Mock(MockRelay),
}

impl Relay for AnyRelay {
    fn set(&mut self, on: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set(on),
        }
    }

    fn is_on(&self) -> bool {
        match self {
            Self::Mock(device) => device.is_on(),
        }
    }
}

impl From<MockRelay> for AnyRelay {
    fn from(device: MockRelay) -> Self {
        Self::Mock(device)
    }
}

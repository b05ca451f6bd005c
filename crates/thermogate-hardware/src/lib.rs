//! Peripheral abstraction layer for the thermogate appliance.
//!
//! The appliance talks to four kinds of device: a 4x4 matrix keypad, a door
//! solenoid relay, two fan relays, and a temperature/humidity sensor. This
//! crate defines the traits the control loop drives them through, plus mock
//! implementations used by tests and the terminal emulator.
//!
//! All traits are synchronous and non-blocking. The control loop polls each
//! device once per tick; no call may wait for input.
//!
//! ```
//! use thermogate_hardware::mock::{MockKeypad, MockRelay};
//! use thermogate_hardware::traits::{KeySource, Relay};
//!
//! let (mut keypad, keys) = MockKeypad::new();
//! let (mut solenoid, coil) = MockRelay::new("solenoid");
//!
//! keys.try_send_keys("#").unwrap();
//! if let Some(key) = keypad.poll_key().unwrap() {
//!     solenoid.set(key.as_char() == '#').unwrap();
//! }
//! assert!(coil.is_on());
//! ```

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use devices::{AnyKeySource, AnyRelay};
pub use error::{HardwareError, Result};
pub use traits::{KeySource, Relay, TemperatureSource};
pub use types::{DeviceInfo, SensorReading};

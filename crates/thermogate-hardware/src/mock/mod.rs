//! Mock peripherals for testing and development.
//!
//! Each mock comes paired with a handle that plays the part of the physical
//! world: pressing keys, reading relay coils, or changing the room
//! temperature.

pub mod keypad;
pub mod relay;
pub mod sensor;

pub use keypad::{MockKeypad, MockKeypadHandle};
pub use relay::{MockRelay, MockRelayProbe};
pub use sensor::{MockSensor, MockSensorHandle};

//! Control loop for the thermogate appliance.
//!
//! Ties the access controller, the keypad menu and the peripherals together:
//! one polling cycle samples the climate sensor, feeds keypresses to the
//! controller or menu, drives the door solenoid and cooling fans, forwards
//! access events to an [`EventSink`] and refreshes the display.

pub mod access_log;
pub mod appliance;
pub mod config;
pub mod error;
pub mod sink;
pub mod status;
pub mod thermal;

pub use access_log::{AccessLogRecord, DoorState, log_timestamp};
pub use appliance::{Appliance, Peripherals};
pub use config::{load_config, parse_config};
pub use error::{ApplianceError, Result};
pub use sink::{BufferedSink, EventSink, TracingSink};
pub use status::{StatusSnapshot, monitoring_screen};
pub use thermal::FanState;

//! Shared building blocks for the Thermogate access-controlled monitoring
//! appliance: keypad key values, PIN codes and digests, the clock
//! abstraction, and the access configuration surfaced by the device config.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AccessConfig, ThermalConfig, UiMode};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

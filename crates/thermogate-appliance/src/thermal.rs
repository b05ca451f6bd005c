//! Two-stage cooling fan policy.
//!
//! Fan 1 runs whenever the baseline flag is set or the room is warm; fan 2
//! joins at the second threshold. An invalid reading never raises the
//! warning or starts fan 2, so a failed sensor leaves only the baseline fan
//! running.

use std::fmt;

use thermogate_core::ThermalConfig;
use thermogate_hardware::SensorReading;

/// Fan relays and warning flag derived from one reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanState {
    pub fan1: bool,
    pub fan2: bool,
    /// Temperature strictly above the warning threshold
    pub warning: bool,
}

impl FanState {
    pub fn evaluate(config: &ThermalConfig, reading: &SensorReading) -> Self {
        let warning = reading.valid && reading.temperature_c > config.warn_threshold_c;
        let fan2 = reading.valid && reading.temperature_c >= config.stage2_threshold_c;
        Self {
            fan1: config.fan1_baseline_on || warning || fan2,
            fan2,
            warning,
        }
    }
}

impl fmt::Display for FanState {
    /// Status row as shown on the display, e.g. `F1:ON  F2:OFF NORM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |on: bool| if on { "ON " } else { "OFF" };
        write!(
            f,
            "F1:{} F2:{} {}",
            on_off(self.fan1),
            on_off(self.fan2),
            if self.warning { "WARN" } else { "NORM" }
        )
    }
}

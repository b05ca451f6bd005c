//! Mock relay output.
//!
//! The relay state lives behind a shared flag so a test (or the emulator
//! display) can observe what the control loop drove without owning the
//! relay itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::{Result, traits::Relay};

/// Mock relay for testing and development.
///
/// # Examples
///
/// ```
/// use thermogate_hardware::mock::MockRelay;
/// use thermogate_hardware::traits::Relay;
///
/// let (mut solenoid, probe) = MockRelay::new("solenoid");
///
/// solenoid.set(true).unwrap();
/// assert!(probe.is_on());
/// assert_eq!(probe.switch_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockRelay {
    name: String,
    state: Arc<RelayState>,
}

#[derive(Debug, Default)]
struct RelayState {
    on: AtomicBool,
    switches: AtomicU32,
}

impl MockRelay {
    /// Create a released relay and a probe observing it.
    pub fn new(name: impl Into<String>) -> (Self, MockRelayProbe) {
        let state = Arc::new(RelayState::default());
        let relay = Self {
            name: name.into(),
            state: Arc::clone(&state),
        };
        (relay, MockRelayProbe { state })
    }

    /// Relay name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Relay for MockRelay {
    fn set(&mut self, on: bool) -> Result<()> {
        let was_on = self.state.on.swap(on, Ordering::SeqCst);
        if was_on != on {
            self.state.switches.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.state.on.load(Ordering::SeqCst)
    }
}

/// Read-only view of a [`MockRelay`].
#[derive(Debug, Clone)]
pub struct MockRelayProbe {
    state: Arc<RelayState>,
}

impl MockRelayProbe {
    /// Whether the relay is currently energised.
    pub fn is_on(&self) -> bool {
        self.state.on.load(Ordering::SeqCst)
    }

    /// Number of on/off transitions so far. Rewriting the same state is
    /// not counted.
    pub fn switch_count(&self) -> u32 {
        self.state.switches.load(Ordering::SeqCst)
    }
}

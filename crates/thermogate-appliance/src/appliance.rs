//! The appliance control loop.
//!
//! [`Appliance`] owns the access controller, the optional keypad menu, the
//! peripherals and the display, and advances all of them once per
//! [`tick`](Appliance::tick):
//!
//! ```text
//! sample sensor -> access.update -> poll one key -> menu timers
//!   -> unlock request -> fans -> solenoid expiry -> drain events -> display
//! ```
//!
//! Nothing in a tick blocks. Peripheral failures are logged and never stop
//! the loop; a keypad that disconnects is dropped and key polling becomes a
//! no-op.

use std::future::Future;
use std::time::Duration;

use thermogate_access::AccessController;
use thermogate_core::{Clock, UiMode};
use thermogate_hardware::{AnyKeySource, AnyRelay, KeySource, Relay, SensorReading, TemperatureSource};
use thermogate_storage::CredentialStore;
use thermogate_ui::{UiEffect, UiStateMachine, VirtualDisplay};
use tracing::{debug, info, trace, warn};

use crate::access_log::{AccessLogRecord, DoorState, log_timestamp};
use crate::sink::EventSink;
use crate::status::{StatusSnapshot, monitoring_screen};
use crate::thermal::FanState;

/// Devices wired to the controller board.
#[derive(Debug)]
pub struct Peripherals<T> {
    /// `None` when no keypad is attached
    pub keypad: Option<AnyKeySource>,
    pub solenoid: AnyRelay,
    pub fan1: AnyRelay,
    pub fan2: AnyRelay,
    pub sensor: T,
}

/// Access-controlled monitoring appliance.
///
/// # Examples
///
/// ```
/// use thermogate_access::AccessController;
/// use thermogate_appliance::{Appliance, BufferedSink, Peripherals};
/// use thermogate_core::{AccessConfig, ManualClock, UiMode};
/// use thermogate_hardware::mock::{MockKeypad, MockRelay, MockSensor};
/// use thermogate_storage::SlotTable;
///
/// let clock = ManualClock::new();
/// let config = AccessConfig::default().ui_mode(UiMode::Basic);
/// let access = AccessController::new(SlotTable::default(), config, clock.clone());
///
/// let (keypad, keys) = MockKeypad::new();
/// let (solenoid, door) = MockRelay::new("solenoid");
/// let peripherals = Peripherals {
///     keypad: Some(keypad.into()),
///     solenoid: solenoid.into(),
///     fan1: MockRelay::new("fan1").0.into(),
///     fan2: MockRelay::new("fan2").0.into(),
///     sensor: MockSensor::new().0,
/// };
/// let mut appliance = Appliance::new(access, peripherals, BufferedSink::new());
///
/// keys.try_send_keys("1234#").unwrap();
/// for _ in 0..5 {
///     appliance.tick();
/// }
/// assert!(door.is_on());
/// ```
#[derive(Debug)]
pub struct Appliance<S, C, T, E> {
    access: AccessController<S, C>,
    /// Present in menu mode only
    ui: Option<UiStateMachine>,
    peripherals: Peripherals<T>,
    sink: E,
    display: VirtualDisplay,
    /// Whether the menu currently owns the display
    menu_on_screen: bool,
    reading: SensorReading,
    next_sample_ms: u64,
    fans: FanState,
    solenoid_until_ms: Option<u64>,
    ticks: u64,
}

impl<S, C, T, E> Appliance<S, C, T, E>
where
    S: CredentialStore,
    C: Clock,
    T: TemperatureSource,
    E: EventSink,
{
    /// Assemble the appliance. Relays are driven to their idle state:
    /// solenoid released, fans off until the first reading.
    pub fn new(access: AccessController<S, C>, peripherals: Peripherals<T>, sink: E) -> Self {
        let ui = match access.config().ui_mode {
            UiMode::Menu => Some(UiStateMachine::new()),
            UiMode::Basic => None,
        };
        if let Some(keypad) = &peripherals.keypad {
            let info = keypad.info();
            info!(name = %info.name, model = %info.model, "keypad attached");
        } else {
            warn!("no keypad attached, PIN entry disabled");
        }

        let mut appliance = Self {
            access,
            ui,
            peripherals,
            sink,
            display: VirtualDisplay::default(),
            menu_on_screen: false,
            reading: SensorReading::invalid(),
            next_sample_ms: 0,
            fans: FanState::default(),
            solenoid_until_ms: None,
            ticks: 0,
        };
        drive(&mut appliance.peripherals.solenoid, false, "solenoid");
        drive(&mut appliance.peripherals.fan1, false, "fan1");
        drive(&mut appliance.peripherals.fan2, false, "fan2");
        appliance
    }

    /// Run one control cycle.
    pub fn tick(&mut self) {
        let now = self.access.clock().now_ms();
        self.ticks += 1;
        trace!(now, tick = self.ticks, "control cycle");

        self.sample_sensor(now);
        self.access.update();
        self.poll_keypad();
        if let Some(ui) = self.ui.as_mut() {
            let effects = ui.tick(&mut self.access);
            self.apply_effects(effects);
        }

        if self.access.consume_unlock_request() {
            self.unlock(now);
        }
        self.update_fans();
        self.update_solenoid(now);
        self.drain_events();
        self.refresh_display();
    }

    /// Tick every `period` until `shutdown` completes, calling `on_tick`
    /// after each cycle.
    pub async fn run<F, Cb>(&mut self, period: Duration, shutdown: F, mut on_tick: Cb)
    where
        F: Future<Output = ()>,
        Cb: FnMut(&Self),
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(period_ms = period.as_millis(), "control loop started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick();
                    on_tick(self);
                }
            }
        }
        info!(ticks = self.ticks, "control loop stopped");
    }

    fn sample_sensor(&mut self, now: u64) {
        if now < self.next_sample_ms {
            return;
        }
        self.next_sample_ms = now + self.access.config().sensor_read_interval_ms();

        let reading = self.peripherals.sensor.read();
        if self.reading.valid && !reading.valid {
            warn!("temperature sensor read failed");
        } else if !self.reading.valid && reading.valid {
            info!(
                temperature_c = reading.temperature_c,
                humidity = reading.humidity,
                "temperature sensor online"
            );
        }
        self.reading = reading;
    }

    fn poll_keypad(&mut self) {
        let Some(keypad) = self.peripherals.keypad.as_mut() else {
            return;
        };
        match keypad.poll_key() {
            Ok(Some(key)) => {
                trace!("key pressed");
                match self.ui.as_mut() {
                    Some(ui) => {
                        let effects = ui.handle_key(key, &mut self.access);
                        self.apply_effects(effects);
                    }
                    None => self.access.handle_key(key),
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "keypad lost, PIN entry disabled");
                self.peripherals.keypad = None;
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            match effect {
                UiEffect::Render(screen) => {
                    self.display.show(&screen);
                    self.menu_on_screen = true;
                }
                UiEffect::ShowMonitoring => self.menu_on_screen = false,
                // The menu already raised the unlock request on the controller
                UiEffect::Unlock => debug!("menu unlock"),
            }
        }
    }

    fn unlock(&mut self, now: u64) {
        let hold_ms = self.access.config().solenoid_unlock_ms();
        self.solenoid_until_ms = Some(now + hold_ms);
        drive(&mut self.peripherals.solenoid, true, "solenoid");
        info!(hold_ms, "door unlocked");
    }

    fn update_solenoid(&mut self, now: u64) {
        if self.solenoid_until_ms.is_some_and(|until| now >= until) {
            self.solenoid_until_ms = None;
            drive(&mut self.peripherals.solenoid, false, "solenoid");
            info!("door locked");
        }
    }

    fn update_fans(&mut self) {
        let fans = FanState::evaluate(&self.access.config().thermal, &self.reading);
        if fans != self.fans {
            info!(fan1 = fans.fan1, fan2 = fans.fan2, warning = fans.warning, "fan state changed");
        }
        self.fans = fans;
        drive(&mut self.peripherals.fan1, fans.fan1, "fan1");
        drive(&mut self.peripherals.fan2, fans.fan2, "fan2");
    }

    fn drain_events(&mut self) {
        if self.access.pending_events() == 0 {
            return;
        }
        let clock = self.access.clock();
        let timestamp = log_timestamp(clock.unix_secs(), clock.now_ms());
        let device_id = self.access.config().device_id.clone();
        let door = self.door_state();

        let events: Vec<_> = self.access.drain_events().collect();
        for event in &events {
            let record = AccessLogRecord::from_event(event, &device_id, timestamp.clone(), door);
            self.sink.record(record);
        }
    }

    fn refresh_display(&mut self) {
        if self.menu_on_screen {
            return;
        }
        let screen = monitoring_screen(&StatusSnapshot {
            unix_secs: self.access.clock().unix_secs(),
            reading: self.reading,
            fans: self.fans,
            door: self.door_state(),
            access_message: self.access.last_message(),
            lockout_remaining_secs: self
                .access
                .is_lockout_active()
                .then(|| self.access.lockout_remaining_secs()),
        });
        self.display.show(&screen);
    }

    pub fn door_state(&self) -> DoorState {
        DoorState::from_solenoid(self.solenoid_until_ms.is_some())
    }

    pub fn fans(&self) -> FanState {
        self.fans
    }

    /// Most recent sensor reading.
    pub fn reading(&self) -> SensorReading {
        self.reading
    }

    pub fn display(&self) -> &VirtualDisplay {
        &self.display
    }

    pub fn access(&self) -> &AccessController<S, C> {
        &self.access
    }

    /// Direct access for administrative operations outside the keypad.
    pub fn access_mut(&mut self) -> &mut AccessController<S, C> {
        &mut self.access
    }

    pub fn ui(&self) -> Option<&UiStateMachine> {
        self.ui.as_ref()
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    pub fn has_keypad(&self) -> bool {
        self.peripherals.keypad.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn drive(relay: &mut AnyRelay, on: bool, name: &str) {
    if relay.is_on() == on {
        return;
    }
    if let Err(e) = relay.set(on) {
        warn!(relay = name, on, error = %e, "relay write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferedSink;
    use thermogate_core::{AccessConfig, ManualClock};
    use thermogate_hardware::mock::{
        MockKeypad, MockKeypadHandle, MockRelay, MockRelayProbe, MockSensor, MockSensorHandle,
    };
    use thermogate_storage::SlotTable;

    type TestAppliance = Appliance<SlotTable, ManualClock, MockSensor, BufferedSink>;

    struct Bench {
        appliance: TestAppliance,
        clock: ManualClock,
        keys: MockKeypadHandle,
        door: MockRelayProbe,
        fan1: MockRelayProbe,
        fan2: MockRelayProbe,
        climate: MockSensorHandle,
    }

    impl Bench {
        fn new(mode: UiMode) -> Self {
            let clock = ManualClock::with_unix_secs(1_700_000_000);
            let config = AccessConfig::new("bench")
                .ui_mode(mode)
                .solenoid_unlock_secs(10)
                .sensor_read_interval_secs(5);
            let access = AccessController::new(SlotTable::default(), config, clock.clone());

            let (keypad, keys) = MockKeypad::new();
            let (solenoid, door) = MockRelay::new("solenoid");
            let (fan1_relay, fan1) = MockRelay::new("fan1");
            let (fan2_relay, fan2) = MockRelay::new("fan2");
            let (sensor, climate) = MockSensor::new();

            let peripherals = Peripherals {
                keypad: Some(keypad.into()),
                solenoid: solenoid.into(),
                fan1: fan1_relay.into(),
                fan2: fan2_relay.into(),
                sensor,
            };
            Self {
                appliance: Appliance::new(access, peripherals, BufferedSink::new()),
                clock,
                keys,
                door,
                fan1,
                fan2,
                climate,
            }
        }

        /// Type `keys`, one per tick, 100 ms apart.
        fn type_keys(&mut self, keys: &str) {
            self.keys.try_send_keys(keys).unwrap();
            for _ in keys.chars() {
                self.step(100);
            }
        }

        fn step(&mut self, ms: u64) {
            self.clock.advance_ms(ms);
            self.appliance.tick();
        }

        fn row(&self, line: usize) -> String {
            self.appliance.display().line(line).unwrap().trim_end().to_string()
        }
    }

    #[test]
    fn test_basic_mode_grant_energises_solenoid() {
        let mut bench = Bench::new(UiMode::Basic);

        bench.type_keys("1234#");

        assert!(bench.door.is_on());
        assert_eq!(bench.appliance.door_state(), DoorState::Unlocking);
        // Truncated to the panel width
        assert_eq!(bench.row(3), "D:UNLOCKING ACCESS G");
    }

    #[test]
    fn test_solenoid_releases_after_hold_time() {
        let mut bench = Bench::new(UiMode::Basic);
        bench.type_keys("1234#");

        bench.step(9_900);
        assert!(bench.door.is_on());
        bench.step(100);

        assert!(!bench.door.is_on());
        assert_eq!(bench.door.switch_count(), 2);
        assert_eq!(bench.appliance.door_state(), DoorState::Locked);
    }

    #[test]
    fn test_events_reach_sink_with_door_state() {
        let mut bench = Bench::new(UiMode::Basic);

        bench.type_keys("0000#1234#");

        let records: Vec<_> = bench.appliance.sink().records().cloned().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].result, "DENIED");
        assert_eq!(records[0].door_state, DoorState::Locked);
        assert_eq!(records[1].result, "GRANTED");
        assert_eq!(records[1].user_id, "admin");
        // Drained after the unlock in the same tick
        assert_eq!(records[1].door_state, DoorState::Unlocking);
        assert_eq!(records[1].device_id, "bench");
        assert!(records[1].timestamp.starts_with("2023-11-14T"));
    }

    #[test]
    fn test_lockout_shown_on_status_row() {
        let mut bench = Bench::new(UiMode::Basic);

        bench.type_keys("0000#1111#2222#");

        assert_eq!(bench.row(3), "D:LOCKED LCK 120s");
        let results: Vec<_> = bench
            .appliance
            .sink()
            .records()
            .map(|r| r.result.clone())
            .collect();
        assert_eq!(results, vec!["DENIED", "DENIED", "DENIED", "LOCKOUT"]);
    }

    #[test]
    fn test_menu_admin_does_not_unlock() {
        let mut bench = Bench::new(UiMode::Menu);

        bench.type_keys("A1234#");

        assert_eq!(bench.row(0), "ADMIN MENU");
        assert!(!bench.door.is_on());

        bench.type_keys("1");
        assert!(bench.door.is_on());
        assert_eq!(bench.row(0), "ACCESS GRANTED");
    }

    #[test]
    fn test_menu_returns_to_telemetry() {
        let mut bench = Bench::new(UiMode::Menu);
        bench.climate.set(24.0, 50.0);

        bench.type_keys("A*");
        bench.step(100);

        assert_eq!(bench.row(0), "14/11/2023 22:13:20");
        assert_eq!(bench.row(1), "T:24.0C H:50.0%");
    }

    #[test]
    fn test_fans_follow_temperature() {
        let mut bench = Bench::new(UiMode::Basic);
        bench.climate.set(28.5, 40.0);
        bench.step(0);

        assert!(bench.fan1.is_on());
        assert!(bench.fan2.is_on());
        assert!(bench.appliance.fans().warning);

        bench.climate.set(22.0, 40.0);
        // Still within the sampling interval
        bench.step(4_000);
        assert!(bench.fan2.is_on());

        bench.step(1_000);
        assert!(!bench.fan2.is_on());
        assert!(bench.fan1.is_on());
        assert_eq!(bench.row(2), "F1:ON  F2:OFF NORM");
    }

    #[test]
    fn test_sensor_failure_keeps_baseline_fan() {
        let mut bench = Bench::new(UiMode::Basic);
        bench.climate.fail();
        bench.step(0);

        assert!(bench.fan1.is_on());
        assert!(!bench.fan2.is_on());
        assert_eq!(bench.row(1), "T:---- H:----");
    }

    #[test]
    fn test_disconnected_keypad_is_dropped() {
        let mut bench = Bench::new(UiMode::Basic);
        // Dropping every handle disconnects the keypad
        let keys = std::mem::replace(&mut bench.keys, MockKeypad::new().1);
        drop(keys);
        bench.step(100);

        assert!(!bench.appliance.has_keypad());
        // The rest of the loop keeps running
        bench.climate.set(30.0, 40.0);
        bench.step(5_000);
        assert!(bench.fan2.is_on());
    }

    #[test]
    fn test_no_keypad() {
        let clock = ManualClock::new();
        let access = AccessController::new(SlotTable::default(), AccessConfig::default(), clock.clone());
        let (sensor, _climate) = MockSensor::new();
        let peripherals = Peripherals {
            keypad: None,
            solenoid: MockRelay::new("solenoid").0.into(),
            fan1: MockRelay::new("fan1").0.into(),
            fan2: MockRelay::new("fan2").0.into(),
            sensor,
        };
        let mut appliance = Appliance::new(access, peripherals, BufferedSink::new());

        appliance.tick();

        assert_eq!(appliance.ticks(), 1);
        assert!(!appliance.has_keypad());
        assert!(appliance.sink().is_empty());
    }
}

//! Keypad access controller.
//!
//! [`AccessController`] owns everything security relevant about the keypad:
//! the PIN entry buffer, digest matching against the credential store, the
//! consecutive-failure counter, the timed lockout and the outbound event
//! queue. Time comes from an injected [`Clock`]; the lockout deadline is a
//! monotonic timestamp and wall-clock time is only used for the epoch
//! stamped into `LockoutStarted` events.
//!
//! The controller is single-owner. The control loop calls
//! [`update`](AccessController::update) once per tick, feeds keys through
//! [`handle_key`](AccessController::handle_key) (or authenticates directly
//! with [`validate_pin`](AccessController::validate_pin) from the menu UI)
//! and drains events with [`pop_event`](AccessController::pop_event).

use thermogate_core::constants::{GENERATED_USER_PREFIX, PIN_MAX_LEN};
use thermogate_core::{AccessConfig, Clock, Key, PinCode, SlotIndex};
use thermogate_storage::{CredentialStore, UserCredential};
use tracing::{debug, info, warn};

use crate::error::{AccessError, Result};
use crate::event::{AccessEvent, EventQueue};
use crate::messages::StatusMessages;

/// Outcome of a direct PIN check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthResult {
    pub success: bool,

    /// The matched record lives in the administrator slot.
    pub is_admin: bool,

    pub user_id: String,
    pub display_name: String,
}

/// What a single authentication attempt did.
enum Attempt {
    Locked,
    Malformed,
    Granted(AuthResult),
    Denied,
}

/// PIN validation, lockout policy and credential management.
///
/// # Examples
///
/// ```
/// use thermogate_access::AccessController;
/// use thermogate_core::{AccessConfig, Key, ManualClock};
/// use thermogate_storage::SlotTable;
///
/// let mut access = AccessController::new(
///     SlotTable::default(),
///     AccessConfig::default(),
///     ManualClock::new(),
/// );
///
/// for c in "1234#".chars() {
///     access.handle_key(Key::from_char(c).unwrap());
/// }
///
/// assert_eq!(access.last_message(), "ACCESS GRANTED");
/// assert!(access.consume_unlock_request());
/// assert!(!access.consume_unlock_request());
/// ```
#[derive(Debug)]
pub struct AccessController<S, C> {
    store: S,
    config: AccessConfig,
    clock: C,

    pin_buffer: String,
    failed_attempts: u8,
    /// Monotonic deadline in milliseconds
    lockout_until_ms: Option<u64>,
    lockout_was_active: bool,
    unlock_requested: bool,
    last_message: String,

    events: EventQueue,
}

impl<S: CredentialStore, C: Clock> AccessController<S, C> {
    pub fn new(store: S, config: AccessConfig, clock: C) -> Self {
        Self {
            store,
            config,
            clock,
            pin_buffer: String::with_capacity(PIN_MAX_LEN),
            failed_attempts: 0,
            lockout_until_ms: None,
            lockout_was_active: false,
            unlock_requested: false,
            last_message: StatusMessages::READY.to_string(),
            events: EventQueue::new(),
        }
    }

    /// Per-tick housekeeping: detects the end of a lockout.
    ///
    /// Emits exactly one `LockoutEnded` event per lockout period, on the
    /// first call after the deadline passes.
    pub fn update(&mut self) {
        self.settle_lockout_edge();
    }

    /// Close out a lockout whose deadline has passed. Returns whether a
    /// lockout is still running.
    fn settle_lockout_edge(&mut self) -> bool {
        let active = self.is_lockout_active();
        if self.lockout_was_active && !active {
            self.lockout_until_ms = None;
            self.last_message = StatusMessages::LOCKOUT_ENDED.to_string();
            self.events
                .push(AccessEvent::lockout_ended(self.failed_attempts));
            info!("keypad lockout ended");
        }
        self.lockout_was_active = active;
        active
    }

    /// Feed one keypress into the PIN buffer.
    ///
    /// Digits append up to eight characters, `*` clears the buffer and `#`
    /// submits it. Letter keys are ignored. During a lockout no key is
    /// buffered; the status only shows the remaining time.
    pub fn handle_key(&mut self, key: Key) {
        if self.is_lockout_active() {
            self.last_message = StatusMessages::locked(self.lockout_remaining_secs());
            return;
        }

        match key {
            Key::Digit(_) => {
                if self.pin_buffer.len() < PIN_MAX_LEN {
                    self.pin_buffer.push(key.as_char());
                }
            }
            Key::Star => {
                self.pin_buffer.clear();
                self.last_message = StatusMessages::INPUT_CLEARED.to_string();
            }
            Key::Hash => self.submit_pin(),
            Key::A | Key::B | Key::C | Key::D => {}
        }
    }

    /// Submit the buffered PIN.
    ///
    /// A match raises the unlock request. The buffer is cleared whatever
    /// the outcome.
    pub fn submit_pin(&mut self) {
        let pin = std::mem::take(&mut self.pin_buffer);
        if let Attempt::Granted(_) = self.authenticate(&pin) {
            self.unlock_requested = true;
        }
    }

    /// Check a PIN without going through the key buffer.
    ///
    /// Counts failures, starts lockouts and emits events exactly like
    /// [`submit_pin`](Self::submit_pin), but does not raise the unlock
    /// request: the caller decides whether a match opens the door (a plain
    /// user) or enters the admin menu. Call
    /// [`request_unlock`](Self::request_unlock) to open the door.
    ///
    /// During a lockout the PIN is not evaluated.
    pub fn validate_pin(&mut self, pin: &str) -> AuthResult {
        match self.authenticate(pin) {
            Attempt::Granted(result) => result,
            Attempt::Locked | Attempt::Malformed | Attempt::Denied => AuthResult::default(),
        }
    }

    fn authenticate(&mut self, pin: &str) -> Attempt {
        // A period that expired between ticks must end before another starts
        if self.settle_lockout_edge() {
            self.last_message = StatusMessages::locked(self.lockout_remaining_secs());
            return Attempt::Locked;
        }

        let Ok(pin) = PinCode::new(pin) else {
            debug!("rejected malformed PIN submission");
            self.last_message = StatusMessages::PIN_INVALID.to_string();
            return Attempt::Malformed;
        };

        let hash = pin.hash();
        let matched = self
            .store
            .find_by_hash(&hash)
            .map(|(slot, user)| AuthResult {
                success: true,
                is_admin: slot.is_admin(),
                user_id: user.user_id.clone(),
                display_name: user.display_name.clone(),
            });

        match matched {
            Some(result) => {
                self.failed_attempts = 0;
                self.last_message = StatusMessages::ACCESS_GRANTED.to_string();
                self.events.push(AccessEvent::granted(
                    result.user_id.as_str(),
                    result.display_name.as_str(),
                ));
                info!(user_id = %result.user_id, admin = result.is_admin, "access granted");
                Attempt::Granted(result)
            }
            None => {
                self.failed_attempts = self.failed_attempts.saturating_add(1);
                self.last_message = StatusMessages::ACCESS_DENIED.to_string();
                self.events.push(AccessEvent::denied(self.failed_attempts));
                warn!(failed_attempts = self.failed_attempts, "access denied");

                if self.failed_attempts >= self.config.max_failed_attempts {
                    self.start_lockout();
                }
                Attempt::Denied
            }
        }
    }

    fn start_lockout(&mut self) {
        let until_epoch = self.clock.unix_secs() + u64::from(self.config.keypad_lockout_secs);
        self.lockout_until_ms = Some(self.clock.now_ms() + self.config.lockout_ms());
        self.lockout_was_active = true;
        self.failed_attempts = 0;
        self.last_message = StatusMessages::LOCKOUT_ACTIVE.to_string();
        self.events.push(AccessEvent::lockout_started(
            self.config.max_failed_attempts,
            until_epoch,
        ));
        info!(
            lockout_secs = self.config.keypad_lockout_secs,
            until_epoch, "keypad lockout started"
        );
    }

    /// Take the pending unlock request. Returns `true` at most once per
    /// request.
    pub fn consume_unlock_request(&mut self) -> bool {
        std::mem::take(&mut self.unlock_requested)
    }

    /// Ask the orchestrator to energise the door solenoid.
    pub fn request_unlock(&mut self) {
        self.unlock_requested = true;
    }

    /// Add a user or replace the record with the same id.
    ///
    /// An empty display name falls back to the user id.
    ///
    /// # Errors
    /// `MissingUserId` for an empty id, `InvalidPinFormat` unless the PIN is
    /// 4-8 digits, `SaveFailed` if the store has no room.
    pub fn upsert_user(
        &mut self,
        user_id: &str,
        display_name: &str,
        pin: &str,
        enabled: bool,
    ) -> Result<SlotIndex> {
        if user_id.is_empty() {
            return Err(AccessError::MissingUserId);
        }
        let pin = PinCode::new(pin).map_err(|_| AccessError::InvalidPinFormat)?;
        let display_name = if display_name.is_empty() {
            user_id
        } else {
            display_name
        };

        let user = UserCredential::new(user_id, display_name, pin.hash(), enabled);
        let slot = self.store.upsert(user)?;
        info!(user_id, slot = %slot, "user saved");
        Ok(slot)
    }

    /// Replace the PIN of an existing user. Never creates a record.
    ///
    /// # Errors
    /// `MissingUserId`, `InvalidPinFormat`, `UserNotFound` for unknown ids,
    /// or `SaveFailed` if the store rejects the write.
    pub fn change_pin(&mut self, user_id: &str, new_pin: &str) -> Result<SlotIndex> {
        if user_id.is_empty() {
            return Err(AccessError::MissingUserId);
        }
        let pin = PinCode::new(new_pin).map_err(|_| AccessError::InvalidPinFormat)?;

        let mut user = self
            .store
            .find_by_id(user_id)
            .map(|(_, user)| user.clone())
            .ok_or(AccessError::UserNotFound)?;
        user.pin_hash = pin.hash();

        let slot = self.store.upsert(user)?;
        info!(user_id, slot = %slot, "PIN changed");
        Ok(slot)
    }

    /// Delete a user and free its slot.
    ///
    /// # Errors
    /// `UserNotFound` for unknown ids, `AdminProtected` for the
    /// administrator.
    pub fn remove_user(&mut self, user_id: &str) -> Result<SlotIndex> {
        let slot = self.store.remove_by_id(user_id)?;
        info!(user_id, slot = %slot, "user removed");
        Ok(slot)
    }

    /// First `user<n>` id not used by any slot.
    ///
    /// Deterministic for a given store, so repeated calls during one add
    /// flow return the same id.
    pub fn generate_user_id(&self) -> String {
        let mut n: usize = 1;
        loop {
            let candidate = format!("{GENERATED_USER_PREFIX}{n}");
            if self.store.find_by_id(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Remove and return the oldest pending event.
    pub fn pop_event(&mut self) -> Option<AccessEvent> {
        self.events.pop()
    }

    /// Remove every pending event, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = AccessEvent> + '_ {
        self.events.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn is_lockout_active(&self) -> bool {
        self.lockout_until_ms
            .is_some_and(|until| until > self.clock.now_ms())
    }

    /// Whole seconds left in the current lockout, rounded down. Zero when no
    /// lockout is active.
    pub fn lockout_remaining_secs(&self) -> u64 {
        self.lockout_until_ms
            .map_or(0, |until| until.saturating_sub(self.clock.now_ms()) / 1_000)
    }

    pub fn failed_attempts(&self) -> u8 {
        self.failed_attempts
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Digits typed so far.
    pub fn input_buffer(&self) -> &str {
        &self.pin_buffer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessEventType;
    use rstest::{fixture, rstest};
    use thermogate_core::ManualClock;
    use thermogate_storage::SlotTable;

    type Controller = AccessController<SlotTable, ManualClock>;

    #[fixture]
    fn access() -> Controller {
        AccessController::new(
            SlotTable::default(),
            AccessConfig::default()
                .max_failed_attempts(3)
                .keypad_lockout_secs(120),
            ManualClock::with_unix_secs(1_700_000_000),
        )
    }

    fn type_keys(access: &mut Controller, keys: &str) {
        for c in keys.chars() {
            access.handle_key(Key::from_char(c).unwrap());
        }
    }

    fn kinds(access: &mut Controller) -> Vec<AccessEventType> {
        access.drain_events().map(|e| e.kind).collect()
    }

    #[rstest]
    fn test_initial_state(access: Controller) {
        assert_eq!(access.last_message(), "READY");
        assert_eq!(access.input_buffer(), "");
        assert_eq!(access.failed_attempts(), 0);
        assert!(!access.is_lockout_active());
        assert_eq!(access.lockout_remaining_secs(), 0);
    }

    #[rstest]
    fn test_buffer_caps_at_eight_digits(mut access: Controller) {
        type_keys(&mut access, "1234567890");
        assert_eq!(access.input_buffer(), "12345678");
    }

    #[rstest]
    fn test_letters_are_ignored(mut access: Controller) {
        type_keys(&mut access, "1A2B3C4D");
        assert_eq!(access.input_buffer(), "1234");
    }

    #[rstest]
    fn test_star_clears_buffer(mut access: Controller) {
        type_keys(&mut access, "987*");
        assert_eq!(access.input_buffer(), "");
        assert_eq!(access.last_message(), "INPUT CLEARED");
    }

    #[rstest]
    fn test_grant_raises_unlock_once(mut access: Controller) {
        type_keys(&mut access, "1234#");

        assert_eq!(access.last_message(), "ACCESS GRANTED");
        assert_eq!(access.input_buffer(), "");
        assert!(access.consume_unlock_request());
        assert!(!access.consume_unlock_request());

        let event = access.pop_event().unwrap();
        assert_eq!(event.kind, AccessEventType::AccessGranted);
        assert_eq!(event.user_id.as_deref(), Some("admin"));
        assert_eq!(event.display_name.as_deref(), Some("Administrator"));
        assert_eq!(event.reason(), "VALID_PIN");
    }

    #[rstest]
    #[case("123#")]
    #[case("1#")]
    #[case("#")]
    fn test_malformed_submission(mut access: Controller, #[case] keys: &str) {
        type_keys(&mut access, keys);

        assert_eq!(access.last_message(), "PIN INVALID");
        assert_eq!(access.input_buffer(), "");
        assert_eq!(access.pending_events(), 0);
        assert_eq!(access.failed_attempts(), 0);
    }

    #[rstest]
    fn test_overlong_entry_is_truncated_then_checked(mut access: Controller) {
        type_keys(&mut access, "123456789#");

        assert_eq!(access.last_message(), "ACCESS DENIED");
        assert_eq!(access.failed_attempts(), 1);
    }

    #[rstest]
    fn test_three_failures_start_lockout(mut access: Controller) {
        type_keys(&mut access, "0000#");
        assert_eq!(access.failed_attempts(), 1);
        type_keys(&mut access, "1111#");
        assert_eq!(access.failed_attempts(), 2);
        assert!(!access.is_lockout_active());
        type_keys(&mut access, "2222#");

        assert!(access.is_lockout_active());
        assert_eq!(access.lockout_remaining_secs(), 120);
        assert_eq!(access.failed_attempts(), 0);
        assert_eq!(access.last_message(), "LOCKOUT ACTIVE");

        let events: Vec<_> = access.drain_events().collect();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AccessEventType::AccessDenied,
                AccessEventType::AccessDenied,
                AccessEventType::AccessDenied,
                AccessEventType::LockoutStarted,
            ]
        );
        assert_eq!(events[2].failed_count, 3);
        assert_eq!(events[3].failed_count, 3);
        assert_eq!(events[3].lockout_until_epoch, Some(1_700_000_120));
    }

    #[rstest]
    fn test_lockout_suppresses_input(mut access: Controller) {
        type_keys(&mut access, "0000#1111#2222#");
        access.drain_events().for_each(drop);

        access.clock().advance_ms(3_500);
        type_keys(&mut access, "1234#");

        assert_eq!(access.input_buffer(), "");
        assert_eq!(access.last_message(), "LOCKED 116s");
        assert_eq!(access.pending_events(), 0);
        assert!(!access.consume_unlock_request());
    }

    #[rstest]
    fn test_lockout_end_emitted_once(mut access: Controller) {
        type_keys(&mut access, "0000#1111#2222#");
        access.update();
        access.drain_events().for_each(drop);

        access.clock().advance_ms(119_999);
        access.update();
        assert_eq!(access.pending_events(), 0);

        access.clock().advance_ms(1);
        access.update();
        access.update();
        access.clock().advance_ms(10_000);
        access.update();

        assert_eq!(kinds(&mut access), vec![AccessEventType::LockoutEnded]);
        assert_eq!(access.last_message(), "LOCKOUT ENDED");
        assert!(!access.is_lockout_active());
    }

    #[rstest]
    fn test_lockout_end_without_intermediate_tick(mut access: Controller) {
        type_keys(&mut access, "0000#1111#2222#");
        access.drain_events().for_each(drop);

        access.clock().advance_ms(500_000);
        access.update();

        assert_eq!(kinds(&mut access), vec![AccessEventType::LockoutEnded]);
    }

    #[rstest]
    fn test_keys_accepted_after_lockout(mut access: Controller) {
        type_keys(&mut access, "0000#1111#2222#");
        access.clock().advance_ms(120_000);
        access.update();

        type_keys(&mut access, "1234#");
        assert!(access.consume_unlock_request());
    }

    #[rstest]
    fn test_success_resets_failures(mut access: Controller) {
        type_keys(&mut access, "0000#1111#");
        assert_eq!(access.failed_attempts(), 2);
        type_keys(&mut access, "1234#");
        assert_eq!(access.failed_attempts(), 0);
    }

    #[rstest]
    fn test_validate_pin_admin(mut access: Controller) {
        let result = access.validate_pin("1234");

        assert!(result.success);
        assert!(result.is_admin);
        assert_eq!(result.user_id, "admin");
        assert!(!access.consume_unlock_request());
        assert_eq!(kinds(&mut access), vec![AccessEventType::AccessGranted]);
    }

    #[rstest]
    fn test_validate_pin_regular_user(mut access: Controller) {
        access.upsert_user("u2", "Bob", "5678", true).unwrap();

        let result = access.validate_pin("5678");
        assert!(result.success);
        assert!(!result.is_admin);
        assert_eq!(result.display_name, "Bob");
    }

    #[rstest]
    fn test_validate_pin_counts_failures(mut access: Controller) {
        assert!(!access.validate_pin("0000").success);
        assert!(!access.validate_pin("abcd").success);
        assert_eq!(access.failed_attempts(), 1);

        access.validate_pin("0001");
        access.validate_pin("0002");
        assert!(access.is_lockout_active());

        // Correct PIN is not evaluated while locked
        assert!(!access.validate_pin("1234").success);
        assert!(access.last_message().starts_with("LOCKED"));
    }

    #[rstest]
    fn test_disabled_user_cannot_authenticate(mut access: Controller) {
        access.upsert_user("u2", "Bob", "5678", false).unwrap();
        assert!(!access.validate_pin("5678").success);
    }

    #[rstest]
    fn test_upsert_user_rejects_short_pin(mut access: Controller) {
        let result = access.upsert_user("u2", "Bob", "12", true);

        assert_eq!(result, Err(AccessError::InvalidPinFormat));
        assert_eq!(
            result.unwrap_err().to_string(),
            "pin must be 4-8 numeric digits"
        );
        assert_eq!(access.store().count(), 1);
    }

    #[rstest]
    fn test_upsert_user_requires_id(mut access: Controller) {
        let result = access.upsert_user("", "Bob", "5678", true);
        assert_eq!(result.unwrap_err().to_string(), "userId required");
    }

    #[rstest]
    fn test_upsert_user_name_falls_back_to_id(mut access: Controller) {
        let slot = access.upsert_user("u7", "", "5678", true).unwrap();
        assert_eq!(access.store().get(slot).unwrap().display_name, "u7");
    }

    #[rstest]
    fn test_upsert_user_store_full(mut access: Controller) {
        for i in 1..10 {
            access
                .upsert_user(&format!("u{i}"), "", "5678", true)
                .unwrap();
        }
        let result = access.upsert_user("extra", "", "5678", true);
        assert_eq!(result.unwrap_err().to_string(), "failed to save user");
    }

    #[rstest]
    fn test_change_pin_unknown_user(mut access: Controller) {
        let before = access.store().snapshot();

        let result = access.change_pin("ghost", "5678");

        assert_eq!(result, Err(AccessError::UserNotFound));
        assert_eq!(access.store().snapshot(), before);
    }

    #[rstest]
    fn test_change_pin_keeps_slot_and_name(mut access: Controller) {
        let slot = access.upsert_user("u2", "Bob", "5678", true).unwrap();

        assert_eq!(access.change_pin("u2", "24681357").unwrap(), slot);
        assert!(!access.validate_pin("5678").success);
        let result = access.validate_pin("24681357");
        assert_eq!(result.display_name, "Bob");
    }

    #[rstest]
    fn test_change_admin_pin(mut access: Controller) {
        access.change_pin("admin", "9999").unwrap();
        assert!(access.validate_pin("9999").is_admin);
    }

    #[rstest]
    fn test_remove_user(mut access: Controller) {
        access.upsert_user("u1", "", "5678", true).unwrap();

        assert!(access.remove_user("u1").is_ok());
        assert_eq!(access.remove_user("u1"), Err(AccessError::UserNotFound));
        assert_eq!(access.remove_user("admin"), Err(AccessError::AdminProtected));
    }

    #[rstest]
    fn test_generate_user_id(mut access: Controller) {
        assert_eq!(access.generate_user_id(), "user1");
        assert_eq!(access.generate_user_id(), "user1");

        access.upsert_user("user1", "", "5678", true).unwrap();
        access.upsert_user("user2", "", "5678", false).unwrap();
        assert_eq!(access.generate_user_id(), "user3");

        access.remove_user("user1").unwrap();
        assert_eq!(access.generate_user_id(), "user1");
    }
}

//! Keypad menu state machine.
//!
//! The machine consumes keypresses and periodic ticks and drives the menu
//! through the states in [`crate::state`]. Each state has its own handler
//! that takes the current state by value and returns a [`Transition`]: the
//! next state plus what should happen on the way there (a timed notice, a
//! door unlock, a redraw). The machine applies the transition and reports
//! the resulting [`UiEffect`]s to the caller.
//!
//! Security decisions stay in the access controller. Handlers call
//! [`AccessController::validate_pin`], [`AccessController::change_pin`] and
//! friends and branch on the result; the lockout countdown and failure
//! counting are never duplicated here. All timers read the controller's
//! clock.
//!
//! # Examples
//!
//! ```
//! use thermogate_access::AccessController;
//! use thermogate_core::{AccessConfig, Key, ManualClock};
//! use thermogate_storage::SlotTable;
//! use thermogate_ui::{MenuState, UiStateMachine};
//!
//! let mut access =
//!     AccessController::new(SlotTable::default(), AccessConfig::default(), ManualClock::new());
//! let mut ui = UiStateMachine::new();
//!
//! for c in "A1234#".chars() {
//!     ui.handle_key(Key::from_char(c).unwrap(), &mut access);
//! }
//! assert_eq!(ui.menu_state(), MenuState::AdminMenu);
//! ```

use std::collections::VecDeque;

use thermogate_access::AccessController;
use thermogate_core::constants::{
    PIN_MAX_LEN, PIN_MIN_LEN, UI_IDLE_TIMEOUT_MS, UI_MAX_SELECTABLE_USERS,
    UI_PIN_FAILURE_DISPLAY_MS, UI_RESULT_DISPLAY_MS, UI_UNLOCK_DISPLAY_MS,
};
use thermogate_core::{Clock, Key, SlotIndex};
use thermogate_storage::CredentialStore;
use tracing::{debug, info};

use crate::screen::{Screen, UiEffect, masked};
use crate::state::{ListAction, MenuState, PinStep, StateTransition, UiState};

/// Maximum number of state transitions kept in history.
const MAX_HISTORY_SIZE: usize = 100;

/// User list entries shown per page (one per display row below the title).
const LIST_PAGE_SIZE: usize = 3;

/// Menu timing in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiTimings {
    /// Inactivity before falling back to monitoring
    pub idle_timeout_ms: u64,
    /// Unlock confirmation screen
    pub unlock_display_ms: u64,
    /// Wrong-PIN notice
    pub failure_display_ms: u64,
    /// Result of an admin operation
    pub result_display_ms: u64,
}

impl Default for UiTimings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: UI_IDLE_TIMEOUT_MS,
            unlock_display_ms: UI_UNLOCK_DISPLAY_MS,
            failure_display_ms: UI_PIN_FAILURE_DISPLAY_MS,
            result_display_ms: UI_RESULT_DISPLAY_MS,
        }
    }
}

/// A message held on screen for a fixed time. Keys are ignored until it
/// expires.
#[derive(Debug, Clone)]
struct Notice {
    until_ms: u64,
}

/// Result of handling one key in one state.
#[derive(Debug)]
struct Transition {
    next: UiState,
    notice: Option<(Screen, u64)>,
    unlock: bool,
    redraw: bool,
}

impl Transition {
    /// Move to `next` and redraw.
    fn to(next: UiState) -> Self {
        Self {
            next,
            notice: None,
            unlock: false,
            redraw: true,
        }
    }

    /// Key had no effect.
    fn unchanged(state: UiState) -> Self {
        Self {
            redraw: false,
            ..Self::to(state)
        }
    }

    /// Show `screen` for `duration_ms` before the next state is drawn.
    fn with_notice(mut self, screen: Screen, duration_ms: u64) -> Self {
        self.notice = Some((screen, duration_ms));
        self
    }

    fn with_unlock(mut self) -> Self {
        self.unlock = true;
        self
    }
}

/// Keypad-driven menu.
///
/// Single-owner like the access controller: the control loop calls
/// [`handle_key`](Self::handle_key) for each keypress and
/// [`tick`](Self::tick) once per cycle.
#[derive(Debug, Clone)]
pub struct UiStateMachine {
    state: UiState,
    timings: UiTimings,
    last_activity_ms: u64,
    notice: Option<Notice>,
    /// Lockout seconds last drawn on the PIN entry screen
    countdown: Option<u64>,
    history: VecDeque<StateTransition>,
}

impl UiStateMachine {
    /// Create a machine in `Monitoring` with the default timings.
    pub fn new() -> Self {
        Self::with_timings(UiTimings::default())
    }

    pub fn with_timings(timings: UiTimings) -> Self {
        Self {
            state: UiState::Monitoring,
            timings,
            last_activity_ms: 0,
            notice: None,
            countdown: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn menu_state(&self) -> MenuState {
        self.state.menu_state()
    }

    pub fn timings(&self) -> &UiTimings {
        &self.timings
    }

    /// Whether a timed notice currently holds the screen.
    pub fn is_showing_notice(&self) -> bool {
        self.notice.is_some()
    }

    /// Recent menu state changes, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Process one keypress.
    pub fn handle_key<S, C>(&mut self, key: Key, access: &mut AccessController<S, C>) -> Vec<UiEffect>
    where
        S: CredentialStore,
        C: Clock,
    {
        let now = access.clock().now_ms();
        self.last_activity_ms = now;

        if let Some(notice) = &self.notice {
            if now < notice.until_ms {
                debug!("key ignored while notice is shown");
                return Vec::new();
            }
            self.notice = None;
        }

        let from = self.state.menu_state();
        let state = std::mem::take(&mut self.state);
        let transition = match state {
            UiState::Monitoring => Self::on_monitoring(key),
            UiState::PinEntry { buffer } => self.on_pin_entry(buffer, key, access, now),
            state @ UiState::UnlockOk { .. } => Transition::unchanged(state),
            UiState::AdminMenu => self.on_admin_menu(key, access, now),
            UiState::UserList {
                action,
                slots,
                page,
            } => self.on_user_list(action, slots, page, key, access),
            UiState::ChangePin {
                user_id,
                step,
                new_pin,
                confirm_pin,
            } => self.on_change_pin(user_id, step, new_pin, confirm_pin, key, access),
            UiState::AddUser { user_id, pin } => self.on_add_user(user_id, pin, key, access),
            UiState::ConfirmDelete { user_id } => self.on_confirm_delete(user_id, key, access),
        };

        self.apply(from, transition, access, now)
    }

    /// Advance timers: notice expiry, the unlock screen, the idle timeout
    /// and the lockout countdown on the PIN entry screen.
    pub fn tick<S, C>(&mut self, access: &mut AccessController<S, C>) -> Vec<UiEffect>
    where
        S: CredentialStore,
        C: Clock,
    {
        let now = access.clock().now_ms();
        let from = self.state.menu_state();

        if from.times_out() && now.saturating_sub(self.last_activity_ms) >= self.timings.idle_timeout_ms
        {
            debug!(state = %from, "menu idle timeout");
            self.notice = None;
            return self.apply(from, Transition::to(UiState::Monitoring), access, now);
        }

        if let Some(notice) = &self.notice {
            if now < notice.until_ms {
                return Vec::new();
            }
            self.notice = None;
            return vec![self.redraw(access)];
        }

        match &self.state {
            UiState::UnlockOk { until_ms, .. } if now >= *until_ms => {
                self.apply(from, Transition::to(UiState::Monitoring), access, now)
            }
            UiState::PinEntry { .. } => {
                let countdown = lockout_countdown(access);
                if countdown == self.countdown {
                    Vec::new()
                } else {
                    vec![self.redraw(access)]
                }
            }
            _ => Vec::new(),
        }
    }

    fn apply<S, C>(
        &mut self,
        from: MenuState,
        transition: Transition,
        access: &mut AccessController<S, C>,
        now: u64,
    ) -> Vec<UiEffect>
    where
        S: CredentialStore,
        C: Clock,
    {
        let Transition {
            next,
            notice,
            unlock,
            redraw,
        } = transition;

        let to = next.menu_state();
        if from != to {
            debug!(%from, %to, "menu transition");
            self.add_to_history(StateTransition {
                from,
                to,
                at_ms: now,
            });
        }
        self.state = next;

        let mut effects = Vec::new();
        if let Some((screen, duration_ms)) = notice {
            self.notice = Some(Notice {
                until_ms: now + duration_ms,
            });
            effects.push(UiEffect::Render(screen));
        } else if redraw {
            effects.push(self.redraw(access));
        }
        if unlock {
            access.request_unlock();
            effects.push(UiEffect::Unlock);
        }
        effects
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    fn on_monitoring(key: Key) -> Transition {
        match key {
            Key::A => Transition::to(UiState::pin_entry()),
            _ => Transition::unchanged(UiState::Monitoring),
        }
    }

    fn on_pin_entry<S, C>(
        &self,
        mut buffer: String,
        key: Key,
        access: &mut AccessController<S, C>,
        now: u64,
    ) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        if key == Key::Star {
            return Transition::to(UiState::Monitoring);
        }
        if access.is_lockout_active() {
            return Transition::to(UiState::pin_entry());
        }

        match key {
            Key::Digit(_) => {
                push_digit(&mut buffer, key);
                Transition::to(UiState::PinEntry { buffer })
            }
            Key::Hash if buffer.len() >= PIN_MIN_LEN => {
                let result = access.validate_pin(&buffer);
                if !result.success {
                    return Transition::to(UiState::pin_entry()).with_notice(
                        Screen::new("PIN SALAH", "TRY AGAIN", "", ""),
                        self.timings.failure_display_ms,
                    );
                }
                if result.is_admin {
                    return Transition::to(UiState::AdminMenu);
                }
                Transition::to(UiState::UnlockOk {
                    until_ms: now + self.timings.unlock_display_ms,
                    display_name: result.display_name,
                })
                .with_unlock()
            }
            _ => Transition::unchanged(UiState::PinEntry { buffer }),
        }
    }

    fn on_admin_menu<S, C>(
        &self,
        key: Key,
        access: &mut AccessController<S, C>,
        now: u64,
    ) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        match key {
            Key::Digit(1) => {
                info!("manual unlock from admin menu");
                Transition::to(UiState::UnlockOk {
                    until_ms: now + self.timings.unlock_display_ms,
                    display_name: "MANUAL UNLOCK".to_string(),
                })
                .with_unlock()
            }
            Key::Digit(2) => self.enter_user_list(ListAction::ChangePin, access),
            Key::Digit(3) => Transition::to(UiState::AddUser {
                user_id: access.generate_user_id(),
                pin: String::new(),
            }),
            Key::Digit(4) => self.enter_user_list(ListAction::Delete, access),
            Key::Star => Transition::to(UiState::Monitoring),
            _ => Transition::unchanged(UiState::AdminMenu),
        }
    }

    /// Snapshot the selectable users. The slot map is fixed until the list
    /// is left, so numbering stays put even if the store is sparse.
    fn enter_user_list<S, C>(&self, action: ListAction, access: &AccessController<S, C>) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        let slots: Vec<_> = access
            .store()
            .iter()
            .filter(|(slot, user)| {
                user.is_active() && !(action == ListAction::Delete && slot.is_admin())
            })
            .map(|(slot, _)| slot)
            .take(UI_MAX_SELECTABLE_USERS)
            .collect();

        if slots.is_empty() {
            return self.result(Screen::new("NO USERS", "", "", ""));
        }
        Transition::to(UiState::UserList {
            action,
            slots,
            page: 0,
        })
    }

    fn on_user_list<S, C>(
        &self,
        action: ListAction,
        slots: Vec<SlotIndex>,
        page: usize,
        key: Key,
        access: &AccessController<S, C>,
    ) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        let pages = slots.len().div_ceil(LIST_PAGE_SIZE);
        match key {
            Key::Star => Transition::to(UiState::AdminMenu),
            Key::C if page > 0 => Transition::to(UiState::UserList {
                action,
                slots,
                page: page - 1,
            }),
            Key::D if page + 1 < pages => Transition::to(UiState::UserList {
                action,
                slots,
                page: page + 1,
            }),
            Key::Digit(d) if d >= 1 && usize::from(d) <= slots.len() => {
                let slot = slots[usize::from(d) - 1];
                let Some(user) = access.store().get(slot) else {
                    return self.result(Screen::new("USER NOT FOUND", "", "", ""));
                };
                let user_id = user.user_id.clone();
                match action {
                    ListAction::ChangePin => Transition::to(UiState::ChangePin {
                        user_id,
                        step: PinStep::New,
                        new_pin: String::new(),
                        confirm_pin: String::new(),
                    }),
                    ListAction::Delete => Transition::to(UiState::ConfirmDelete { user_id }),
                }
            }
            _ => Transition::unchanged(UiState::UserList {
                action,
                slots,
                page,
            }),
        }
    }

    fn on_change_pin<S, C>(
        &self,
        user_id: String,
        step: PinStep,
        mut new_pin: String,
        mut confirm_pin: String,
        key: Key,
        access: &mut AccessController<S, C>,
    ) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        let current = match step {
            PinStep::New => &mut new_pin,
            PinStep::Confirm => &mut confirm_pin,
        };

        match key {
            Key::Star => Transition::to(UiState::AdminMenu),
            Key::Digit(_) => {
                push_digit(current, key);
                Transition::to(UiState::ChangePin {
                    user_id,
                    step,
                    new_pin,
                    confirm_pin,
                })
            }
            Key::Hash if current.len() >= PIN_MIN_LEN => match step {
                PinStep::New => Transition::to(UiState::ChangePin {
                    user_id,
                    step: PinStep::Confirm,
                    new_pin,
                    confirm_pin,
                }),
                PinStep::Confirm if new_pin != confirm_pin => {
                    self.result(Screen::new("PIN MISMATCH", "NOT CHANGED", "", ""))
                }
                PinStep::Confirm => match access.change_pin(&user_id, &new_pin) {
                    Ok(_) => self.result(Screen::new("PIN CHANGED", user_id, "", "")),
                    Err(e) => self.result(Screen::new("CHANGE FAILED", e.to_string(), "", "")),
                },
            },
            _ => Transition::unchanged(UiState::ChangePin {
                user_id,
                step,
                new_pin,
                confirm_pin,
            }),
        }
    }

    fn on_add_user<S, C>(
        &self,
        user_id: String,
        mut pin: String,
        key: Key,
        access: &mut AccessController<S, C>,
    ) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        match key {
            Key::Star => Transition::to(UiState::AdminMenu),
            Key::Digit(_) => {
                push_digit(&mut pin, key);
                Transition::to(UiState::AddUser { user_id, pin })
            }
            Key::Hash if pin.len() >= PIN_MIN_LEN => {
                match access.upsert_user(&user_id, &user_id, &pin, true) {
                    Ok(_) => self.result(Screen::new("USER ADDED", user_id, "", "")),
                    Err(e) => self.result(Screen::new("ADD FAILED", e.to_string(), "", "")),
                }
            }
            _ => Transition::unchanged(UiState::AddUser { user_id, pin }),
        }
    }

    fn on_confirm_delete<S, C>(
        &self,
        user_id: String,
        key: Key,
        access: &mut AccessController<S, C>,
    ) -> Transition
    where
        S: CredentialStore,
        C: Clock,
    {
        match key {
            Key::Digit(1) => match access.remove_user(&user_id) {
                Ok(_) => self.result(Screen::new("USER DELETED", user_id, "", "")),
                Err(e) => self.result(Screen::new("DELETE FAILED", e.to_string(), "", "")),
            },
            Key::Star => self.result(Screen::new("CANCELLED", "", "", "")),
            _ => Transition::unchanged(UiState::ConfirmDelete { user_id }),
        }
    }

    /// Show an operation result, then return to the admin menu.
    fn result(&self, screen: Screen) -> Transition {
        Transition::to(UiState::AdminMenu).with_notice(screen, self.timings.result_display_ms)
    }

    /// Render the current state and remember the countdown drawn.
    fn redraw<S, C>(&mut self, access: &AccessController<S, C>) -> UiEffect
    where
        S: CredentialStore,
        C: Clock,
    {
        self.countdown = match self.state {
            UiState::PinEntry { .. } => lockout_countdown(access),
            _ => None,
        };
        render(&self.state, access)
    }
}

impl Default for UiStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn push_digit(buffer: &mut String, key: Key) {
    if buffer.len() < PIN_MAX_LEN {
        buffer.push(key.as_char());
    }
}

fn lockout_countdown<S, C>(access: &AccessController<S, C>) -> Option<u64>
where
    S: CredentialStore,
    C: Clock,
{
    access
        .is_lockout_active()
        .then(|| access.lockout_remaining_secs())
}

fn render<S, C>(state: &UiState, access: &AccessController<S, C>) -> UiEffect
where
    S: CredentialStore,
    C: Clock,
{
    let screen = match state {
        UiState::Monitoring => return UiEffect::ShowMonitoring,
        UiState::PinEntry { buffer } => match lockout_countdown(access) {
            Some(secs) => Screen::new("KEYPAD LOCKED", format!("WAIT {secs}s"), "", "*=CANCEL"),
            None => Screen::new("ENTER PIN", masked(buffer), "", "#=OK *=CANCEL"),
        },
        UiState::UnlockOk { display_name, .. } => {
            Screen::new("ACCESS GRANTED", display_name.as_str(), "DOOR UNLOCKED", "")
        }
        UiState::AdminMenu => Screen::new(
            "ADMIN MENU",
            "1:UNLOCK 2:CHG PIN",
            "3:ADD USER",
            "4:DELETE *:EXIT",
        ),
        UiState::UserList {
            action,
            slots,
            page,
        } => {
            let title = match action {
                ListAction::ChangePin => "CHG PIN: PICK USER",
                ListAction::Delete => "DELETE: PICK USER",
            };
            let mut rows = slots
                .iter()
                .enumerate()
                .skip(page * LIST_PAGE_SIZE)
                .take(LIST_PAGE_SIZE)
                .map(|(index, slot)| {
                    let id = access
                        .store()
                        .get(*slot)
                        .map_or("?", |user| user.user_id.as_str());
                    format!("{}:{id}", index + 1)
                });
            Screen::new(
                title,
                rows.next().unwrap_or_default(),
                rows.next().unwrap_or_default(),
                rows.next().unwrap_or_default(),
            )
        }
        UiState::ChangePin {
            user_id,
            step,
            new_pin,
            confirm_pin,
        } => match step {
            PinStep::New => Screen::new(
                "CHANGE PIN",
                user_id.as_str(),
                format!("NEW: {}", masked(new_pin)),
                "#=NEXT *=CANCEL",
            ),
            PinStep::Confirm => Screen::new(
                "CHANGE PIN",
                user_id.as_str(),
                format!("CONFIRM: {}", masked(confirm_pin)),
                "#=SAVE *=CANCEL",
            ),
        },
        UiState::AddUser { user_id, pin } => Screen::new(
            "ADD USER",
            format!("ID: {user_id}"),
            format!("PIN: {}", masked(pin)),
            "#=SAVE *=CANCEL",
        ),
        UiState::ConfirmDelete { user_id } => {
            Screen::new("DELETE USER?", user_id.as_str(), "1=YES *=NO", "")
        }
    };
    UiEffect::Render(screen)
}

//! Keypad menu states.
//!
//! [`MenuState`] names where the menu is; [`UiState`] is the same state
//! together with the scratch data that state owns (typed digits, the user
//! being edited, the slot map of the user list). Scratch data lives inside
//! the variant that uses it, so leaving a state discards it.
//!
//! # Transitions
//!
//! - Monitoring --A--> PinEntry
//! - PinEntry --#--> AdminMenu | UnlockOk | PinEntry (after a notice)
//! - UnlockOk --3s--> Monitoring
//! - AdminMenu --1--> UnlockOk, --2/4--> UserList, --3--> AddUser
//! - UserList --1..9--> ChangePin | ConfirmDelete
//! - ChangePin, AddUser, ConfirmDelete --result--> AdminMenu
//! - `*` backs out of every menu state; 30 s without a key returns to
//!   Monitoring from anywhere except Monitoring and UnlockOk

use std::fmt;

use serde::{Deserialize, Serialize};
use thermogate_core::SlotIndex;

/// Where the keypad menu is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    /// Home screen showing telemetry.
    Monitoring,
    PinEntry,
    /// Door unlocked, confirmation on screen.
    UnlockOk,
    AdminMenu,
    UserList,
    ChangePin,
    AddUser,
    ConfirmDelete,
}

impl MenuState {
    /// Whether the idle timeout applies in this state.
    pub fn times_out(self) -> bool {
        !matches!(self, Self::Monitoring | Self::UnlockOk)
    }
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Monitoring => "MONITORING",
            Self::PinEntry => "PIN_ENTRY",
            Self::UnlockOk => "UNLOCK_OK",
            Self::AdminMenu => "ADMIN_MENU",
            Self::UserList => "USER_LIST",
            Self::ChangePin => "CHANGE_PIN",
            Self::AddUser => "ADD_USER",
            Self::ConfirmDelete => "CONFIRM_DELETE",
        };
        f.write_str(name)
    }
}

/// What a user picked from the list will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListAction {
    ChangePin,
    /// The administrator is never listed for deletion.
    Delete,
}

/// Which PIN the change-PIN screen is capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinStep {
    New,
    Confirm,
}

/// Menu state with its scratch data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Monitoring,

    PinEntry {
        buffer: String,
    },

    UnlockOk {
        /// Monotonic time at which the screen returns to monitoring
        until_ms: u64,
        display_name: String,
    },

    AdminMenu,

    UserList {
        action: ListAction,
        /// Store slots behind list entries 1..=9, captured on entry
        slots: Vec<SlotIndex>,
        page: usize,
    },

    ChangePin {
        user_id: String,
        step: PinStep,
        new_pin: String,
        confirm_pin: String,
    },

    AddUser {
        /// Generated when the screen is entered and kept until it is left
        user_id: String,
        pin: String,
    },

    ConfirmDelete {
        user_id: String,
    },
}

impl UiState {
    pub fn menu_state(&self) -> MenuState {
        match self {
            Self::Monitoring => MenuState::Monitoring,
            Self::PinEntry { .. } => MenuState::PinEntry,
            Self::UnlockOk { .. } => MenuState::UnlockOk,
            Self::AdminMenu => MenuState::AdminMenu,
            Self::UserList { .. } => MenuState::UserList,
            Self::ChangePin { .. } => MenuState::ChangePin,
            Self::AddUser { .. } => MenuState::AddUser,
            Self::ConfirmDelete { .. } => MenuState::ConfirmDelete,
        }
    }

    pub(crate) fn pin_entry() -> Self {
        Self::PinEntry {
            buffer: String::new(),
        }
    }
}

/// A recorded change of menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: MenuState,
    pub to: MenuState,

    /// Monotonic time of the transition in milliseconds
    pub at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MenuState::Monitoring, false)]
    #[case(MenuState::UnlockOk, false)]
    #[case(MenuState::PinEntry, true)]
    #[case(MenuState::AdminMenu, true)]
    #[case(MenuState::ConfirmDelete, true)]
    fn test_times_out(#[case] state: MenuState, #[case] expected: bool) {
        assert_eq!(state.times_out(), expected);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(MenuState::ConfirmDelete.to_string(), "CONFIRM_DELETE");
        assert_eq!(MenuState::PinEntry.to_string(), "PIN_ENTRY");
    }

    #[test]
    fn test_menu_state_of_variant() {
        let state = UiState::AddUser {
            user_id: "user1".into(),
            pin: String::new(),
        };
        assert_eq!(state.menu_state(), MenuState::AddUser);
        assert_eq!(UiState::default().menu_state(), MenuState::Monitoring);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&MenuState::UserList).unwrap();
        assert_eq!(json, "\"user_list\"");
    }
}

//! Keypad menu and virtual display for the thermogate appliance.
//!
//! This crate contains the menu state machine that sits on top of the
//! access controller in menu mode, and the 20x4 character display it draws
//! on.

pub mod display;
pub mod error;
pub mod screen;
pub mod state;
pub mod state_machine;

pub use display::{Alignment, VirtualDisplay, align_text, truncate_text};
pub use error::{Result, UiError};
pub use screen::{Screen, UiEffect};
pub use state::{ListAction, MenuState, PinStep, StateTransition, UiState};
pub use state_machine::{UiStateMachine, UiTimings};

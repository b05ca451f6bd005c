//! Keypad access control for the Thermogate appliance.
//!
//! This crate validates PIN submissions against the credential store,
//! enforces the failed-attempt lockout, manages user credentials and
//! publishes access events for the orchestrator to log.
//!
//! # Examples
//!
//! ```
//! use thermogate_access::{AccessController, AccessEventType};
//! use thermogate_core::{AccessConfig, ManualClock};
//! use thermogate_storage::SlotTable;
//!
//! let clock = ManualClock::new();
//! let config = AccessConfig::default().max_failed_attempts(1).keypad_lockout_secs(30);
//! let mut access = AccessController::new(SlotTable::default(), config, clock.clone());
//!
//! assert!(!access.validate_pin("0000").success);
//! assert!(access.is_lockout_active());
//!
//! clock.advance_ms(30_000);
//! access.update();
//!
//! let kinds: Vec<_> = access.drain_events().map(|e| e.kind).collect();
//! assert_eq!(kinds.last(), Some(&AccessEventType::LockoutEnded));
//! ```

pub mod controller;
pub mod error;
pub mod event;
pub mod messages;

pub use controller::{AccessController, AuthResult};
pub use error::{AccessError, Result};
pub use event::{AccessEvent, AccessEventType, EventQueue};
pub use messages::StatusMessages;

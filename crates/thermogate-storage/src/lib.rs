//! Credential storage for the Thermogate access controller.
//!
//! Credentials live in a fixed table of ten slots. Slot 0 always holds the
//! administrator record; the remaining slots are handed out lowest-first and
//! returned to a free list when a user is deleted, so slot numbers stay
//! stable for every other record.
//!
//! # Examples
//!
//! ```
//! use thermogate_core::PinCode;
//! use thermogate_storage::{CredentialStore, SlotTable, UserCredential};
//!
//! let mut store = SlotTable::default();
//! let hash = PinCode::new("5678").unwrap().hash();
//!
//! let slot = store
//!     .upsert(UserCredential::new("u2", "Bob", hash.clone(), true))
//!     .unwrap();
//! assert_eq!(slot.get(), 1);
//!
//! let (found, user) = store.find_by_hash(&hash).unwrap();
//! assert_eq!(found, slot);
//! assert_eq!(user.display_name, "Bob");
//! ```

pub mod credential;
pub mod error;
pub mod slot_table;
pub mod store;

pub use credential::UserCredential;
pub use error::{StorageError, StorageResult};
pub use slot_table::SlotTable;
pub use store::CredentialStore;

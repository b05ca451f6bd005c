use thermogate_core::{PinHash, SlotIndex};

use crate::credential::UserCredential;
use crate::error::StorageResult;

/// Credential store contract consumed by the access controller.
///
/// Implementations hold a fixed number of slots addressed by
/// [`SlotIndex`]. Slot 0 is the administrator slot; callers infer the
/// administrator role purely from a record living there.
///
/// The lookup helpers are provided in terms of [`get`](Self::get), so an
/// implementation only has to manage the slots themselves.
pub trait CredentialStore {
    /// Record stored in `slot`, if the slot is occupied.
    fn get(&self, slot: SlotIndex) -> Option<&UserCredential>;

    /// Insert a new record or replace the record with the same user id.
    ///
    /// Returns the slot the record now lives in.
    ///
    /// # Errors
    /// Implementations reject records without a user id and return
    /// `StorageError::StoreFull` when no slot is available.
    fn upsert(&mut self, user: UserCredential) -> StorageResult<SlotIndex>;

    /// Clear the slot holding `user_id` and return it to the free list.
    ///
    /// # Errors
    /// Returns `StorageError::UserNotFound` for unknown ids and
    /// `StorageError::AdminSlotProtected` for the administrator.
    fn remove_by_id(&mut self, user_id: &str) -> StorageResult<SlotIndex>;

    /// Occupied slots in store order.
    fn iter(&self) -> impl Iterator<Item = (SlotIndex, &UserCredential)> {
        SlotIndex::all().filter_map(move |slot| self.get(slot).map(|user| (slot, user)))
    }

    /// Linear scan for the first active record whose PIN digest matches.
    fn find_by_hash(&self, hash: &PinHash) -> Option<(SlotIndex, &UserCredential)> {
        self.iter()
            .find(|(_, user)| user.is_active() && user.pin_hash == *hash)
    }

    /// Record with the given id, enabled or not.
    fn find_by_id(&self, user_id: &str) -> Option<(SlotIndex, &UserCredential)> {
        self.iter().find(|(_, user)| user.user_id == user_id)
    }

    /// Number of active records.
    fn count(&self) -> usize {
        self.iter().filter(|(_, user)| user.is_active()).count()
    }
}

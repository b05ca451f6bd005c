//! Fixed-capacity credential table.
//!
//! The table is an arena of [`MAX_USERS`] slots plus an ordered free list.
//! Deleting a user clears its slot and returns the index to the free list;
//! no other record moves. New users always take the lowest free slot.
//!
//! The administrator invariant is enforced here rather than by callers:
//! slot 0 is occupied from construction, it is never on the free list, and
//! the record in it can be updated but not removed.

use std::collections::BTreeSet;

use thermogate_core::SlotIndex;
use thermogate_core::constants::MAX_USERS;
use tracing::{debug, warn};

use crate::credential::UserCredential;
use crate::error::{StorageError, StorageResult};
use crate::store::CredentialStore;

/// In-memory slot table implementing [`CredentialStore`].
///
/// # Examples
///
/// ```
/// use thermogate_core::PinCode;
/// use thermogate_storage::{CredentialStore, SlotTable, UserCredential};
///
/// let mut table = SlotTable::default();
/// let pin = PinCode::new("2468").unwrap();
///
/// table.upsert(UserCredential::with_pin("u1", "Alice", &pin)).unwrap();
/// table.upsert(UserCredential::with_pin("u2", "Bob", &pin)).unwrap();
/// table.remove_by_id("u1").unwrap();
///
/// // u2 keeps its slot; slot 1 is free again
/// assert_eq!(table.find_by_id("u2").unwrap().0.get(), 2);
/// assert_eq!(table.free_slots(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: Vec<Option<UserCredential>>,
    free: BTreeSet<SlotIndex>,
}

impl SlotTable {
    /// Create a table holding only the given administrator record.
    pub fn new(admin: UserCredential) -> Self {
        let mut slots = vec![None; MAX_USERS];
        slots[SlotIndex::ADMIN.get()] = Some(admin);
        let free = SlotIndex::all().filter(|slot| !slot.is_admin()).collect();
        Self { slots, free }
    }

    /// Rebuild a table from a slot snapshot, e.g. loaded from the device
    /// configuration.
    ///
    /// Empty slots may appear anywhere except slot 0. Records with an empty
    /// user id are treated as cleared slots.
    ///
    /// # Errors
    /// Returns `StorageError::InvalidSnapshot` if the snapshot has more than
    /// [`MAX_USERS`] entries or slot 0 is empty, and
    /// `StorageError::DuplicateUserId` if two records share an id.
    pub fn from_slots<I>(snapshot: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = Option<UserCredential>>,
    {
        let entries: Vec<Option<UserCredential>> = snapshot
            .into_iter()
            .map(|entry| entry.filter(|user| !user.user_id.is_empty()))
            .collect();

        if entries.len() > MAX_USERS {
            return Err(StorageError::InvalidSnapshot(format!(
                "{} entries exceed capacity {MAX_USERS}",
                entries.len()
            )));
        }

        let mut entries = entries.into_iter();
        let admin = entries
            .next()
            .flatten()
            .ok_or_else(|| StorageError::InvalidSnapshot("administrator slot is empty".into()))?;

        let mut table = Self::new(admin);
        for (index, entry) in entries.enumerate() {
            let Some(user) = entry else { continue };
            if table.find_by_id(&user.user_id).is_some() {
                return Err(StorageError::DuplicateUserId(user.user_id));
            }
            let slot = SlotIndex::new(index + 1)
                .ok_or_else(|| StorageError::InvalidSnapshot("slot out of range".into()))?;
            table.free.remove(&slot);
            table.slots[slot.get()] = Some(user);
        }
        Ok(table)
    }

    /// Copy of every slot in order, for handing to the persistence layer.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Option<UserCredential>> {
        self.slots.clone()
    }

    /// Number of slots still available to new users.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Total number of slots, including the administrator slot.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for SlotTable {
    /// A table with the factory administrator record.
    fn default() -> Self {
        Self::new(UserCredential::factory_admin())
    }
}

impl CredentialStore for SlotTable {
    fn get(&self, slot: SlotIndex) -> Option<&UserCredential> {
        self.slots.get(slot.get()).and_then(Option::as_ref)
    }

    fn upsert(&mut self, user: UserCredential) -> StorageResult<SlotIndex> {
        if user.user_id.is_empty() {
            return Err(StorageError::MissingUserId);
        }

        let existing = self.find_by_id(&user.user_id).map(|(slot, _)| slot);
        if let Some(slot) = existing {
            debug!(slot = %slot, user_id = %user.user_id, "updating credential");
            self.slots[slot.get()] = Some(user);
            return Ok(slot);
        }

        let Some(slot) = self.free.pop_first() else {
            warn!(user_id = %user.user_id, "credential store full");
            return Err(StorageError::StoreFull {
                capacity: self.capacity(),
            });
        };

        debug!(slot = %slot, user_id = %user.user_id, "adding credential");
        self.slots[slot.get()] = Some(user);
        Ok(slot)
    }

    fn remove_by_id(&mut self, user_id: &str) -> StorageResult<SlotIndex> {
        let slot = self
            .find_by_id(user_id)
            .map(|(slot, _)| slot)
            .ok_or_else(|| StorageError::UserNotFound(user_id.to_string()))?;

        if slot.is_admin() {
            return Err(StorageError::AdminSlotProtected);
        }

        debug!(slot = %slot, user_id, "removing credential");
        self.slots[slot.get()] = None;
        self.free.insert(slot);
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use thermogate_core::PinCode;

    fn user(id: &str, pin: &str) -> UserCredential {
        UserCredential::with_pin(id, id.to_uppercase(), &PinCode::new(pin).unwrap())
    }

    #[fixture]
    fn table() -> SlotTable {
        SlotTable::default()
    }

    #[rstest]
    fn test_default_table_has_admin_only(table: SlotTable) {
        assert_eq!(table.capacity(), MAX_USERS);
        assert_eq!(table.free_slots(), MAX_USERS - 1);
        assert_eq!(table.count(), 1);
        assert_eq!(table.get(SlotIndex::ADMIN).unwrap().user_id, "admin");
    }

    #[rstest]
    fn test_new_users_take_lowest_free_slot(mut table: SlotTable) {
        assert_eq!(table.upsert(user("u1", "1111")).unwrap().get(), 1);
        assert_eq!(table.upsert(user("u2", "2222")).unwrap().get(), 2);

        table.remove_by_id("u1").unwrap();
        assert_eq!(table.upsert(user("u3", "3333")).unwrap().get(), 1);
    }

    #[rstest]
    fn test_upsert_existing_id_keeps_slot(mut table: SlotTable) {
        let slot = table.upsert(user("u1", "1111")).unwrap();
        let again = table.upsert(user("u1", "9999")).unwrap();

        assert_eq!(slot, again);
        assert_eq!(table.count(), 2);
        let stored = table.get(slot).unwrap();
        assert_eq!(stored.pin_hash, PinCode::new("9999").unwrap().hash());
    }

    #[rstest]
    fn test_upsert_admin_updates_slot_zero(mut table: SlotTable) {
        let slot = table.upsert(user("admin", "8642")).unwrap();
        assert!(slot.is_admin());
        assert_eq!(table.free_slots(), MAX_USERS - 1);
    }

    #[rstest]
    fn test_upsert_rejects_empty_id(mut table: SlotTable) {
        let result = table.upsert(user("", "1234"));
        assert_eq!(result, Err(StorageError::MissingUserId));
    }

    #[rstest]
    fn test_store_full(mut table: SlotTable) {
        for i in 1..MAX_USERS {
            table.upsert(user(&format!("u{i}"), "1234")).unwrap();
        }
        let result = table.upsert(user("overflow", "1234"));

        assert_eq!(result, Err(StorageError::StoreFull { capacity: MAX_USERS }));
        assert!(table.find_by_id("overflow").is_none());
    }

    #[rstest]
    fn test_admin_cannot_be_removed(mut table: SlotTable) {
        assert_eq!(
            table.remove_by_id("admin"),
            Err(StorageError::AdminSlotProtected)
        );
        assert!(table.get(SlotIndex::ADMIN).is_some());
    }

    #[rstest]
    fn test_remove_unknown_user(mut table: SlotTable) {
        assert_eq!(
            table.remove_by_id("ghost"),
            Err(StorageError::UserNotFound("ghost".to_string()))
        );
    }

    #[rstest]
    fn test_find_by_hash_skips_disabled(mut table: SlotTable) {
        let mut disabled = user("u1", "5555");
        disabled.enabled = false;
        table.upsert(disabled).unwrap();

        let hash = PinCode::new("5555").unwrap().hash();
        assert!(table.find_by_hash(&hash).is_none());
        assert!(table.find_by_id("u1").is_some());
        assert_eq!(table.count(), 1);
    }

    #[rstest]
    fn test_find_by_hash_returns_first_match(mut table: SlotTable) {
        table.upsert(user("u1", "5555")).unwrap();
        table.upsert(user("u2", "5555")).unwrap();

        let hash = PinCode::new("5555").unwrap().hash();
        let (slot, found) = table.find_by_hash(&hash).unwrap();
        assert_eq!(slot.get(), 1);
        assert_eq!(found.user_id, "u1");
    }

    #[test]
    fn test_from_slots_keeps_sparse_layout() {
        let snapshot = vec![
            Some(UserCredential::factory_admin()),
            None,
            Some(user("u2", "2222")),
            None,
            Some(user("u4", "4444")),
        ];
        let mut table = SlotTable::from_slots(snapshot).unwrap();

        assert_eq!(table.find_by_id("u4").unwrap().0.get(), 4);
        assert_eq!(table.free_slots(), MAX_USERS - 3);
        assert_eq!(table.upsert(user("new", "1234")).unwrap().get(), 1);
    }

    #[test]
    fn test_from_slots_treats_blank_ids_as_cleared() {
        let snapshot = vec![Some(UserCredential::factory_admin()), Some(user("", "1111"))];
        let table = SlotTable::from_slots(snapshot).unwrap();
        assert!(table.get(SlotIndex::new(1).unwrap()).is_none());
    }

    #[test]
    fn test_from_slots_requires_admin() {
        let result = SlotTable::from_slots(vec![None, Some(user("u1", "1111"))]);
        assert!(matches!(result, Err(StorageError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_from_slots_rejects_duplicates() {
        let snapshot = vec![
            Some(UserCredential::factory_admin()),
            Some(user("u1", "1111")),
            Some(user("u1", "2222")),
        ];
        assert_eq!(
            SlotTable::from_slots(snapshot).unwrap_err(),
            StorageError::DuplicateUserId("u1".to_string())
        );
    }

    #[test]
    fn test_from_slots_rejects_oversized_snapshot() {
        let snapshot = vec![Some(UserCredential::factory_admin()); MAX_USERS + 1];
        assert!(matches!(
            SlotTable::from_slots(snapshot),
            Err(StorageError::InvalidSnapshot(_))
        ));
    }

    #[rstest]
    fn test_snapshot_round_trip(mut table: SlotTable) {
        table.upsert(user("u1", "1111")).unwrap();
        table.upsert(user("u2", "2222")).unwrap();
        table.remove_by_id("u1").unwrap();

        let rebuilt = SlotTable::from_slots(table.snapshot()).unwrap();
        assert_eq!(rebuilt.find_by_id("u2").unwrap().0.get(), 2);
        assert_eq!(rebuilt.free_slots(), table.free_slots());
    }
}

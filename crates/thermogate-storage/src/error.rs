use thiserror::Error;

/// Credential store error types.
///
/// These errors represent rejected writes against the fixed-capacity slot
/// table. None of them leave the table partially modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Every non-administrator slot is occupied
    #[error("Credential store full ({capacity} slots)")]
    StoreFull { capacity: usize },

    /// No record carries the requested user id
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The administrator record cannot be removed or displaced
    #[error("Administrator slot is protected")]
    AdminSlotProtected,

    /// A record was submitted without a user id
    #[error("User id is required")]
    MissingUserId,

    /// Two records in a snapshot share a user id
    #[error("Duplicate user id: {0}")]
    DuplicateUserId(String),

    /// A snapshot does not fit the slot table
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

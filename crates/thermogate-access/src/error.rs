use thermogate_storage::StorageError;
use thiserror::Error;

/// Errors reported by credential management operations.
///
/// The `Display` text of each variant is the message shown to the operator,
/// so callers can surface it verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("userId required")]
    MissingUserId,

    #[error("pin must be 4-8 numeric digits")]
    InvalidPinFormat,

    #[error("user not found")]
    UserNotFound,

    #[error("admin user cannot be removed")]
    AdminProtected,

    /// The store rejected the write, typically because every slot is taken
    #[error("failed to save user")]
    SaveFailed(#[source] StorageError),
}

impl From<StorageError> for AccessError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::MissingUserId => Self::MissingUserId,
            StorageError::UserNotFound(_) => Self::UserNotFound,
            StorageError::AdminSlotProtected => Self::AdminProtected,
            other => Self::SaveFailed(other),
        }
    }
}

/// Result type for credential management operations
pub type Result<T> = std::result::Result<T, AccessError>;

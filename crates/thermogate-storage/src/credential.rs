use serde::{Deserialize, Serialize};
use thermogate_core::constants::{DEFAULT_ADMIN_ID, DEFAULT_ADMIN_NAME};
use thermogate_core::{PinCode, PinHash};

/// A keypad user record.
///
/// Serialized field names follow the compact keys used by the device
/// configuration file (`id`, `n`, `ph`, `e`) so existing credential data
/// keeps loading unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    /// Unique user identifier
    #[serde(rename = "id")]
    pub user_id: String,

    /// Name shown on the display and in access logs
    #[serde(rename = "n")]
    pub display_name: String,

    /// Hex SHA-256 digest of the PIN
    #[serde(rename = "ph")]
    pub pin_hash: PinHash,

    /// Disabled records are kept but never match a PIN
    #[serde(rename = "e", default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl UserCredential {
    /// Create a record from an already-hashed PIN.
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        pin_hash: PinHash,
        enabled: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            pin_hash,
            enabled,
        }
    }

    /// Create an enabled record by hashing a plaintext PIN.
    pub fn with_pin(user_id: impl Into<String>, display_name: impl Into<String>, pin: &PinCode) -> Self {
        Self::new(user_id, display_name, pin.hash(), true)
    }

    /// The factory administrator record (`admin` / PIN `1234`).
    pub fn factory_admin() -> Self {
        Self {
            user_id: DEFAULT_ADMIN_ID.to_string(),
            display_name: DEFAULT_ADMIN_NAME.to_string(),
            pin_hash: PinHash::factory_admin(),
            enabled: true,
        }
    }

    /// Whether this record may authenticate.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.user_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermogate_core::constants::DEFAULT_ADMIN_HASH;

    #[test]
    fn test_factory_admin_matches_default_pin() {
        let admin = UserCredential::factory_admin();
        let pin = PinCode::new("1234").unwrap();

        assert_eq!(admin.user_id, "admin");
        assert_eq!(admin.pin_hash, pin.hash());
        assert!(admin.is_active());
    }

    #[test]
    fn test_compact_serde_keys() {
        let user = UserCredential::with_pin("u1", "Alice", &PinCode::new("4321").unwrap());
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], "u1");
        assert_eq!(json["n"], "Alice");
        assert_eq!(json["e"], true);
        assert_eq!(json["ph"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_missing_enabled_defaults_to_true() {
        let json = format!(r#"{{"id":"u3","n":"Carol","ph":"{DEFAULT_ADMIN_HASH}"}}"#);
        let user: UserCredential = serde_json::from_str(&json).unwrap();
        assert!(user.enabled);
    }

    #[test]
    fn test_disabled_record_is_not_active() {
        let mut user = UserCredential::factory_admin();
        user.enabled = false;
        assert!(!user.is_active());
    }
}

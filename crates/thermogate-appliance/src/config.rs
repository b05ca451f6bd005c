//! Loading the device configuration from TOML.
//!
//! Every field is optional; anything missing keeps its factory default.
//!
//! ```toml
//! device_id = "lab-door"
//! max_failed_attempts = 5
//! keypad_lockout_secs = 300
//! ui_mode = "basic"
//!
//! [thermal]
//! warn_threshold_c = 26.0
//! stage2_threshold_c = 29.0
//! ```

use std::path::Path;

use thermogate_core::AccessConfig;

use crate::error::{ApplianceError, Result};

/// Parse and validate a TOML configuration document.
///
/// # Errors
/// `ConfigParse` for malformed TOML or mistyped fields, `InvalidConfig` if
/// the values fail [`AccessConfig::validate`].
pub fn parse_config(text: &str) -> Result<AccessConfig> {
    let config: AccessConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate a TOML configuration file.
///
/// # Errors
/// `ConfigRead` if the file cannot be read, otherwise as
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<AccessConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ApplianceError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermogate_core::UiMode;

    #[test]
    fn test_empty_document_is_factory_default() {
        assert_eq!(parse_config("").unwrap(), AccessConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = parse_config(
            r#"
            device_id = "lab-door"
            solenoid_unlock_secs = 4
            ui_mode = "basic"
            "#,
        )
        .unwrap();

        assert_eq!(config.device_id, "lab-door");
        assert_eq!(config.solenoid_unlock_secs, 4);
        assert_eq!(config.ui_mode, UiMode::Basic);
        assert_eq!(config.max_failed_attempts, 3);
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result = parse_config("max_failed_attempts = \"three\"");
        assert!(matches!(result, Err(ApplianceError::ConfigParse(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = parse_config("keypad_lockout_secs = 0");
        assert!(matches!(result, Err(ApplianceError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/thermogate.toml"));
        assert!(matches!(result, Err(ApplianceError::ConfigRead { .. })));
    }
}

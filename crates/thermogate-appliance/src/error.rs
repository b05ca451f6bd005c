use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while bringing the appliance up.
///
/// Once running, the control loop does not fail: peripheral errors are
/// logged and the peripheral is treated as absent.
#[derive(Debug, Error)]
pub enum ApplianceError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    InvalidConfig(#[from] thermogate_core::Error),
}

/// Result type for appliance operations
pub type Result<T> = std::result::Result<T, ApplianceError>;

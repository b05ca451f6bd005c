use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Credential errors
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    #[error("Invalid PIN digest: {0}")]
    InvalidDigest(String),

    // Keypad errors
    #[error("Invalid key: {0:?}")]
    InvalidKey(char),

    #[error("Invalid digit: {0}")]
    InvalidDigit(u8),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

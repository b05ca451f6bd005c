use thiserror::Error;

/// Errors raised by the virtual display.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UiError {
    #[error("Invalid display line {line} (max: {max})")]
    InvalidLine { line: usize, max: usize },
}

/// Result type for UI operations
pub type Result<T> = std::result::Result<T, UiError>;

//! Mock keypad implementation for testing and development.
//!
//! Keys are injected through a cloneable [`MockKeypadHandle`] and delivered
//! one per [`poll_key`](KeySource::poll_key) call, in the order they were
//! sent.

use thermogate_core::Key;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::{HardwareError, Result, traits::KeySource, types::DeviceInfo};

/// Number of keypresses the mock buffers before senders have to wait.
const KEY_BUFFER: usize = 64;

/// Mock keypad device for testing and development.
///
/// # Examples
///
/// ```
/// use thermogate_core::Key;
/// use thermogate_hardware::mock::MockKeypad;
/// use thermogate_hardware::traits::KeySource;
///
/// let (mut keypad, handle) = MockKeypad::new();
///
/// handle.try_send_keys("A12#").unwrap();
///
/// assert_eq!(keypad.poll_key().unwrap(), Some(Key::A));
/// assert_eq!(keypad.poll_key().unwrap(), Some(Key::Digit(1)));
/// assert_eq!(keypad.poll_key().unwrap(), Some(Key::Digit(2)));
/// assert_eq!(keypad.poll_key().unwrap(), Some(Key::Hash));
/// assert_eq!(keypad.poll_key().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated keypresses
    key_rx: mpsc::Receiver<Key>,

    /// Device name
    name: String,
}

impl MockKeypad {
    /// Create a new mock keypad with the default name.
    ///
    /// Returns the keypad and a handle used to simulate keypresses.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_name("Mock Keypad")
    }

    /// Create a new mock keypad with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockKeypadHandle) {
        let name = name.into();
        let (key_tx, key_rx) = mpsc::channel(KEY_BUFFER);

        let keypad = Self {
            key_rx,
            name: name.clone(),
        };
        let handle = MockKeypadHandle { key_tx, name };

        (keypad, handle)
    }
}

impl KeySource for MockKeypad {
    fn poll_key(&mut self) -> Result<Option<Key>> {
        match self.key_rx.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected(&self.name)),
        }
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock 4x4 Keypad").with_firmware_version("1.0.0")
    }
}

/// Handle for controlling a mock keypad.
///
/// The handle can be cloned and shared across tasks. Dropping every handle
/// disconnects the keypad once its buffered keys are drained.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated keypresses
    key_tx: mpsc::Sender<Key>,

    /// Device name
    name: String,
}

impl MockKeypadHandle {
    /// Send a keypress, waiting for buffer space if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_key(&self, key: Key) -> Result<()> {
        self.key_tx
            .send(key)
            .await
            .map_err(|_| HardwareError::disconnected(&self.name))
    }

    /// Send a keypress without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped or the buffer is full.
    pub fn try_send_key(&self, key: Key) -> Result<()> {
        self.key_tx.try_send(key).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => HardwareError::other("keypad buffer full"),
            mpsc::error::TrySendError::Closed(_) => HardwareError::disconnected(&self.name),
        })
    }

    /// Send every key printed in `keys`, e.g. `"A1234#"`.
    ///
    /// # Errors
    ///
    /// Returns an error if a character is not on the keypad or the keypad
    /// has been dropped. Keys before the offending character are delivered.
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        for c in keys.chars() {
            self.send_key(Key::from_char(c)?).await?;
        }
        Ok(())
    }

    /// Non-waiting variant of [`send_keys`](Self::send_keys).
    ///
    /// # Errors
    ///
    /// Same as [`send_keys`](Self::send_keys), plus buffer overflow.
    pub fn try_send_keys(&self, keys: &str) -> Result<()> {
        for c in keys.chars() {
            self.try_send_key(Key::from_char(c)?)?;
        }
        Ok(())
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

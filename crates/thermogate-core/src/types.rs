use crate::{
    Result,
    constants::{ADMIN_SLOT, DEFAULT_ADMIN_HASH, MAX_USERS, PIN_HASH_HEX_LEN, PIN_MAX_LEN, PIN_MIN_LEN},
    error::Error,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// A single key from the 4x4 matrix keypad.
///
/// The physical layout is:
///
/// ```text
/// 1 2 3 A
/// 4 5 6 B
/// 7 8 9 C
/// * 0 # D
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Numeric digit (0-9).
    Digit(u8),
    A,
    B,
    C,
    D,
    /// Star key (*), used as clear/cancel.
    Star,
    /// Hash key (#), used as submit/confirm.
    Hash,
}

impl Key {
    /// Create a digit key.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermogate_core::Key;
    ///
    /// assert_eq!(Key::digit(5).unwrap().as_digit(), Some(5));
    /// assert!(Key::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(Error::InvalidDigit(d));
        }
        Ok(Self::Digit(d))
    }

    /// Parse the character printed on a keypad key.
    ///
    /// # Errors
    /// Returns `Error::InvalidKey` for characters outside `0-9`, `A-D`, `*`, `#`.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '0'..='9' => Ok(Self::Digit(c as u8 - b'0')),
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            '*' => Ok(Self::Star),
            '#' => Ok(Self::Hash),
            other => Err(Error::InvalidKey(other)),
        }
    }

    /// The character printed on this key.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d.min(9)),
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// Returns `true` if this is a digit key.
    #[inline]
    #[must_use]
    pub fn is_digit(self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit key.
    #[inline]
    #[must_use]
    pub fn as_digit(self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::from_char(c),
            _ => Err(Error::InvalidKey(s.chars().next().unwrap_or(' '))),
        }
    }
}

/// Check whether `pin` is 4-8 ASCII digits.
///
/// # Examples
///
/// ```
/// use thermogate_core::is_valid_pin_format;
///
/// assert!(is_valid_pin_format("1234"));
/// assert!(!is_valid_pin_format("12a4"));
/// assert!(!is_valid_pin_format("123456789"));
/// ```
#[must_use]
pub fn is_valid_pin_format(pin: &str) -> bool {
    (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}

/// A syntactically valid PIN (4-8 ASCII digits).
///
/// # Security
/// `Debug` output is redacted so PIN digits never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PinCode(String);

impl PinCode {
    /// Validate and wrap a PIN.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if the PIN is not 4-8 ASCII digits.
    pub fn new(pin: &str) -> Result<Self> {
        if !is_valid_pin_format(pin) {
            return Err(Error::InvalidPin(format!(
                "PIN must be {PIN_MIN_LEN}-{PIN_MAX_LEN} numeric digits, got {} chars",
                pin.len()
            )));
        }
        Ok(PinCode(pin.to_string()))
    }

    /// Get the PIN digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hash this PIN for storage or comparison.
    #[must_use]
    pub fn hash(&self) -> PinHash {
        PinHash::of(self)
    }
}

impl fmt::Debug for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PinCode(****)")
    }
}

impl std::str::FromStr for PinCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PinCode::new(s)
    }
}

/// Hex-encoded SHA-256 digest of a PIN (64 lowercase hex characters).
///
/// A single unsalted round, matching the credential format already deployed
/// on devices.
///
/// # Security
/// Equality is constant-time to avoid leaking how much of a digest matched.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinHash(String);

impl PinHash {
    /// Digest a PIN.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermogate_core::{PinCode, PinHash};
    ///
    /// let pin = PinCode::new("1234").unwrap();
    /// assert_eq!(
    ///     PinHash::of(&pin).as_str(),
    ///     "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
    /// );
    /// ```
    #[must_use]
    pub fn of(pin: &PinCode) -> Self {
        PinHash(hex::encode(Sha256::digest(pin.as_str().as_bytes())))
    }

    /// Wrap an existing hex digest, normalising to lowercase.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigest` if the input is not 64 hex characters.
    pub fn from_hex(digest: &str) -> Result<Self> {
        let digest = digest.trim().to_ascii_lowercase();
        if digest.len() != PIN_HASH_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidDigest(format!(
                "expected {PIN_HASH_HEX_LEN} hex characters, got {}",
                digest.len()
            )));
        }
        Ok(PinHash(digest))
    }

    /// Digest of the factory administrator PIN.
    #[must_use]
    pub fn factory_admin() -> Self {
        PinHash(DEFAULT_ADMIN_HASH.to_string())
    }

    /// Get the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for PinHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for PinHash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl TryFrom<String> for PinHash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        PinHash::from_hex(&value)
    }
}

impl From<PinHash> for String {
    fn from(value: PinHash) -> Self {
        value.0
    }
}

impl fmt::Display for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a credential slot (0-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// The administrator slot.
    pub const ADMIN: SlotIndex = SlotIndex(ADMIN_SLOT);

    /// Create a slot index with validation.
    ///
    /// Returns `None` if the index is outside the store capacity.
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        (index < MAX_USERS).then_some(SlotIndex(index))
    }

    /// Get the raw index.
    #[inline]
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    /// Returns `true` for the administrator slot.
    #[inline]
    #[must_use]
    pub fn is_admin(self) -> bool {
        self.0 == ADMIN_SLOT
    }

    /// Iterate every slot index in store order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..MAX_USERS).map(SlotIndex)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

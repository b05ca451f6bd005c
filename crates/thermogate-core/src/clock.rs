//! Time sources for deadline tracking.
//!
//! Lockout expiry, the idle timeout and every display delay are modelled as
//! deadlines compared against a monotonic millisecond counter. Wall-clock
//! time is only used to stamp epochs into access events, and may be
//! unsynchronised right after boot.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use thermogate_core::{Clock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let deadline = clock.now_ms() + 3_000;
//!
//! clock.advance(Duration::from_secs(2));
//! assert!(clock.now_ms() < deadline);
//!
//! clock.advance(Duration::from_secs(1));
//! assert!(clock.now_ms() >= deadline);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

/// Source of monotonic and wall-clock time.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin. Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Seconds since the Unix epoch, as far as the device knows.
    fn unix_secs(&self) -> u64;
}

/// Clock backed by [`Instant`] and the system wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose monotonic origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn unix_secs(&self) -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for deterministic tests and simulations.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and advance the clock owned by the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
    unix_secs: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at monotonic time zero and Unix time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at monotonic time zero with the given wall-clock time.
    pub fn with_unix_secs(unix_secs: u64) -> Self {
        let clock = Self::new();
        clock.set_unix_secs(unix_secs);
        clock
    }

    /// Move both monotonic and wall-clock time forward.
    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
        self.unix_secs.fetch_add(by.as_secs(), Ordering::SeqCst);
    }

    /// Move monotonic time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Set wall-clock time, leaving monotonic time untouched.
    pub fn set_unix_secs(&self, unix_secs: u64) {
        self.unix_secs.store(unix_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn unix_secs(&self) -> u64 {
        self.unix_secs.load(Ordering::SeqCst)
    }
}

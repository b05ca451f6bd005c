//! Access events and the bounded outbound queue.
//!
//! Every grant, denial and lockout edge produces one [`AccessEvent`]. The
//! orchestrator drains them once per tick. The queue never blocks and never
//! grows past [`EVENT_QUEUE_CAPACITY`]: when full, the oldest event is
//! dropped to make room.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use thermogate_core::constants::EVENT_QUEUE_CAPACITY;
use tracing::warn;

/// Kind of access event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessEventType {
    AccessGranted,
    AccessDenied,
    LockoutStarted,
    LockoutEnded,
}

impl AccessEventType {
    /// Result column of the access log: `GRANTED`, `DENIED`, `LOCKOUT` or
    /// `INFO`.
    pub fn result(self) -> &'static str {
        match self {
            Self::AccessGranted => "GRANTED",
            Self::AccessDenied => "DENIED",
            Self::LockoutStarted => "LOCKOUT",
            Self::LockoutEnded => "INFO",
        }
    }

    /// Reason column of the access log.
    pub fn reason(self) -> &'static str {
        match self {
            Self::AccessGranted => "VALID_PIN",
            Self::AccessDenied => "INVALID_PIN",
            Self::LockoutStarted => "MAX_FAILED_ATTEMPTS",
            Self::LockoutEnded => "LOCKOUT_ENDED",
        }
    }
}

impl fmt::Display for AccessEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AccessGranted => "AccessGranted",
            Self::AccessDenied => "AccessDenied",
            Self::LockoutStarted => "LockoutStarted",
            Self::LockoutEnded => "LockoutEnded",
        };
        f.write_str(name)
    }
}

/// One access-control event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub kind: AccessEventType,

    /// Matched user, for grants only.
    pub user_id: Option<String>,

    /// Matched user's display name, for grants only.
    pub display_name: Option<String>,

    /// Consecutive failures at the time of the event. For `LockoutStarted`
    /// this is the configured threshold.
    pub failed_count: u8,

    /// Wall-clock end of the lockout, for `LockoutStarted` only.
    pub lockout_until_epoch: Option<u64>,
}

impl AccessEvent {
    pub fn granted(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind: AccessEventType::AccessGranted,
            user_id: Some(user_id.into()),
            display_name: Some(display_name.into()),
            failed_count: 0,
            lockout_until_epoch: None,
        }
    }

    pub fn denied(failed_count: u8) -> Self {
        Self::bare(AccessEventType::AccessDenied, failed_count)
    }

    pub fn lockout_started(threshold: u8, until_epoch: u64) -> Self {
        Self {
            lockout_until_epoch: Some(until_epoch),
            ..Self::bare(AccessEventType::LockoutStarted, threshold)
        }
    }

    pub fn lockout_ended(failed_count: u8) -> Self {
        Self::bare(AccessEventType::LockoutEnded, failed_count)
    }

    fn bare(kind: AccessEventType, failed_count: u8) -> Self {
        Self {
            kind,
            user_id: None,
            display_name: None,
            failed_count,
            lockout_until_epoch: None,
        }
    }

    /// See [`AccessEventType::result`].
    pub fn result(&self) -> &'static str {
        self.kind.result()
    }

    /// See [`AccessEventType::reason`].
    pub fn reason(&self) -> &'static str {
        self.kind.reason()
    }
}

/// FIFO of pending events with drop-oldest overflow.
///
/// # Examples
///
/// ```
/// use thermogate_access::{AccessEvent, EventQueue};
///
/// let mut queue = EventQueue::with_capacity(2);
/// queue.push(AccessEvent::denied(1));
/// queue.push(AccessEvent::denied(2));
/// queue.push(AccessEvent::denied(3));
///
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.pop().unwrap().failed_count, 2);
/// ```
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<AccessEvent>,
    capacity: usize,
    dropped: u64,
}

impl EventQueue {
    /// Queue holding at most [`EVENT_QUEUE_CAPACITY`] events.
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    /// Queue with a custom bound. A bound of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append an event, returning the oldest one if it had to be dropped.
    pub fn push(&mut self, event: AccessEvent) -> Option<AccessEvent> {
        self.events.push_back(event);
        if self.events.len() <= self.capacity {
            return None;
        }
        self.dropped += 1;
        let evicted = self.events.pop_front();
        if let Some(old) = &evicted {
            warn!(kind = %old.kind, dropped_total = self.dropped, "event queue full, dropping oldest");
        }
        evicted
    }

    /// Remove and return the oldest event.
    pub fn pop(&mut self) -> Option<AccessEvent> {
        self.events.pop_front()
    }

    /// Remove every pending event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = AccessEvent> + '_ {
        self.events.drain(..)
    }

    /// Pending events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &AccessEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped on overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

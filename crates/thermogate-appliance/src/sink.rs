//! Destinations for access log records.

use std::collections::VecDeque;

use thermogate_core::constants::EVENT_QUEUE_CAPACITY;
use tracing::{info, warn};

use crate::access_log::AccessLogRecord;

/// Receives access log records from the control loop.
///
/// Called from inside the tick, so implementations must not block.
pub trait EventSink {
    fn record(&mut self, record: AccessLogRecord);
}

/// Writes every record to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn record(&mut self, record: AccessLogRecord) {
        info!(
            device_id = %record.device_id,
            user_id = %record.user_id,
            result = %record.result,
            reason = %record.reason,
            failed_count = record.failed_count,
            lockout_until = record.lockout_until,
            door = %record.door_state,
            "access log"
        );
    }
}

/// Keeps the most recent records in memory for later delivery.
///
/// Bounded like the controller's event queue: when full, the oldest record
/// is dropped.
///
/// # Examples
///
/// ```
/// use thermogate_access::AccessEvent;
/// use thermogate_appliance::{AccessLogRecord, BufferedSink, DoorState, EventSink};
///
/// let mut sink = BufferedSink::with_capacity(1);
/// for count in 1..=2 {
///     let event = AccessEvent::denied(count);
///     sink.record(AccessLogRecord::from_event(&event, "door", "t".into(), DoorState::Locked));
/// }
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.dropped(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct BufferedSink {
    records: VecDeque<AccessLogRecord>,
    capacity: usize,
    dropped: u64,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    /// Capacity is at least one record.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &AccessLogRecord> {
        self.records.iter()
    }

    /// Remove and return all buffered records, oldest first.
    pub fn drain(&mut self) -> Vec<AccessLogRecord> {
        self.records.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for BufferedSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BufferedSink {
    fn record(&mut self, record: AccessLogRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
            self.dropped += 1;
            warn!(capacity = self.capacity, "access log buffer full, dropped oldest record");
        }
        self.records.push_back(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::DoorState;
    use thermogate_access::AccessEvent;

    fn record(failed_count: u8) -> AccessLogRecord {
        AccessLogRecord::from_event(
            &AccessEvent::denied(failed_count),
            "door",
            "t".into(),
            DoorState::Locked,
        )
    }

    #[test]
    fn test_default_capacity() {
        let mut sink = BufferedSink::new();
        for i in 0..60 {
            sink.record(record(i));
        }

        assert_eq!(sink.len(), 50);
        assert_eq!(sink.dropped(), 10);
        assert_eq!(sink.records().next().unwrap().failed_count, 10);
    }

    #[test]
    fn test_drain_empties_buffer() {
        let mut sink = BufferedSink::new();
        sink.record(record(1));
        sink.record(record(2));

        let drained: Vec<_> = sink.drain().into_iter().map(|r| r.failed_count).collect();

        assert_eq!(drained, vec![1, 2]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_sink_accepts_records() {
        let mut sink = TracingSink::new();
        sink.record(record(1));
    }
}

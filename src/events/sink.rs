//! Metrics sink seam
//!
//! The core only knows the [`MetricsSink`] trait; how events are persisted is
//! up to the implementation.

use parking_lot::Mutex;

use super::ParkEvent;

/// Receiver of park events
///
/// Implementations must be callable from any actor thread and must never
/// call back into rides or queues.
pub trait MetricsSink: Send + Sync {
    /// Record one event
    fn record(&self, event: ParkEvent);
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ParkEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events in arrival order
    pub fn events(&self) -> Vec<ParkEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events with the given name
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl MetricsSink for MemorySink {
    fn record(&self, event: ParkEvent) {
        self.events.lock().push(event);
    }
}

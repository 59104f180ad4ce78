//! Event tracking system for monitoring application events
//!
//! Tracks every AppEvent dispatch and receipt, providing visibility into the
//! event flow between the IO thread, the timers and the UI thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Global event counter
static EVENT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Event history for debugging
static EVENT_HISTORY: Lazy<Mutex<EventHistory>> = Lazy::new(|| {
    Mutex::new(EventHistory::new(100)) // Keep last 100 events
});

/// Event tracking information
#[derive(Debug, Clone)]
pub struct EventInfo {
    pub event_id: u64,
    pub event_type: &'static str,
    pub thread: Option<String>,
    pub sent_at: Instant,
    pub received_at: Option<Instant>,
}

impl EventInfo {
    pub fn is_received(&self) -> bool {
        self.received_at.is_some()
    }
}

/// Ring buffer of recent events
struct EventHistory {
    events: VecDeque<EventInfo>,
    max_size: usize,
}

impl EventHistory {
    fn new(max_size: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    fn push(&mut self, event: EventInfo) {
        if self.events.len() >= self.max_size {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn recent(&self, count: usize) -> Vec<EventInfo> {
        self.events.iter().rev().take(count).cloned().collect()
    }

    fn pending_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_received()).count()
    }

    /// Channel order is FIFO, so the oldest pending event of a type is the one received.
    fn mark_received(&mut self, event_type: &str) -> Option<u64> {
        let event = self
            .events
            .iter_mut()
            .find(|e| !e.is_received() && e.event_type == event_type)?;
        event.received_at = Some(Instant::now());
        Some(event.event_id)
    }
}

/// Track an event dispatch. Returns the id assigned to it.
pub fn track_event_send(event_type: &'static str) -> u64 {
    let event_id = EVENT_COUNTER.fetch_add(1, Ordering::Relaxed);
    let thread = std::thread::current().name().map(str::to_string);

    tracing::debug!(event_id, event_type, thread = ?thread, "Event dispatched");

    EVENT_HISTORY.lock().push(EventInfo {
        event_id,
        event_type,
        thread,
        sent_at: Instant::now(),
        received_at: None,
    });
    event_id
}

/// Track an event receipt on the UI thread
pub fn track_event_receive(event_type: &str) {
    let event_id = EVENT_HISTORY.lock().mark_received(event_type);
    tracing::trace!(event_id = ?event_id, event_type, "Event received");
}

/// Most recent events, newest first
pub fn recent_events(count: usize) -> Vec<EventInfo> {
    EVENT_HISTORY.lock().recent(count)
}

/// Get count of pending (not yet received) events
pub fn pending_event_count() -> usize {
    EVENT_HISTORY.lock().pending_count()
}

/// Get total event count
pub fn total_event_count() -> u64 {
    EVENT_COUNTER.load(Ordering::Relaxed)
}

/// Log event queue statistics
pub fn log_event_stats() {
    tracing::info!(
        total_events = total_event_count(),
        pending_events = pending_event_count(),
        "Event queue statistics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut history = EventHistory::new(3);
        for event_id in 0..5 {
            history.push(EventInfo {
                event_id,
                event_type: "Completion",
                thread: None,
                sent_at: Instant::now(),
                received_at: None,
            });
        }
        let ids: Vec<u64> = history.recent(10).iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![4, 3, 2]);
    }

    #[test]
    fn test_receive_marks_oldest_pending_of_type() {
        let mut history = EventHistory::new(10);
        for (event_id, event_type) in [(1, "Completion"), (2, "Resubmit"), (3, "Completion")] {
            history.push(EventInfo {
                event_id,
                event_type,
                thread: None,
                sent_at: Instant::now(),
                received_at: None,
            });
        }
        assert_eq!(history.mark_received("Completion"), Some(1));
        assert_eq!(history.mark_received("Completion"), Some(3));
        assert_eq!(history.mark_received("Completion"), None);
        assert_eq!(history.pending_count(), 1);
    }

    #[test]
    fn test_global_counter_increases() {
        let before = total_event_count();
        let id = track_event_send("WatchdogCheck");
        assert!(id >= before);
        assert!(total_event_count() > before);
        track_event_receive("WatchdogCheck");
    }
}

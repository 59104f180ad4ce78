//! # Request Sequencer
//!
//! Numbers submissions and throttles them against the client's IO thread.
//!
//! A new request may go out only when the previous one has completed and at
//! least `min_gap` has passed since the last completion callback. Counters are
//! wrapping `u32`s written by the UI thread (`next_sequence`, `retire`) and the
//! IO thread (`record_completion`).

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Monotonic nanoseconds since first use. Never returns 0.
pub fn monotonic_ns() -> u64 {
    (EPOCH.elapsed().as_nanos() as u64).max(1)
}

/// `a` is at or after `b` on the wrapping sequence circle.
fn at_or_after(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) >= 0
}

#[derive(Debug)]
pub struct Sequencer {
    request_sequence: AtomicU32,
    last_completed: AtomicU32,
    /// 0 means no callback has fired yet.
    last_callback_ns: AtomicU64,
    min_gap: Duration,
}

impl Sequencer {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            request_sequence: AtomicU32::new(0),
            last_completed: AtomicU32::new(0),
            last_callback_ns: AtomicU64::new(0),
            min_gap,
        }
    }

    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// True while a request is outstanding or the last callback was less than `min_gap` ago.
    pub fn should_rate_limit(&self) -> bool {
        self.outstanding() || self.within_gap()
    }

    pub fn outstanding(&self) -> bool {
        self.request_sequence.load(Ordering::Acquire) != self.last_completed.load(Ordering::Acquire)
    }

    fn within_gap(&self) -> bool {
        let last = self.last_callback_ns.load(Ordering::Acquire);
        if last == 0 {
            return false;
        }
        let elapsed = monotonic_ns().saturating_sub(last);
        elapsed < self.min_gap.as_nanos() as u64
    }

    /// Time left until `min_gap` has elapsed since the last callback.
    pub fn remaining_gap(&self) -> Duration {
        let last = self.last_callback_ns.load(Ordering::Acquire);
        if last == 0 {
            return Duration::ZERO;
        }
        let elapsed = Duration::from_nanos(monotonic_ns().saturating_sub(last));
        self.min_gap.saturating_sub(elapsed)
    }

    /// Claim the next sequence number.
    pub fn next_sequence(&self) -> u32 {
        self.request_sequence
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1)
    }

    pub fn current(&self) -> u32 {
        self.request_sequence.load(Ordering::Acquire)
    }

    pub fn last_completed(&self) -> u32 {
        self.last_completed.load(Ordering::Acquire)
    }

    /// Called from the completion callback for `sequence`.
    pub fn record_completion(&self, sequence: u32) {
        self.last_callback_ns.store(monotonic_ns(), Ordering::Release);
        self.advance(sequence);
    }

    /// Mark `sequence` as finished without a callback (timed out or never accepted).
    pub fn retire(&self, sequence: u32) {
        self.advance(sequence);
    }

    pub fn has_completed(&self, sequence: u32) -> bool {
        at_or_after(self.last_completed(), sequence)
    }

    /// Move `last_completed` forward to `sequence`. Late completions never move it back.
    fn advance(&self, sequence: u32) {
        let mut current = self.last_completed.load(Ordering::Acquire);
        while !at_or_after(current, sequence) {
            match self.last_completed.compare_exchange_weak(
                current,
                sequence,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_sequencer_is_not_limited() {
        let seq = Sequencer::new(Duration::from_millis(100));
        assert!(!seq.should_rate_limit());
        assert_eq!(seq.remaining_gap(), Duration::ZERO);
    }

    #[test]
    fn test_outstanding_request_limits() {
        let seq = Sequencer::new(Duration::ZERO);
        let first = seq.next_sequence();
        assert_eq!(first, 1);
        assert!(seq.should_rate_limit());
        assert!(!seq.has_completed(first));

        seq.record_completion(first);
        assert!(seq.has_completed(first));
        assert!(!seq.should_rate_limit());
    }

    #[test]
    fn test_min_gap_after_callback() {
        let seq = Sequencer::new(Duration::from_millis(50));
        let s = seq.next_sequence();
        seq.record_completion(s);
        assert!(seq.should_rate_limit());
        assert!(seq.remaining_gap() > Duration::ZERO);

        std::thread::sleep(Duration::from_millis(60));
        assert!(!seq.should_rate_limit());
    }

    #[test]
    fn test_late_completion_does_not_rewind() {
        let seq = Sequencer::new(Duration::ZERO);
        let first = seq.next_sequence();
        seq.retire(first);
        let second = seq.next_sequence();
        seq.record_completion(second);

        seq.record_completion(first);
        assert_eq!(seq.last_completed(), second);
    }

    #[test]
    fn test_late_completion_does_not_complete_newer_request() {
        let seq = Sequencer::new(Duration::ZERO);
        let first = seq.next_sequence();
        seq.retire(first);
        let second = seq.next_sequence();

        seq.record_completion(first);
        assert!(!seq.has_completed(second));
        assert!(seq.outstanding());
    }

    #[test]
    fn test_sequence_wraps() {
        let seq = Sequencer::new(Duration::ZERO);
        seq.request_sequence.store(u32::MAX, Ordering::Relaxed);
        seq.last_completed.store(u32::MAX, Ordering::Relaxed);

        let next = seq.next_sequence();
        assert_eq!(next, 0);
        assert!(seq.outstanding());
        seq.record_completion(next);
        assert!(seq.has_completed(next));
        assert!(seq.has_completed(u32::MAX));
        assert!(!seq.outstanding());
    }
}

//! Flood tracker.
//!
//! Keeps a sliding time window of message timestamps per (tenant, user).
//! Purely in-memory: flood state is only meaningful within a live session
//! and must not survive a restart.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Global flood tracker (in-memory, lock-free).
#[derive(Clone)]
pub struct FloodTracker {
    /// Message timestamps per (tenant, user), newest last.
    windows: Arc<DashMap<(i64, u64), Vec<Instant>>>,
}

impl FloodTracker {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Record a message and check whether the user is flooding.
    ///
    /// Appends the current timestamp, drops entries older than `window`, and
    /// returns true iff the resulting count exceeds `limit`.
    pub fn record_and_check(
        &self,
        tenant_id: i64,
        user_id: u64,
        limit: u32,
        window: Duration,
    ) -> bool {
        self.record_and_check_at(Instant::now(), tenant_id, user_id, limit, window)
    }

    /// Same as [`record_and_check`](Self::record_and_check) with an explicit
    /// "now", so tests can simulate time without sleeping.
    pub fn record_and_check_at(
        &self,
        now: Instant,
        tenant_id: i64,
        user_id: u64,
        limit: u32,
        window: Duration,
    ) -> bool {
        let mut entry = self.windows.entry((tenant_id, user_id)).or_default();

        // Prune everything that fell out of the trailing window
        entry.retain(|&t| now.duration_since(t) < window);
        entry.push(now);

        entry.len() > limit as usize
    }

    /// Drop all tracked state for a user, typically after a penalty.
    pub fn reset(&self, tenant_id: i64, user_id: u64) {
        self.windows.remove(&(tenant_id, user_id));
    }
}

impl Default for FloodTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[test]
    fn six_messages_in_five_seconds_trigger() {
        let tracker = FloodTracker::new();
        let base = Instant::now();

        // Events at t = 0..=4 stay under the limit of 5
        for t in 0..5 {
            let at = base + Duration::from_secs(t);
            assert!(!tracker.record_and_check_at(at, 1, 42, 5, WINDOW));
        }

        // The 6th event at t = 5 pushes the window to 6 > 5
        let at = base + Duration::from_secs(5);
        assert!(tracker.record_and_check_at(at, 1, 42, 5, WINDOW));
    }

    #[test]
    fn same_six_messages_spread_over_twenty_seconds_do_not() {
        let tracker = FloodTracker::new();
        let base = Instant::now();

        for t in [0u64, 4, 8, 12, 16, 20] {
            let at = base + Duration::from_secs(t);
            assert!(
                !tracker.record_and_check_at(at, 1, 42, 5, WINDOW),
                "event at t={} should not flood",
                t
            );
        }
    }

    #[test]
    fn windows_are_isolated_per_tenant_and_user() {
        let tracker = FloodTracker::new();
        let base = Instant::now();

        for _ in 0..6 {
            tracker.record_and_check_at(base, 1, 42, 5, WINDOW);
        }

        // Same user in another tenant, and another user in the same tenant,
        // both start clean.
        assert!(!tracker.record_and_check_at(base, 2, 42, 5, WINDOW));
        assert!(!tracker.record_and_check_at(base, 1, 43, 5, WINDOW));
    }

    #[test]
    fn reset_clears_the_window() {
        let tracker = FloodTracker::new();
        let base = Instant::now();

        for _ in 0..6 {
            tracker.record_and_check_at(base, 1, 42, 5, WINDOW);
        }
        tracker.reset(1, 42);

        assert!(!tracker.record_and_check_at(base, 1, 42, 5, WINDOW));
    }
}

//! Join-verification tracker.
//!
//! Transient, in-memory map of users who joined but have not yet pressed
//! the verification button. An entry is created on join and destroyed
//! either by successful verification or by the timeout callback; the
//! timeout self-cancels when the entry is already gone.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::MessageId;

/// State for one joined-but-unconfirmed user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingVerification {
    /// The verification prompt message posted by the bot.
    pub prompt_msg_id: MessageId,
    /// The join service message that triggered the flow.
    pub join_msg_id: MessageId,
}

/// Global pending-verification map (in-memory, lock-free).
#[derive(Clone)]
pub struct VerificationTracker {
    pending: Arc<DashMap<(i64, u64), PendingVerification>>,
}

impl VerificationTracker {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Record a pending verification.
    ///
    /// A second join while one is pending overwrites the stale entry; at
    /// most one pending verification exists per (tenant, user).
    pub fn insert(&self, tenant_id: i64, user_id: u64, entry: PendingVerification) {
        self.pending.insert((tenant_id, user_id), entry);
    }

    /// Look up the pending entry without removing it.
    #[allow(dead_code)]
    pub fn get(&self, tenant_id: i64, user_id: u64) -> Option<PendingVerification> {
        self.pending.get(&(tenant_id, user_id)).map(|e| *e)
    }

    /// Remove and return the pending entry.
    ///
    /// This is the idempotence point for both the confirmation and the
    /// timeout paths: whichever fires second sees `None` and does nothing.
    pub fn take(&self, tenant_id: i64, user_id: u64) -> Option<PendingVerification> {
        self.pending.remove(&(tenant_id, user_id)).map(|(_, e)| e)
    }
}

impl Default for VerificationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prompt: i32, join: i32) -> PendingVerification {
        PendingVerification {
            prompt_msg_id: MessageId(prompt),
            join_msg_id: MessageId(join),
        }
    }

    #[test]
    fn join_creates_exactly_one_entry() {
        let tracker = VerificationTracker::new();
        tracker.insert(1, 42, entry(100, 99));

        assert_eq!(tracker.get(1, 42), Some(entry(100, 99)));
        assert_eq!(tracker.get(1, 43), None);
        assert_eq!(tracker.get(2, 42), None);
    }

    #[test]
    fn rejoin_overwrites_instead_of_duplicating() {
        let tracker = VerificationTracker::new();
        tracker.insert(1, 42, entry(100, 99));
        tracker.insert(1, 42, entry(200, 199));

        assert_eq!(tracker.get(1, 42), Some(entry(200, 199)));
        // A single take drains everything there is
        assert!(tracker.take(1, 42).is_some());
        assert_eq!(tracker.take(1, 42), None);
    }

    #[test]
    fn take_is_idempotent() {
        let tracker = VerificationTracker::new();
        tracker.insert(1, 42, entry(100, 99));

        // First consumer (confirmation or timeout) wins
        assert_eq!(tracker.take(1, 42), Some(entry(100, 99)));
        // A late timeout firing finds nothing and becomes a no-op
        assert_eq!(tracker.take(1, 42), None);
    }
}

//! Command guards.
//!
//! Cross-cutting checks composed at the top of command handlers. Each guard
//! returns `Ok(())` or a typed denial that the handler renders back to the
//! invoker; handlers never duplicate the checks inline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use teloxide::types::{ChatId, Message, UserId};
use thiserror::Error;

use crate::permissions::Permissions;

/// Why a command was not allowed to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Deny {
    #[error("⏳ Slow down - try again in {0} seconds.")]
    RateLimited(u64),

    #[error("❌ This command is for admins only.")]
    NotAdmin,

    #[error("❌ This command only works in groups.")]
    NotGroup,
}

/// Per-(command, user) minimum re-invocation interval.
#[derive(Clone)]
pub struct RateLimiter {
    last_called: Arc<DashMap<(&'static str, u64), Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            last_called: Arc::new(DashMap::new()),
        }
    }

    /// Check and record an invocation of `command` by `user_id`.
    pub fn check(
        &self,
        command: &'static str,
        user_id: UserId,
        cooldown: Duration,
    ) -> Result<(), Deny> {
        self.check_at(Instant::now(), command, user_id, cooldown)
    }

    /// Same as [`check`](Self::check) with an explicit "now" for tests.
    pub fn check_at(
        &self,
        now: Instant,
        command: &'static str,
        user_id: UserId,
        cooldown: Duration,
    ) -> Result<(), Deny> {
        let key = (command, user_id.0);

        if let Some(last) = self.last_called.get(&key) {
            let elapsed = now.duration_since(*last);
            if elapsed < cooldown {
                let remaining = (cooldown - elapsed).as_secs().max(1);
                return Err(Deny::RateLimited(remaining));
            }
        }

        self.last_called.insert(key, now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands that moderate a group make no sense elsewhere.
pub fn require_group(msg: &Message) -> Result<(), Deny> {
    if msg.chat.is_group() || msg.chat.is_supergroup() {
        Ok(())
    } else {
        Err(Deny::NotGroup)
    }
}

/// The admin right a command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRight {
    /// Any administrator or the creator.
    Admin,
    /// Administrator with the restrict-members right (ban, mute, warn).
    RestrictMembers,
    /// Administrator with the delete-messages right (purge).
    DeleteMessages,
}

/// Admin gate: global admins pass everywhere, otherwise the platform must
/// report administrator or creator status in this tenant, carrying the
/// required right. Lookup failures deny rather than allow.
pub async fn require_right(
    permissions: &Permissions,
    chat_id: ChatId,
    user_id: UserId,
    right: RequiredRight,
) -> Result<(), Deny> {
    let allowed = match right {
        RequiredRight::Admin => permissions.is_admin(chat_id, user_id).await,
        RequiredRight::RestrictMembers => {
            permissions.can_restrict_members(chat_id, user_id).await
        }
        RequiredRight::DeleteMessages => permissions.can_delete_messages(chat_id, user_id).await,
    };

    if allowed.unwrap_or(false) {
        Ok(())
    } else {
        Err(Deny::NotAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_passes_second_is_limited() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        let cooldown = Duration::from_secs(3);

        assert!(limiter.check_at(now, "ban", UserId(1), cooldown).is_ok());
        assert!(matches!(
            limiter.check_at(now + Duration::from_secs(1), "ban", UserId(1), cooldown),
            Err(Deny::RateLimited(_))
        ));
    }

    #[test]
    fn cooldown_expires() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        let cooldown = Duration::from_secs(3);

        assert!(limiter.check_at(now, "ban", UserId(1), cooldown).is_ok());
        assert!(
            limiter
                .check_at(now + Duration::from_secs(3), "ban", UserId(1), cooldown)
                .is_ok()
        );
    }

    #[test]
    fn keyed_per_command_and_user() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        let cooldown = Duration::from_secs(3);

        assert!(limiter.check_at(now, "ban", UserId(1), cooldown).is_ok());
        // Different command, same user
        assert!(limiter.check_at(now, "mute", UserId(1), cooldown).is_ok());
        // Same command, different user
        assert!(limiter.check_at(now, "ban", UserId(2), cooldown).is_ok());
    }

    #[test]
    fn remaining_seconds_are_reported() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        let cooldown = Duration::from_secs(10);

        limiter.check_at(now, "purge", UserId(1), cooldown).unwrap();
        let err = limiter
            .check_at(now + Duration::from_secs(4), "purge", UserId(1), cooldown)
            .unwrap_err();

        assert_eq!(err, Deny::RateLimited(6));
    }
}

//! Permission checker with caching.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMember, ChatMemberKind, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};

/// A user's membership standing in a tenant, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    /// Left, banned, restricted, or the lookup failed.
    Unknown,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Administrator => "administrator",
            Self::Member => "member",
            Self::Unknown => "unknown",
        }
    }
}

/// Cached admin information.
#[derive(Clone, Debug)]
pub struct AdminInfo {
    pub is_creator: bool,
    pub can_delete_messages: bool,
    pub can_restrict_members: bool,
}

impl AdminInfo {
    /// Create AdminInfo from a ChatMember.
    fn from_chat_member(member: &ChatMember) -> Option<Self> {
        match &member.kind {
            ChatMemberKind::Owner(_) => Some(Self {
                is_creator: true,
                can_delete_messages: true,
                can_restrict_members: true,
            }),
            ChatMemberKind::Administrator(admin) => Some(Self {
                is_creator: false,
                can_delete_messages: admin.can_delete_messages,
                can_restrict_members: admin.can_restrict_members,
            }),
            _ => None,
        }
    }

    /// AdminInfo for a global admin (has all rights).
    fn global_admin() -> Self {
        Self {
            is_creator: true,
            can_delete_messages: true,
            can_restrict_members: true,
        }
    }
}

/// Cache key for admin lookups.
type AdminCacheKey = (i64, u64); // (chat_id, user_id)

/// Permission checker with caching support.
///
/// Global admins (from GLOBAL_ADMIN_IDS env) automatically bypass all
/// permission checks in every tenant.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<AdminCacheKey, Option<AdminInfo>>,
    global_admin_ids: Vec<u64>,
}

impl Permissions {
    /// Create a new permission checker with global admin IDs.
    pub fn with_global_admins(
        bot: Bot,
        cache_registry: Arc<CacheRegistry>,
        global_admin_ids: Vec<u64>,
    ) -> Self {
        let cache = cache_registry.get_or_create(
            "admin_permissions",
            CacheConfig::with_capacity(10_000)
                .ttl(Duration::from_secs(300)) // 5 minutes
                .tti(Duration::from_secs(120)), // 2 minutes idle
        );

        Self {
            bot,
            cache,
            global_admin_ids,
        }
    }

    /// Check if a user is a global admin.
    #[inline]
    pub fn is_global_admin(&self, user_id: UserId) -> bool {
        self.global_admin_ids.contains(&user_id.0)
    }

    /// Get admin info for a user in a chat.
    ///
    /// Returns `None` if the user is not an admin.
    /// Global admins always return Some with full rights.
    pub async fn get_admin_info(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> anyhow::Result<Option<AdminInfo>> {
        if self.is_global_admin(user_id) {
            debug!("User {} is global admin, granting all permissions", user_id);
            return Ok(Some(AdminInfo::global_admin()));
        }

        let cache_key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        debug!("Admin cache miss for user {} in chat {}", user_id, chat_id);

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let result = AdminInfo::from_chat_member(&member);

        // Cache the result (including None for non-admins)
        self.cache.insert(cache_key, result.clone());

        Ok(result)
    }

    /// Check if a user is an admin (including the chat creator).
    /// Global admins always return true.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        if self.is_global_admin(user_id) {
            return Ok(true);
        }
        Ok(self.get_admin_info(chat_id, user_id).await?.is_some())
    }

    /// Check if a user can delete messages.
    pub async fn can_delete_messages(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> anyhow::Result<bool> {
        Ok(self
            .get_admin_info(chat_id, user_id)
            .await?
            .map(|a| a.can_delete_messages)
            .unwrap_or(false))
    }

    /// Check if a user can restrict members (ban, mute, etc.).
    pub async fn can_restrict_members(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> anyhow::Result<bool> {
        Ok(self
            .get_admin_info(chat_id, user_id)
            .await?
            .map(|a| a.can_restrict_members)
            .unwrap_or(false))
    }

    /// Query a user's membership status, uncached.
    ///
    /// Lookup failures collapse to `Unknown` rather than erroring; callers
    /// display standing, they don't gate on it.
    pub async fn member_status(&self, chat_id: ChatId, user_id: UserId) -> MemberStatus {
        match self.bot.get_chat_member(chat_id, user_id).await {
            Ok(member) if member.is_owner() => MemberStatus::Creator,
            Ok(member) if member.is_administrator() => MemberStatus::Administrator,
            Ok(member) if member.is_member() => MemberStatus::Member,
            _ => MemberStatus::Unknown,
        }
    }

    /// Invalidate cached admin info for a user.
    ///
    /// Call this when admin status might have changed.
    #[allow(dead_code)]
    pub fn invalidate(&self, chat_id: ChatId, user_id: UserId) {
        let cache_key = (chat_id.0, user_id.0);
        self.cache.invalidate(&cache_key);
        debug!(
            "Invalidated admin cache for user {} in chat {}",
            user_id, chat_id
        );
    }
}

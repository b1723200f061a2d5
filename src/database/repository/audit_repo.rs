//! Audit log repository.
//!
//! Append-only moderation log and member join/leave activity, plus the
//! aggregate counts behind the statistics display. Audit writes are
//! best-effort: a failed insert is logged and never aborts the enforcement
//! that produced it.

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::warn;

use super::super::Database;
use super::super::models::{ActionKind, MemberEvent, MemberEventKind, ModerationLogEntry};

/// Aggregate moderation counts for one tenant.
#[derive(Debug, Clone, Default)]
pub struct TenantStats {
    pub total_actions: u64,
    pub recent_bans: u64,
    pub recent_kicks: u64,
    pub recent_mutes: u64,
    pub recent_warns: u64,
}

/// Join/leave counts for one tenant.
#[derive(Debug, Clone, Default)]
pub struct MemberActivityStats {
    pub joined_7d: u64,
    pub left_7d: u64,
    pub joined_30d: u64,
    pub left_30d: u64,
}

impl MemberActivityStats {
    pub fn net_growth_7d(&self) -> i64 {
        self.joined_7d as i64 - self.left_7d as i64
    }

    pub fn net_growth_30d(&self) -> i64 {
        self.joined_30d as i64 - self.left_30d as i64
    }
}

/// Repository for the moderation log and member activity collections.
#[derive(Clone)]
pub struct AuditRepo {
    log: Collection<ModerationLogEntry>,
    activity: Collection<MemberEvent>,
}

impl AuditRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            log: db.collection("moderation_log"),
            activity: db.collection("member_activity"),
        }
    }

    /// Append a moderation log entry. Failures are logged, not propagated.
    pub async fn log_action(&self, entry: ModerationLogEntry) {
        if let Err(e) = self.log.insert_one(&entry).await {
            warn!(
                "Failed to write moderation log for tenant {}: {}",
                entry.tenant_id, e
            );
        }
    }

    /// Append a member join/leave event. Failures are logged, not propagated.
    pub async fn log_member_event(&self, tenant_id: i64, user_id: u64, event: MemberEventKind) {
        let record = MemberEvent::new(tenant_id, user_id, event);
        if let Err(e) = self.activity.insert_one(&record).await {
            warn!(
                "Failed to write member activity for tenant {}: {}",
                tenant_id, e
            );
        }
    }

    /// Aggregate moderation counts for the statistics display.
    pub async fn tenant_stats(&self, tenant_id: i64) -> Result<TenantStats> {
        let total_actions = self
            .log
            .count_documents(doc! { "tenant_id": tenant_id })
            .await?;

        let day_ago = chrono::Utc::now().timestamp() - 86_400;
        let recent = |action: ActionKind| {
            doc! {
                "tenant_id": tenant_id,
                "action": action.as_str(),
                "timestamp": { "$gt": day_ago },
            }
        };

        Ok(TenantStats {
            total_actions,
            recent_bans: self.log.count_documents(recent(ActionKind::Ban)).await?,
            recent_kicks: self.log.count_documents(recent(ActionKind::Kick)).await?,
            recent_mutes: self.log.count_documents(recent(ActionKind::Mute)).await?,
            recent_warns: self.log.count_documents(recent(ActionKind::Warn)).await?,
        })
    }

    /// Join/leave counts for the statistics display.
    pub async fn member_activity_stats(&self, tenant_id: i64) -> Result<MemberActivityStats> {
        let now = chrono::Utc::now().timestamp();
        let since = |days: i64| now - days * 86_400;
        let count = |event: MemberEventKind, cutoff: i64| {
            let kind = match event {
                MemberEventKind::Joined => "joined",
                MemberEventKind::Left => "left",
            };
            self.activity.count_documents(doc! {
                "tenant_id": tenant_id,
                "event": kind,
                "timestamp": { "$gt": cutoff },
            })
        };

        Ok(MemberActivityStats {
            joined_7d: count(MemberEventKind::Joined, since(7)).await?,
            left_7d: count(MemberEventKind::Left, since(7)).await?,
            joined_30d: count(MemberEventKind::Joined, since(30)).await?,
            left_30d: count(MemberEventKind::Left, since(30)).await?,
        })
    }
}

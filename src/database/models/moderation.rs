//! Moderation state models.
//!
//! Warning counters, filtered words, and the append-only audit records.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Per-user warning counter in a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub tenant_id: i64,
    pub user_id: u64,

    /// Current warning count. Never negative; reset to 0 on escalation.
    #[serde(default)]
    pub count: u32,

    /// Unix timestamp of the most recent warning.
    #[serde(default)]
    pub last_warning: i64,

    /// Accumulated reasons, one entry per warning.
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// A filtered word in a tenant. Words are case-folded before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterWord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub tenant_id: i64,
    pub word: String,
    pub added_by: u64,
    pub added_at: i64,
}

/// Kinds of moderation action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ActionKind {
    Ban,
    Unban,
    Kick,
    Mute,
    Unmute,
    Warn,
    Unwarn,
    ResetWarns,
    AutoKick,
    AutoMute,
    Filter,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ban => "BAN",
            Self::Unban => "UNBAN",
            Self::Kick => "KICK",
            Self::Mute => "MUTE",
            Self::Unmute => "UNMUTE",
            Self::Warn => "WARN",
            Self::Unwarn => "UNWARN",
            Self::ResetWarns => "RESET-WARNS",
            Self::AutoKick => "AUTO-KICK",
            Self::AutoMute => "AUTO-MUTE",
            Self::Filter => "FILTER",
        }
    }
}

/// Append-only moderation log entry.
///
/// Written by the decision engine and command handlers; read back only for
/// the statistics display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationLogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub tenant_id: i64,
    /// The user the action was taken against.
    pub user_id: u64,
    /// Who initiated it: an admin, or the bot itself for automatic actions.
    pub actor_id: u64,
    pub action: ActionKind,
    #[serde(default)]
    pub reason: String,
    /// Duration for timed actions (mute), in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    pub timestamp: i64,
}

impl ModerationLogEntry {
    pub fn new(
        tenant_id: i64,
        user_id: u64,
        actor_id: u64,
        action: ActionKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            tenant_id,
            user_id,
            actor_id,
            action,
            reason: reason.into(),
            duration_secs: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn with_duration(mut self, secs: u64) -> Self {
        self.duration_secs = Some(secs);
        self
    }
}

/// Join/leave direction for member activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberEventKind {
    Joined,
    Left,
}

/// Append-only member activity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEvent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub tenant_id: i64,
    pub user_id: u64,
    pub event: MemberEventKind,
    pub timestamp: i64,
}

impl MemberEvent {
    pub fn new(tenant_id: i64, user_id: u64, event: MemberEventKind) -> Self {
        Self {
            id: None,
            tenant_id,
            user_id,
            event,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

//! Tenant configuration model.
//!
//! One document per group. Created lazily the first time a tenant is
//! referenced; mutated only through the repository's whitelisted update;
//! removal only by deactivation.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Media subtypes that can be filtered individually.
///
/// The order of the variants is the order the classifier checks them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Voice,
    Sticker,
    Animation,
    VideoNote,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Sticker => "sticker",
            Self::Animation => "animation",
            Self::VideoNote => "video note",
        }
    }
}

/// Per-media-type filter toggles. All on by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFilters {
    #[serde(default = "default_true")]
    pub photo: bool,
    #[serde(default = "default_true")]
    pub video: bool,
    #[serde(default = "default_true")]
    pub audio: bool,
    #[serde(default = "default_true")]
    pub voice: bool,
    #[serde(default = "default_true")]
    pub sticker: bool,
    #[serde(default = "default_true")]
    pub animation: bool,
    #[serde(default = "default_true")]
    pub video_note: bool,
}

impl Default for MediaFilters {
    fn default() -> Self {
        Self {
            photo: true,
            video: true,
            audio: true,
            voice: true,
            sticker: true,
            animation: true,
            video_note: true,
        }
    }
}

impl MediaFilters {
    /// Whether messages of the given media kind are filtered.
    pub fn is_enabled(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Photo => self.photo,
            MediaKind::Video => self.video,
            MediaKind::Audio => self.audio,
            MediaKind::Voice => self.voice,
            MediaKind::Sticker => self.sticker,
            MediaKind::Animation => self.animation,
            MediaKind::VideoNote => self.video_note,
        }
    }
}

/// Configuration for one tenant (group).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID
    pub chat_id: i64,

    /// Group title (cached for display)
    #[serde(default)]
    pub title: String,

    /// Chat type ("group" / "supergroup")
    #[serde(default = "default_chat_type")]
    pub chat_type: String,

    // Feature toggles
    #[serde(default)]
    pub welcome_enabled: bool,
    #[serde(default = "default_true")]
    pub antiflood_enabled: bool,
    #[serde(default = "default_true")]
    pub word_filter_enabled: bool,
    #[serde(default)]
    pub verification_enabled: bool,
    #[serde(default = "default_true")]
    pub antilink_enabled: bool,
    #[serde(default = "default_true")]
    pub antifile_enabled: bool,
    #[serde(default)]
    pub media_filters: MediaFilters,

    // Service message cleanup
    #[serde(default = "default_true")]
    pub delete_join_messages: bool,
    #[serde(default = "default_true")]
    pub delete_leave_messages: bool,
    #[serde(default = "default_true")]
    pub delete_service_messages: bool,

    // Tunables
    #[serde(default = "default_max_warnings")]
    pub max_warnings: u32,
    #[serde(default)]
    pub rules_text: String,
    #[serde(default)]
    pub welcome_message: String,
    /// Seconds to keep the welcome message before deleting it (0 = keep).
    #[serde(default)]
    pub welcome_duration_secs: u64,
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Unix timestamps
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

fn default_chat_type() -> String {
    "group".to_string()
}

fn default_max_warnings() -> u32 {
    3
}

fn default_language() -> String {
    "en".to_string()
}

impl TenantConfig {
    /// Create new tenant config with defaults.
    pub fn new(chat_id: i64, title: &str, chat_type: &str, max_warnings: u32) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            chat_id,
            title: title.to_string(),
            chat_type: chat_type.to_string(),
            welcome_enabled: false,
            antiflood_enabled: true,
            word_filter_enabled: true,
            verification_enabled: false,
            antilink_enabled: true,
            antifile_enabled: true,
            media_filters: MediaFilters::default(),
            delete_join_messages: true,
            delete_leave_messages: true,
            delete_service_messages: true,
            max_warnings,
            rules_text: String::new(),
            welcome_message: String::new(),
            welcome_duration_secs: 0,
            language: default_language().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_defaults() {
        let t = TenantConfig::new(-100123, "Test Group", "supergroup", 3);

        // Welcome and verification start disabled; the filters start enabled.
        assert!(!t.welcome_enabled);
        assert!(!t.verification_enabled);
        assert!(t.antiflood_enabled);
        assert!(t.word_filter_enabled);
        assert!(t.antilink_enabled);
        assert!(t.antifile_enabled);
        assert!(t.is_active);
        assert_eq!(t.max_warnings, 3);
        assert_eq!(t.welcome_duration_secs, 0);
    }

    #[test]
    fn media_filters_default_all_on() {
        let filters = MediaFilters::default();
        for kind in [
            MediaKind::Photo,
            MediaKind::Video,
            MediaKind::Audio,
            MediaKind::Voice,
            MediaKind::Sticker,
            MediaKind::Animation,
            MediaKind::VideoNote,
        ] {
            assert!(filters.is_enabled(kind), "{:?} should default on", kind);
        }
    }
}

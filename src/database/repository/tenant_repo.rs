//! Tenant configuration repository.
//!
//! Handles CRUD for tenant configs. Reads always hit the database; the
//! moderation pipeline depends on seeing configuration changes on the very
//! next event.

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::{Bson, doc};
use tracing::debug;

use super::super::Database;
use super::super::models::TenantConfig;

/// Fields that may be written through [`TenantRepo::update_fields`].
/// Everything else (ids, timestamps) is managed by the repository itself.
const UPDATABLE_FIELDS: &[&str] = &[
    "title",
    "welcome_enabled",
    "antiflood_enabled",
    "word_filter_enabled",
    "verification_enabled",
    "antilink_enabled",
    "antifile_enabled",
    "media_filters.photo",
    "media_filters.video",
    "media_filters.audio",
    "media_filters.voice",
    "media_filters.sticker",
    "media_filters.animation",
    "media_filters.video_note",
    "delete_join_messages",
    "delete_leave_messages",
    "delete_service_messages",
    "max_warnings",
    "rules_text",
    "welcome_message",
    "welcome_duration_secs",
    "language",
    "is_active",
];

/// Repository for tenant configurations.
#[derive(Clone)]
pub struct TenantRepo {
    collection: Collection<TenantConfig>,
    default_max_warnings: u32,
}

impl TenantRepo {
    pub fn new(db: &Database, default_max_warnings: u32) -> Self {
        Self {
            collection: db.collection("tenants"),
            default_max_warnings,
        }
    }

    /// Get the tenant config, creating a default one if none exists.
    ///
    /// Idempotent: two calls for the same new id yield one record.
    pub async fn get_or_create(
        &self,
        chat_id: i64,
        title: &str,
        chat_type: &str,
    ) -> Result<TenantConfig> {
        let filter = doc! { "chat_id": chat_id };
        if let Some(config) = self.collection.find_one(filter.clone()).await? {
            return Ok(config);
        }

        let config = TenantConfig::new(chat_id, title, chat_type, self.default_max_warnings);

        // Upsert instead of insert: a concurrent handler may have created the
        // document between our read and this write.
        let options = mongodb::options::UpdateOptions::builder().upsert(true).build();
        self.collection
            .update_one(
                filter.clone(),
                doc! { "$setOnInsert": mongodb::bson::to_bson(&config)? },
            )
            .with_options(options)
            .await?;

        debug!("Created tenant config for chat {}", chat_id);

        // Re-read so both racers observe the same stored document.
        let stored = self.collection.find_one(filter).await?;
        Ok(stored.unwrap_or(config))
    }

    /// Update named fields on a tenant config.
    ///
    /// Only whitelisted fields are written; anything else in `fields` is
    /// silently dropped. `updated_at` is bumped on every successful write.
    pub async fn update_fields(&self, chat_id: i64, fields: &[(&str, Bson)]) -> Result<()> {
        let mut set = doc! {};
        for (key, value) in fields {
            if UPDATABLE_FIELDS.contains(key) {
                set.insert(*key, value.clone());
            } else {
                debug!("Ignoring non-updatable tenant field '{}'", key);
            }
        }

        if set.is_empty() {
            return Ok(());
        }

        set.insert("updated_at", chrono::Utc::now().timestamp());

        let filter = doc! { "chat_id": chat_id };
        self.collection
            .update_one(filter, doc! { "$set": set })
            .await?;

        debug!("Updated tenant config fields for chat {}", chat_id);
        Ok(())
    }

    /// Update a single named field.
    pub async fn update_field(&self, chat_id: i64, field: &str, value: Bson) -> Result<()> {
        self.update_fields(chat_id, &[(field, value)]).await
    }

    /// Mark a tenant inactive. Tenant records are never deleted.
    #[allow(dead_code)]
    pub async fn deactivate(&self, chat_id: i64) -> Result<()> {
        self.update_field(chat_id, "is_active", Bson::Boolean(false))
            .await
    }
}

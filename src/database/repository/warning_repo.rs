//! Warning counter repository.
//!
//! Per-(tenant, user) warning counts. A missing record reads as zero;
//! decrement floors at zero; reset drops the count and the reason log.

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use tracing::debug;

use super::super::Database;
use super::super::models::WarningRecord;

/// Repository for per-user warning counters.
#[derive(Clone)]
pub struct WarningRepo {
    collection: Collection<WarningRecord>,
}

impl WarningRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("warnings"),
        }
    }

    /// Current warning count for a user in a tenant. Absent record = 0.
    pub async fn get(&self, tenant_id: i64, user_id: u64) -> Result<u32> {
        let filter = doc! { "tenant_id": tenant_id, "user_id": user_id as i64 };
        let record = self.collection.find_one(filter).await?;
        Ok(record.map(|r| r.count).unwrap_or(0))
    }

    /// Add one warning and return the new count. Creates the record on first
    /// warning.
    pub async fn increment(&self, tenant_id: i64, user_id: u64, reason: &str) -> Result<u32> {
        let filter = doc! { "tenant_id": tenant_id, "user_id": user_id as i64 };
        let update = doc! {
            "$inc": { "count": 1 },
            "$push": { "reasons": reason },
            "$set": { "last_warning": chrono::Utc::now().timestamp() },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let record = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?;

        let count = record.map(|r| r.count).unwrap_or(1);
        debug!(
            "Warning {} for user {} in tenant {}",
            count, user_id, tenant_id
        );
        Ok(count)
    }

    /// Remove one warning, flooring at zero. Returns the new count.
    pub async fn decrement(&self, tenant_id: i64, user_id: u64) -> Result<u32> {
        let current = self.get(tenant_id, user_id).await?;
        if current == 0 {
            return Ok(0);
        }

        let new_count = current - 1;
        let filter = doc! { "tenant_id": tenant_id, "user_id": user_id as i64 };
        let update = doc! {
            "$set": {
                "count": new_count,
                "last_warning": chrono::Utc::now().timestamp(),
            },
        };
        self.collection.update_one(filter, update).await?;
        Ok(new_count)
    }

    /// Reset a user's warnings to zero and clear the reason log.
    pub async fn reset(&self, tenant_id: i64, user_id: u64) -> Result<()> {
        let filter = doc! { "tenant_id": tenant_id, "user_id": user_id as i64 };
        let update = doc! {
            "$set": { "count": 0, "last_warning": 0i64, "reasons": [] },
        };
        self.collection.update_one(filter, update).await?;
        debug!("Reset warnings for user {} in tenant {}", user_id, tenant_id);
        Ok(())
    }
}

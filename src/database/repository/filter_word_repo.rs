//! Filtered word repository.
//!
//! A per-tenant set of case-folded words. Unique per (tenant, word);
//! adding an existing word is reported rather than duplicated.

use anyhow::Result;
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::debug;

use super::super::Database;
use super::super::models::FilterWord;

/// Repository for per-tenant filtered words.
#[derive(Clone)]
pub struct FilterWordRepo {
    collection: Collection<FilterWord>,
}

impl FilterWordRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("filter_words"),
        }
    }

    /// Add a word to the tenant's filter. Returns false if already present.
    pub async fn add(&self, tenant_id: i64, word: &str, added_by: u64) -> Result<bool> {
        let word = word.to_lowercase();
        let filter = doc! { "tenant_id": tenant_id, "word": &word };

        let update = doc! {
            "$setOnInsert": {
                "tenant_id": tenant_id,
                "word": &word,
                "added_by": added_by as i64,
                "added_at": chrono::Utc::now().timestamp(),
            },
        };
        let options = mongodb::options::UpdateOptions::builder().upsert(true).build();

        let result = self
            .collection
            .update_one(filter, update)
            .with_options(options)
            .await?;

        let inserted = result.upserted_id.is_some();
        if inserted {
            debug!("Added filter word '{}' to tenant {}", word, tenant_id);
        }
        Ok(inserted)
    }

    /// Remove a word from the tenant's filter. Returns false if absent.
    pub async fn remove(&self, tenant_id: i64, word: &str) -> Result<bool> {
        let word = word.to_lowercase();
        let filter = doc! { "tenant_id": tenant_id, "word": &word };
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    /// List all filtered words for a tenant.
    pub async fn list(&self, tenant_id: i64) -> Result<Vec<String>> {
        let filter = doc! { "tenant_id": tenant_id };
        let mut cursor = self.collection.find(filter).await?;

        let mut words = Vec::new();
        while let Some(item) = cursor.next().await {
            words.push(item?.word);
        }
        Ok(words)
    }
}

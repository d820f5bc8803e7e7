//! MongoDB implementation of [`AccountRepository`].

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, Document},
    Collection, Database,
};
use tracing::instrument;
use uuid::Uuid;

use crate::config::ACCOUNTS_COLLECTION;
use crate::domain::Account;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{AccountRepository, SearchCriteria};

/// Account store backed by a MongoDB collection.
pub struct MongoAccountStore {
    collection: Collection<Account>,
}

impl MongoAccountStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Account>(ACCOUNTS_COLLECTION),
        }
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Account>(collection_name),
        }
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }

    /// Build a conjunctive filter document from search criteria
    fn build_filter(criteria: &SearchCriteria) -> Document {
        let mut filter = doc! {};

        if let Some(query) = criteria.query.as_deref().filter(|q| !q.is_empty()) {
            let pattern = regex::escape(query);
            filter.insert(
                "$or",
                vec![
                    doc! { "username": { "$regex": &pattern, "$options": "i" } },
                    doc! { "full_name": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }

        if let Some(status) = criteria.status {
            filter.insert("status", status.to_string());
        }

        if let Some(ref role) = criteria.role {
            filter.insert("roles", role.as_str());
        }

        filter
    }
}

#[async_trait]
impl AccountRepository for MongoAccountStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self, normalized_email))]
    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> AppResult<Option<Account>> {
        let filter = doc! { "normalized_email": normalized_email };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self, username))]
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        // Case-insensitive exact match; escape so the lookup never becomes a pattern
        let pattern = format!("^{}$", regex::escape(username));
        let filter = doc! { "username": { "$regex": pattern, "$options": "i" } };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self, phone_number))]
    async fn find_by_phone(&self, phone_number: &str) -> AppResult<Option<Account>> {
        let filter = doc! { "phone_number": phone_number };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert(&self, account: &Account) -> AppResult<()> {
        self.collection.insert_one(account).await?;
        tracing::info!(account_id = %account.id, "account inserted");
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id, version = account.version))]
    async fn update(&self, account: &Account) -> AppResult<()> {
        // Compare-and-swap on (_id, previous version). No document locking:
        // losing the race means another writer already advanced the version.
        let filter = doc! {
            "_id": to_bson(&account.id).unwrap_or(Bson::Null),
            "version": account.version - 1,
        };
        let result = self.collection.replace_one(filter, account).await?;
        if result.matched_count == 0 {
            tracing::warn!(account_id = %account.id, "compare-and-swap lost the race");
            return Err(AppError::VersionConflict);
        }
        Ok(())
    }

    #[instrument(skip(self, criteria))]
    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Account>, u64)> {
        let filter = Self::build_filter(criteria);

        // Total reflects the full filtered set, not the returned page
        let total = self.collection.count_documents(filter.clone()).await?;

        let options = mongodb::options::FindOptions::builder()
            .skip(criteria.pagination.offset())
            .limit(criteria.pagination.per_page as i64)
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let accounts: Vec<Account> = cursor.try_collect().await?;

        Ok((accounts, total))
    }
}

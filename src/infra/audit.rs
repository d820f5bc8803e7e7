//! Audit sink collaborator.

use async_trait::async_trait;
use mongodb::{Collection, Database};
use uuid::Uuid;

use crate::config::AUDIT_COLLECTION;
use crate::domain::AuditEntry;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Append-only audit trail. Fire-and-forget from the service's
/// perspective: sink failures never mask the primary operation's outcome.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        account_id: Option<Uuid>,
        action: &str,
        details: &str,
        ip_address: &str,
    ) -> AppResult<()>;
}

/// Audit sink writing [`AuditEntry`] documents to their own collection.
pub struct MongoAuditLog {
    collection: Collection<AuditEntry>,
}

impl MongoAuditLog {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<AuditEntry>(AUDIT_COLLECTION),
        }
    }
}

#[async_trait]
impl AuditSink for MongoAuditLog {
    async fn record(
        &self,
        account_id: Option<Uuid>,
        action: &str,
        details: &str,
        ip_address: &str,
    ) -> AppResult<()> {
        let entry = AuditEntry::new(account_id, action, details, ip_address);
        self.collection.insert_one(&entry).await?;
        Ok(())
    }
}

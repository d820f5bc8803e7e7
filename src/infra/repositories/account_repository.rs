//! Account repository contract.
//!
//! Persists account snapshots and detects lost-update races. The store
//! enforces uniqueness of the identifier only; uniqueness of username,
//! email, and phone across accounts is the service's job, checked via the
//! point lookups before insert.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, AccountStatus};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Conjunctive search filters over the account collection.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Case-insensitive substring match over username and full name
    pub query: Option<String>,
    /// Exact status match
    pub status: Option<AccountStatus>,
    /// Role membership match
    pub role: Option<String>,
    pub pagination: PaginationParams,
}

/// Repository abstraction over the account collection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Point lookup by identifier
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Point lookup by normalized email (the uniqueness key, not the literal)
    async fn find_by_normalized_email(&self, normalized_email: &str)
        -> AppResult<Option<Account>>;

    /// Case-insensitive point lookup by username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Point lookup by phone number
    async fn find_by_phone(&self, phone_number: &str) -> AppResult<Option<Account>>;

    /// Insert a new record; the identifier must not already exist
    async fn insert(&self, account: &Account) -> AppResult<()>;

    /// Compare-and-swap update: succeeds only when the stored record still
    /// holds `account.version - 1`. Any other state, including a missing
    /// record, yields [`crate::errors::AppError::VersionConflict`] and the
    /// caller must re-fetch before retrying.
    async fn update(&self, account: &Account) -> AppResult<()>;

    /// Filtered page of accounts plus the total count over the whole
    /// filtered set, independent of pagination
    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Account>, u64)>;
}

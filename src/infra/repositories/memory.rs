//! In-memory implementation of [`AccountRepository`].
//!
//! Implements the exact contract of the MongoDB store, including the
//! version compare-and-swap, over a `RwLock`-guarded map. Used by the
//! integration tests and useful for embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Account;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{AccountRepository, SearchCriteria};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(account: &Account, criteria: &SearchCriteria) -> bool {
        if let Some(query) = criteria.query.as_deref().filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            let hit = account.username.to_lowercase().contains(&needle)
                || account.full_name.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(status) = criteria.status {
            if account.status != status {
                return false;
            }
        }
        if let Some(ref role) = criteria.role {
            if !account.has_role(role) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        Ok(accounts
            .values()
            .find(|a| a.normalized_email == normalized_email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let needle = username.to_lowercase();
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        Ok(accounts
            .values()
            .find(|a| a.username.to_lowercase() == needle)
            .cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        Ok(accounts
            .values()
            .find(|a| a.phone_number == phone_number)
            .cloned())
    }

    async fn insert(&self, account: &Account) -> AppResult<()> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        if accounts.contains_key(&account.id) {
            return Err(AppError::duplicate("Account id"));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> AppResult<()> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        let expected_present = accounts
            .get(&account.id)
            .is_some_and(|stored| stored.version == account.version - 1);
        // Gone, or another writer already advanced past the expected version
        if !expected_present {
            return Err(AppError::VersionConflict);
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Account>, u64)> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        let mut matched: Vec<Account> = accounts
            .values()
            .filter(|a| Self::matches(a, criteria))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let page: Vec<Account> = matched
            .into_iter()
            .skip(criteria.pagination.offset() as usize)
            .take(criteria.pagination.per_page as usize)
            .collect();

        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Registration;

    fn stored_account() -> Account {
        Account::register(Registration {
            username: "jdoe".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jdoe@example.com".to_string(),
            phone_number: "+12025550123".to_string(),
            password_hash: "hash".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            terms_version: "v2".to_string(),
            marketing_consent: false,
            registration_ip: "203.0.113.9".to_string(),
        })
        .expect("valid registration fixture")
    }

    #[tokio::test]
    async fn poisoned_lock_degrades_instead_of_aborting() {
        let store = MemoryAccountStore::new();
        let account = stored_account();
        store.insert(&account).await.unwrap();

        let poison = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.accounts.write().unwrap();
            panic!("poison the account map");
        }));
        assert!(poison.is_err());
        assert!(store.accounts.is_poisoned());

        let found = store.find_by_id(account.id).await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(account.id));

        let next = account.clone().bump_version();
        store.update(&next).await.unwrap();
    }
}

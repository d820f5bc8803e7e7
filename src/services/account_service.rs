//! Account service - orchestrates registration, mutation, and search flows.
//!
//! The service owns use-case sequencing: which collaborator is consulted
//! first, which uniqueness lookup wins, and when the version token is
//! advanced. Entities own field validity; the store owns the
//! compare-and-swap. Each request operates on its own fetched snapshot, so
//! nothing here is shared mutable state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{identity, Account, AccountStatus, PasswordHasher, Registration};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{AccountRepository, AuditSink, RiskEvaluator, SearchCriteria};
use crate::types::Paginated;

/// Registration payload. Request-level rules are checked here the way the
/// transport layer would; the entity re-runs the full rule set on
/// construction and remains authoritative.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterAccount {
    #[validate(
        length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"),
        custom(function = "validate_username_not_reserved")
    )]
    pub username: String,
    #[validate(length(min = 2, max = 80, message = "Full name must be between 2 and 80 characters"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(length(min = 12, message = "Password must be at least 12 characters"))]
    pub password: String,
    #[validate(custom(function = "validate_minimum_age"))]
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "Terms version is required"))]
    pub terms_version: String,
    #[serde(default)]
    pub marketing_consent: bool,
}

fn validate_username_not_reserved(username: &str) -> Result<(), validator::ValidationError> {
    if crate::config::RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        let mut err = validator::ValidationError::new("reserved_username");
        err.message = Some("Username is reserved".into());
        return Err(err);
    }
    Ok(())
}

fn validate_phone_number(phone_number: &str) -> Result<(), validator::ValidationError> {
    if let Err(reason) = identity::validate_phone(phone_number) {
        let mut err = validator::ValidationError::new("invalid_phone");
        err.message = Some(reason.to_string().into());
        return Err(err);
    }
    Ok(())
}

fn validate_minimum_age(birth_date: &NaiveDate) -> Result<(), validator::ValidationError> {
    let today = Utc::now().date_naive();
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    if age < crate::config::MIN_REGISTRATION_AGE {
        let mut err = validator::ValidationError::new("underage");
        err.message = Some(
            format!(
                "Account holder must be at least {} years old",
                crate::config::MIN_REGISTRATION_AGE
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Profile update payload. `expected_version` is the caller's last-known
/// version token; a stale value fails before any field validation runs.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfile {
    pub full_name: String,
    pub phone_number: String,
    pub expected_version: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetStatus {
    pub status: AccountStatus,
    pub reason: String,
}

/// Display-safe projection of an account: contact data masked, hash omitted.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub status: AccountStatus,
    pub roles: Vec<String>,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            full_name: account.full_name.clone(),
            email: identity::mask_email(&account.email),
            phone_number: identity::mask_phone(&account.phone_number),
            status: account.status,
            roles: account.roles.clone(),
            birth_date: account.birth_date,
            created_at: account.created_at,
            version: account.version,
        }
    }
}

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a new account, returning its identifier
    async fn register(&self, input: RegisterAccount, source_ip: &str) -> AppResult<Uuid>;

    /// Masked read-side projection of one account
    async fn get_profile(&self, id: Uuid) -> AppResult<AccountView>;

    /// Replace full name and phone number under optimistic concurrency
    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> AppResult<()>;

    /// Change the password after verifying the current one
    async fn change_password(&self, id: Uuid, input: ChangePassword) -> AppResult<()>;

    /// Administrative status change; requires a non-empty reason
    async fn set_status(&self, id: Uuid, input: SetStatus) -> AppResult<()>;

    /// Grant or revoke a role; persists only when the role set changed
    async fn manage_role(&self, id: Uuid, role: &str, revoke: bool) -> AppResult<()>;

    /// Filtered, paginated search projected to display-safe views
    async fn search(&self, criteria: SearchCriteria) -> AppResult<Paginated<AccountView>>;
}

/// Concrete implementation of [`AccountService`].
pub struct AccountManager {
    store: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    audit: Arc<dyn AuditSink>,
    risk: Arc<dyn RiskEvaluator>,
}

impl AccountManager {
    pub fn new(
        store: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        audit: Arc<dyn AuditSink>,
        risk: Arc<dyn RiskEvaluator>,
    ) -> Self {
        Self {
            store,
            hasher,
            audit,
            risk,
        }
    }

    /// Best-effort audit write. Sink failures are logged and never mask
    /// the primary operation's outcome.
    async fn audit(&self, account_id: Option<Uuid>, action: &str, details: &str, ip: &str) {
        if let Err(err) = self.audit.record(account_id, action, details, ip).await {
            tracing::warn!(action, error = %err, "audit write failed, primary operation unaffected");
        }
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn register(&self, input: RegisterAccount, source_ip: &str) -> AppResult<Uuid> {
        // Risk verdict comes before any validation or persistence
        if self.risk.is_risky(source_ip, &input.username).await? {
            return Err(AppError::RiskRejected);
        }

        input
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;
        identity::validate_password_strength(&input.password, &input.email, &input.username)?;

        let password_hash = self.hasher.hash(&input.password)?;
        let account = Account::register(Registration {
            username: input.username,
            full_name: input.full_name,
            email: input.email,
            phone_number: input.phone_number,
            password_hash,
            birth_date: input.birth_date,
            terms_version: input.terms_version,
            marketing_consent: input.marketing_consent,
            registration_ip: source_ip.to_string(),
        })?;

        // Identity uniqueness is enforced here, not in the store; first
        // collision found wins.
        if self
            .store
            .find_by_normalized_email(&account.normalized_email)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate("Email"));
        }
        if self.store.find_by_username(&account.username).await?.is_some() {
            return Err(AppError::duplicate("Username"));
        }
        if self.store.find_by_phone(&account.phone_number).await?.is_some() {
            return Err(AppError::duplicate("Phone number"));
        }

        self.store.insert(&account).await?;
        tracing::info!(account_id = %account.id, username = %account.username, "account registered");

        self.audit(
            Some(account.id),
            "AccountRegistered",
            &format!("Account {} registered", account.username),
            source_ip,
        )
        .await;

        Ok(account.id)
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<AccountView> {
        let account = self.store.find_by_id(id).await?.ok_or_not_found()?;
        Ok(AccountView::from(&account))
    }

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> AppResult<()> {
        let account = self.store.find_by_id(id).await?.ok_or_not_found()?;

        // Stale token is reported before any field validation
        if account.version != input.expected_version {
            return Err(AppError::VersionConflict);
        }

        let old_name = account.full_name.clone();
        let old_phone = account.phone_number.clone();

        let next = account
            .with_profile(&input.full_name, &input.phone_number)?
            .bump_version();
        self.store.update(&next).await?;

        self.audit(
            Some(id),
            "ProfileUpdated",
            &format!(
                "Changed name from '{}' to '{}', phone from '{}' to '{}'",
                old_name, next.full_name, old_phone, next.phone_number
            ),
            "system",
        )
        .await;

        Ok(())
    }

    async fn change_password(&self, id: Uuid, input: ChangePassword) -> AppResult<()> {
        let account = self.store.find_by_id(id).await?.ok_or_not_found()?;

        if !self
            .hasher
            .verify(&input.current_password, &account.password_hash)
        {
            return Err(AppError::InvalidCredentials);
        }

        identity::validate_password_strength(
            &input.new_password,
            &account.email,
            &account.username,
        )?;

        let new_hash = self.hasher.hash(&input.new_password)?;
        let next = account.with_password_hash(&new_hash)?.bump_version();
        self.store.update(&next).await?;

        self.audit(Some(id), "PasswordChanged", "Password changed", "system")
            .await;

        Ok(())
    }

    async fn set_status(&self, id: Uuid, input: SetStatus) -> AppResult<()> {
        // Reason is required before we even look the account up
        if input.reason.trim().is_empty() {
            return Err(AppError::validation("Status change reason is required"));
        }

        let account = self.store.find_by_id(id).await?.ok_or_not_found()?;
        let old_status = account.status;

        let next = account.with_status(input.status).bump_version();
        self.store.update(&next).await?;

        self.audit(
            Some(id),
            "StatusChanged",
            &format!(
                "Status changed from {} to {}. Reason: {}",
                old_status, next.status, input.reason
            ),
            "admin",
        )
        .await;

        Ok(())
    }

    async fn manage_role(&self, id: Uuid, role: &str, revoke: bool) -> AppResult<()> {
        let account = self.store.find_by_id(id).await?.ok_or_not_found()?;

        let (next, changed) = if revoke {
            account.with_role_revoked(role)
        } else {
            account.with_role_granted(role)?
        };

        // Idempotent grants and absent revokes change nothing: no version
        // bump, no store round-trip, no audit entry.
        if !changed {
            return Ok(());
        }

        let next = next.bump_version();
        self.store.update(&next).await?;

        self.audit(
            Some(id),
            if revoke { "RoleRevoked" } else { "RoleGranted" },
            &format!("Role {}", role),
            "admin",
        )
        .await;

        Ok(())
    }

    async fn search(&self, criteria: SearchCriteria) -> AppResult<Paginated<AccountView>> {
        let (accounts, total) = self.store.search(&criteria).await?;
        let views = accounts.iter().map(AccountView::from).collect();
        Ok(Paginated::new(views, total, &criteria.pagination))
    }
}

/// Flatten validator's error map into a deterministic, readable message
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("{}: {}", field, err.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

//! Account aggregate root.
//!
//! The entity is the single source of truth for "is this account internally
//! consistent". Construction and every named transition re-run the field
//! validators they touch, so no path produces an invalid snapshot.
//!
//! Transitions are pure: each returns a new validated snapshot instead of
//! mutating in place, which keeps invariants checkable at every boundary.
//! `bump_version` is the only way `version` advances and must be applied
//! exactly once per accepted mutation, after validation, never before.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MIN_REGISTRATION_AGE, RESERVED_USERNAMES};
use crate::domain::identity;
use crate::errors::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static FULL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]*$").expect("valid full-name regex"));

/// Account lifecycle status.
///
/// Transitions between statuses are administrative and unconstrained; there
/// is deliberately no legal-transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    PendingVerification,
    Active,
    Suspended,
    Deactivated,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccountStatus::PendingVerification => "PendingVerification",
            AccountStatus::Active => "Active",
            AccountStatus::Suspended => "Suspended",
            AccountStatus::Deactivated => "Deactivated",
        };
        write!(f, "{}", name)
    }
}

/// Account domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    /// Derived from `email`; used for uniqueness lookups
    pub normalized_email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub terms_version: String,
    pub marketing_consent: bool,
    /// Captured at creation, never re-validated
    pub registration_ip: String,
    pub status: AccountStatus,
    pub roles: Vec<String>,
    /// Optimistic-concurrency token, starts at 1
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`Account::register`].
pub struct Registration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub terms_version: String,
    pub marketing_consent: bool,
    pub registration_ip: String,
}

impl Account {
    /// Construct a freshly registered account.
    ///
    /// Validators run in a fixed order (username, full name, email, phone,
    /// birth date, terms) and any failure aborts construction; no partially
    /// constructed entity is observable. `normalized_email` is always
    /// derived here, never supplied by the caller.
    pub fn register(input: Registration) -> AppResult<Self> {
        validate_username(&input.username)?;
        validate_full_name(&input.full_name)?;
        validate_email(&input.email)?;
        identity::validate_phone(&input.phone_number)?;
        validate_birth_date(input.birth_date)?;
        validate_terms_version(&input.terms_version)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            normalized_email: identity::normalize_email(&input.email),
            username: input.username,
            full_name: input.full_name,
            email: input.email,
            phone_number: input.phone_number,
            password_hash: input.password_hash,
            birth_date: input.birth_date,
            terms_version: input.terms_version,
            marketing_consent: input.marketing_consent,
            registration_ip: input.registration_ip,
            status: AccountStatus::PendingVerification,
            roles: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace full name and phone number, both-or-neither.
    pub fn with_profile(&self, full_name: &str, phone_number: &str) -> AppResult<Self> {
        validate_full_name(full_name)?;
        identity::validate_phone(phone_number)?;

        let mut next = self.clone();
        next.full_name = full_name.to_string();
        next.phone_number = phone_number.to_string();
        next.updated_at = Utc::now();
        Ok(next)
    }

    /// Replace the stored password hash. Strength policy is checked by the
    /// caller against the plaintext before hashing; only non-emptiness is
    /// enforced here.
    pub fn with_password_hash(&self, new_hash: &str) -> AppResult<Self> {
        if new_hash.is_empty() {
            return Err(AppError::validation("Password hash cannot be empty"));
        }
        let mut next = self.clone();
        next.password_hash = new_hash.to_string();
        next.updated_at = Utc::now();
        Ok(next)
    }

    /// Unconditional status set; any value may follow any other.
    pub fn with_status(&self, status: AccountStatus) -> Self {
        let mut next = self.clone();
        next.status = status;
        next.updated_at = Utc::now();
        next
    }

    /// Grant a role. Idempotent: the returned flag reports whether the role
    /// set actually changed.
    pub fn with_role_granted(&self, role: &str) -> AppResult<(Self, bool)> {
        if role.trim().is_empty() {
            return Err(AppError::validation("Role cannot be empty"));
        }
        if self.roles.iter().any(|r| r == role) {
            return Ok((self.clone(), false));
        }
        let mut next = self.clone();
        next.roles.push(role.to_string());
        next.updated_at = Utc::now();
        Ok((next, true))
    }

    /// Revoke a role. A no-op when the role is absent; the returned flag
    /// reports whether a removal occurred.
    pub fn with_role_revoked(&self, role: &str) -> (Self, bool) {
        let Some(pos) = self.roles.iter().position(|r| r == role) else {
            return (self.clone(), false);
        };
        let mut next = self.clone();
        next.roles.remove(pos);
        next.updated_at = Utc::now();
        (next, true)
    }

    /// Advance the optimistic-concurrency token. The only operation allowed
    /// to touch `version`; applied exactly once per accepted mutation.
    pub fn bump_version(mut self) -> Self {
        self.version += 1;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

fn validate_username(username: &str) -> AppResult<()> {
    let len = username.chars().count();
    if username.trim().is_empty() || !(3..=20).contains(&len) {
        return Err(AppError::validation(
            "Username must be between 3 and 20 characters",
        ));
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(AppError::validation("Username is reserved"));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> AppResult<()> {
    let len = full_name.chars().count();
    if full_name.trim().is_empty() || !(2..=80).contains(&len) {
        return Err(AppError::validation(
            "Full name must be between 2 and 80 characters",
        ));
    }
    if !FULL_NAME_RE.is_match(full_name) {
        return Err(AppError::validation(
            "Full name must not contain symbols or digits",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::validation("Email cannot be empty"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(())
}

/// Age in full elapsed years: calendar-year difference, minus one when the
/// birthday has not yet occurred this year.
fn validate_birth_date(birth_date: NaiveDate) -> AppResult<()> {
    let today = Utc::now().date_naive();
    let mut age = today.year() - birth_date.year();
    let birthday_passed = (today.month(), today.day()) >= (birth_date.month(), birth_date.day());
    if !birthday_passed {
        age -= 1;
    }
    if age < MIN_REGISTRATION_AGE {
        return Err(AppError::validation(format!(
            "Account holder must be at least {} years old",
            MIN_REGISTRATION_AGE
        )));
    }
    Ok(())
}

fn validate_terms_version(terms_version: &str) -> AppResult<()> {
    if terms_version.trim().is_empty() {
        return Err(AppError::validation("Terms version is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Months};

    fn valid_registration() -> Registration {
        Registration {
            username: "jdoe".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "Jane+promo@gmail.com".to_string(),
            phone_number: "+12025550123".to_string(),
            password_hash: "hashed".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            terms_version: "v2".to_string(),
            marketing_consent: true,
            registration_ip: "203.0.113.9".to_string(),
        }
    }

    #[test]
    fn register_derives_normalized_email() {
        let account = Account::register(valid_registration()).unwrap();
        assert_eq!(account.normalized_email, "jane@gmail.com");
        assert_eq!(
            account.normalized_email,
            identity::normalize_email(&account.email)
        );
        assert_eq!(account.status, AccountStatus::PendingVerification);
        assert_eq!(account.version, 1);
        assert!(account.roles.is_empty());
    }

    #[test]
    fn register_rejects_reserved_username_case_insensitively() {
        let mut input = valid_registration();
        input.username = "Admin".to_string();
        let err = Account::register(input).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn register_rejects_short_and_long_usernames() {
        let mut input = valid_registration();
        input.username = "ab".to_string();
        assert!(Account::register(input).is_err());

        let mut input = valid_registration();
        input.username = "a".repeat(21);
        assert!(Account::register(input).is_err());
    }

    #[test]
    fn register_rejects_full_name_with_digits() {
        let mut input = valid_registration();
        input.full_name = "Jane D03".to_string();
        let err = Account::register(input).unwrap_err();
        assert!(err.to_string().contains("symbols or digits"));
    }

    #[test]
    fn register_enforces_minimum_age_by_elapsed_years() {
        let thirteen_years_ago = Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(13 * 12))
            .unwrap();

        // Thirteenth birthday is tomorrow: still twelve today
        let mut input = valid_registration();
        input.birth_date = thirteen_years_ago + Duration::days(1);
        assert!(Account::register(input).is_err());

        // Thirteenth birthday is today: counts as thirteen
        let mut input = valid_registration();
        input.birth_date = thirteen_years_ago;
        assert!(Account::register(input).is_ok());
    }

    #[test]
    fn register_requires_terms_version() {
        let mut input = valid_registration();
        input.terms_version = "  ".to_string();
        assert!(Account::register(input).is_err());
    }

    #[test]
    fn profile_transition_is_both_or_neither() {
        let account = Account::register(valid_registration()).unwrap();
        let err = account.with_profile("New Name", "not-a-phone").unwrap_err();
        assert!(err.to_string().contains("E.164"));
        // Failed transition leaves the snapshot untouched
        assert_eq!(account.full_name, "Jane Doe");

        let next = account.with_profile("New Name", "+12025550124").unwrap();
        assert_eq!(next.full_name, "New Name");
        assert_eq!(next.phone_number, "+12025550124");
        assert_eq!(next.version, account.version);
    }

    #[test]
    fn password_hash_must_be_non_empty() {
        let account = Account::register(valid_registration()).unwrap();
        assert!(account.with_password_hash("").is_err());
        assert!(account.with_password_hash("new-hash").is_ok());
    }

    #[test]
    fn status_set_is_unconditional() {
        let account = Account::register(valid_registration()).unwrap();
        let next = account
            .with_status(AccountStatus::Deactivated)
            .with_status(AccountStatus::Active);
        assert_eq!(next.status, AccountStatus::Active);
    }

    #[test]
    fn role_grant_is_idempotent() {
        let account = Account::register(valid_registration()).unwrap();
        let (next, changed) = account.with_role_granted("moderator").unwrap();
        assert!(changed);
        let (next, changed) = next.with_role_granted("moderator").unwrap();
        assert!(!changed);
        assert_eq!(next.roles, vec!["moderator".to_string()]);
    }

    #[test]
    fn role_revoke_reports_whether_anything_happened() {
        let account = Account::register(valid_registration()).unwrap();
        let (account, _) = account.with_role_granted("moderator").unwrap();

        let (next, removed) = account.with_role_revoked("moderator");
        assert!(removed);
        assert!(next.roles.is_empty());

        let (_, removed) = next.with_role_revoked("moderator");
        assert!(!removed);
    }

    #[test]
    fn empty_role_rejected_on_grant() {
        let account = Account::register(valid_registration()).unwrap();
        assert!(account.with_role_granted("  ").is_err());
    }

    #[test]
    fn version_advances_by_exactly_one() {
        let account = Account::register(valid_registration()).unwrap();
        let bumped = account.clone().bump_version();
        assert_eq!(bumped.version, account.version + 1);
    }
}

//! Identity rules - pure validation and normalization functions.
//!
//! Everything in this module is side-effect free. The account entity and
//! the account service both lean on these rules; they never duplicate them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{
    BD_CALLING_CODE, BD_OPERATOR_PREFIXES, BD_PHONE_LENGTH, CANONICAL_MAIL_DOMAIN,
    MASK_PLACEHOLDER, MIN_PASSWORD_CLASSES, MIN_PASSWORD_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// General E.164 shape: optional leading `+`, first digit 1-9, up to 15 digits
static E164_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("valid E.164 regex"));

/// Canonical form of an email address used for uniqueness lookups.
///
/// Lower-cases and trims the input. When the domain is the canonical
/// consumer-mail domain, a `+tag` suffix in the local part is stripped.
/// Input without exactly one `@` falls back to the lower-cased input
/// unchanged; the fallback is defined behavior, not an error.
pub fn normalize_email(email: &str) -> String {
    let lowered = email.to_lowercase();
    let trimmed = lowered.trim();

    let parts: Vec<&str> = trimmed.split('@').collect();
    if parts.len() != 2 {
        return lowered;
    }

    let (mut local, domain) = (parts[0], parts[1]);
    if domain == CANONICAL_MAIL_DOMAIN {
        if let Some(plus) = local.find('+') {
            local = &local[..plus];
        }
    }

    format!("{}@{}", local, domain)
}

/// Validate a phone number.
///
/// The general check is the E.164 shape. Numbers carrying the `+880`
/// calling code additionally require total length 14 and an operator
/// prefix from the allow-list; each of those failures carries its own
/// reason, distinct from the generic format failure.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    if phone.trim().is_empty() || !E164_RE.is_match(phone) {
        return Err(AppError::validation("Invalid E.164 phone format"));
    }

    if phone.starts_with(BD_CALLING_CODE) {
        if phone.len() != BD_PHONE_LENGTH {
            return Err(AppError::validation("Invalid Bangladesh phone length"));
        }
        let operator = &phone[BD_CALLING_CODE.len()..BD_CALLING_CODE.len() + 3];
        if !BD_OPERATOR_PREFIXES.contains(&operator) {
            return Err(AppError::validation(
                "Invalid operator prefix for Bangladesh",
            ));
        }
    }

    Ok(())
}

/// Validate password strength relative to the account's identity.
///
/// Checks run in a fixed order so callers always observe the same failure
/// first: length, then character-class coverage, then containment of the
/// username or email local part.
pub fn validate_password_strength(password: &str, email: &str, username: &str) -> AppResult<()> {
    if password.trim().is_empty() || password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    let classes = [has_upper, has_lower, has_digit, has_symbol]
        .iter()
        .filter(|&&present| present)
        .count() as u32;
    if classes < MIN_PASSWORD_CLASSES {
        return Err(AppError::validation(
            "Password must include 3 of 4: upper, lower, digit, symbol",
        ));
    }

    let email_local = email.split('@').next().unwrap_or("");
    let contains_username = !username.is_empty() && password.contains(username);
    let contains_local = !email_local.is_empty() && password.contains(email_local);
    if contains_username || contains_local {
        return Err(AppError::validation(
            "Password cannot contain username or email parts",
        ));
    }

    Ok(())
}

/// Mask an email for display, exposing only the first character of the
/// local part. Empty input masks to the fixed placeholder.
pub fn mask_email(email: &str) -> String {
    let mut chars = email.chars();
    let Some(first) = chars.next() else {
        return MASK_PLACEHOLDER.to_string();
    };

    match email.split_once('@') {
        Some((_, domain)) => format!("{}****@{}", first, domain),
        None => format!("{}****", first),
    }
}

/// Mask a phone number for display, exposing only the last 4 characters.
/// Empty input masks to the fixed placeholder.
pub fn mask_phone(phone: &str) -> String {
    if phone.is_empty() {
        return MASK_PLACEHOLDER.to_string();
    }
    let tail: String = phone
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("+****{}", tail)
}

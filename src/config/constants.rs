//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

// =============================================================================
// Identity rules
// =============================================================================

/// Usernames disallowed regardless of availability
pub const RESERVED_USERNAMES: &[&str] = &["admin", "support", "system", "root"];

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// How many of the four character classes a password must cover
pub const MIN_PASSWORD_CLASSES: u32 = 3;

/// Minimum age (in full elapsed years) at registration time
pub const MIN_REGISTRATION_AGE: i32 = 13;

/// Consumer-mail domain whose `+tag` local-part suffixes are stripped
/// during email normalization
pub const CANONICAL_MAIL_DOMAIN: &str = "gmail.com";

/// Calling-code prefix that triggers the operator-prefix check
pub const BD_CALLING_CODE: &str = "+880";

/// Required total length for numbers carrying [`BD_CALLING_CODE`]
pub const BD_PHONE_LENGTH: usize = 14;

/// Valid operator prefixes for [`BD_CALLING_CODE`] numbers
pub const BD_OPERATOR_PREFIXES: &[&str] = &["171", "181", "191", "161", "131", "141", "151"];

/// Placeholder returned when masking empty contact data
pub const MASK_PLACEHOLDER: &str = "****";

// =============================================================================
// Persistence
// =============================================================================

/// Collection holding account documents
pub const ACCOUNTS_COLLECTION: &str = "accounts";

/// Collection holding append-only audit entries
pub const AUDIT_COLLECTION: &str = "audit_logs";

/// Default MongoDB connection string
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

/// Default database name
pub const DEFAULT_DATABASE_NAME: &str = "account_core";

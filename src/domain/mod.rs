//! Core business entities and rules.

mod account;
mod audit;
pub mod identity;
mod password;

pub use account::{Account, AccountStatus, Registration};
pub use audit::AuditEntry;
pub use password::{Argon2Hasher, PasswordHasher};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockPasswordHasher;

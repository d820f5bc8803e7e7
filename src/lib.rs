//! Account management core.
//!
//! The account domain model with its invariant-enforcing state transitions,
//! combined with the optimistic-concurrency persistence protocol that guards
//! those transitions against concurrent writers. Transport, routing, and
//! dependency wiring live outside this crate; the collaborator traits in
//! [`infra`] and [`domain`] mark that boundary.
//!
//! # Architecture Layers
//!
//! - **config**: Application configuration and constants
//! - **domain**: Account aggregate, identity rules, collaborator contracts
//! - **services**: Use-case orchestration (register, mutate, search)
//! - **infra**: Persistence (MongoDB and in-memory) and external collaborators
//! - **types**: Shared types (pagination)
//! - **errors**: Centralized error handling
//!
//! # Concurrency model
//!
//! No in-process locking. Each request mutates its own fetched snapshot and
//! persists it through a version compare-and-swap at the store boundary.
//! Two concurrent writers to the same account produce exactly one success
//! and one [`errors::AppError::VersionConflict`]; the loser re-fetches and
//! decides whether to retry.

pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use config::AppConfig;
pub use domain::{Account, AccountStatus, Argon2Hasher, AuditEntry, PasswordHasher};
pub use errors::{AppError, AppResult};
pub use infra::{AccountRepository, MemoryAccountStore, MongoAccountStore, SearchCriteria};
pub use services::{AccountManager, AccountService};

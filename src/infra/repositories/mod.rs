//! Repository layer - data access abstraction.
//!
//! Repositories provide an abstraction over document persistence. The
//! trait's compare-and-swap update is the system's only synchronization
//! primitive; see [`AccountRepository::update`].

mod account_repository;
mod memory;
mod mongo;

pub use account_repository::{AccountRepository, SearchCriteria};
pub use memory::MemoryAccountStore;
pub use mongo::MongoAccountStore;

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;

//! Infrastructure concerns: persistence and external collaborators.

mod audit;
mod db;
pub mod repositories;
mod risk;

pub use audit::{AuditSink, MongoAuditLog};
pub use db::connect;
pub use repositories::{
    AccountRepository, MemoryAccountStore, MongoAccountStore, SearchCriteria,
};
pub use risk::{RiskEvaluator, StaticRiskRules};

#[cfg(any(test, feature = "test-utils"))]
pub use audit::MockAuditSink;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use risk::MockRiskEvaluator;

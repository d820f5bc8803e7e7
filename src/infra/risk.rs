//! Risk evaluation collaborator.

use async_trait::async_trait;

use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Consulted once per registration, before any persistence. A `true`
/// verdict aborts the registration.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RiskEvaluator: Send + Sync {
    async fn is_risky(&self, source_address: &str, username: &str) -> AppResult<bool>;
}

/// Built-in heuristic: flag loopback registrations using a known-bad
/// username marker. Stands in for a real reputation service.
#[derive(Default)]
pub struct StaticRiskRules;

#[async_trait]
impl RiskEvaluator for StaticRiskRules {
    async fn is_risky(&self, source_address: &str, username: &str) -> AppResult<bool> {
        let risky = source_address == "127.0.0.1" && username.contains("fraud");
        if risky {
            tracing::warn!(%source_address, %username, "registration flagged as risky");
        }
        Ok(risky)
    }
}

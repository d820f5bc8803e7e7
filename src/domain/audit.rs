//! Audit trail record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable, append-only audit record. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub action: String,
    pub details: String,
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        account_id: Option<Uuid>,
        action: impl Into<String>,
        details: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            action: action.into(),
            details: details.into(),
            ip_address: ip_address.into(),
            timestamp: Utc::now(),
        }
    }
}

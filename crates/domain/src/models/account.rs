//! Account (profile) domain model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A creator account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub region: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

/// The identity a request acts on behalf of.
///
/// Passed explicitly into the allocator and the orchestrator instead of being
/// read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub is_premium: bool,
    pub region: String,
}

impl From<&Account> for CallerIdentity {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            is_premium: account.is_premium,
            region: account.region.clone(),
        }
    }
}

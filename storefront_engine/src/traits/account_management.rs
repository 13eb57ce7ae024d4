use thiserror::Error;

use crate::db_types::{ActorId, PayoutAccount};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Payout account mappings. An actor without a payout account cannot receive transfers.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_payout_account(&self, actor_id: &ActorId) -> Result<Option<PayoutAccount>, AccountApiError>;

    /// Links `actor_id` to the processor account `external_account_id`, replacing any previous link.
    async fn upsert_payout_account(
        &self,
        actor_id: &ActorId,
        external_account_id: &str,
    ) -> Result<PayoutAccount, AccountApiError>;
}

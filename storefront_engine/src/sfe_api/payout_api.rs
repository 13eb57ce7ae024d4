use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    db_types::{ActorId, PayoutAccount},
    processor::{PaymentProcessor, ProcessorError},
    sfe_api::{
        auth_context::AuthContext,
        errors::{CommerceError, NO_ACCOUNT_MESSAGE},
    },
    traits::AccountManagement,
};

/// Payout accounts: where intermediaries and sellers receive their money.
pub struct PayoutAccountApi<B, P> {
    db: B,
    processor: P,
}

impl<B, P> Debug for PayoutAccountApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PayoutAccountApi")
    }
}

impl<B, P> PayoutAccountApi<B, P> {
    pub fn new(db: B, processor: P) -> Self {
        Self { db, processor }
    }
}

impl<B, P> PayoutAccountApi<B, P>
where
    B: AccountManagement,
    P: PaymentProcessor,
{
    /// Attaches a bank account or card to the caller's payout account.
    ///
    /// `details` must carry an `external_account` entry and are otherwise handed to the processor untouched. The
    /// processor's response is returned as is. A processor rejection is passed back with the processor's own error
    /// object.
    pub async fn link_payout_account(&self, ctx: &AuthContext, details: Value) -> Result<Value, CommerceError> {
        if details.get("external_account").map_or(true, Value::is_null) {
            return Err(CommerceError::InvalidArgument("This request does not include an external_account.".into()));
        }
        let account = self.require_account(&ctx.actor_id).await?;
        debug!("🔄️🏦️ Linking an external account to {} for {}", account.external_account_id, ctx.actor_id);
        match self.processor.create_external_account(&account.external_account_id, &details).await {
            Ok(result) => {
                info!("🔄️🏦️ External account linked for {}", ctx.actor_id);
                Ok(result)
            },
            Err(ProcessorError::Rejected(body)) => {
                warn!("🔄️🏦️ The processor refused the external account for {}. {}", ctx.actor_id, body.message);
                Err(CommerceError::ExternalProcessorError { message: body.message, target: None, raw: Some(body.raw) })
            },
            Err(e @ ProcessorError::Transport(_)) => {
                error!("🔄️🏦️ Could not link external account for {}. {e}", ctx.actor_id);
                Err(CommerceError::InvalidArgument("Invalid argument.".into()))
            },
        }
    }

    /// Records `external_account_id` as the payout account of `actor_id`. Admin only.
    pub async fn register_payout_account(
        &self,
        ctx: &AuthContext,
        actor_id: &ActorId,
        external_account_id: &str,
    ) -> Result<PayoutAccount, CommerceError> {
        if !ctx.is_admin() {
            return Err(CommerceError::PermissionDenied("Only administrators can register payout accounts.".into()));
        }
        if external_account_id.trim().is_empty() {
            return Err(CommerceError::InvalidArgument("The external account id cannot be empty.".into()));
        }
        let account = self.db.upsert_payout_account(actor_id, external_account_id).await?;
        info!("🔄️🏦️ {} registered payout account {external_account_id} for {actor_id}", ctx.actor_id);
        Ok(account)
    }

    /// The processor balance of the caller's payout account.
    pub async fn balance(&self, ctx: &AuthContext) -> Result<Value, CommerceError> {
        let account = self.require_account(&ctx.actor_id).await?;
        self.processor.retrieve_balance(&account.external_account_id).await.map_err(|e| match e {
            ProcessorError::Rejected(body) => {
                CommerceError::ExternalProcessorError { message: body.message, target: None, raw: Some(body.raw) }
            },
            e @ ProcessorError::Transport(_) => CommerceError::UnrecognizedProcessorError(e.to_string()),
        })
    }

    async fn require_account(&self, actor_id: &ActorId) -> Result<PayoutAccount, CommerceError> {
        self.db
            .fetch_payout_account(actor_id)
            .await?
            .ok_or_else(|| CommerceError::InvalidArgument(NO_ACCOUNT_MESSAGE.to_string()))
    }
}

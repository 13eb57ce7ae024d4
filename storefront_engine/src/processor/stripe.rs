use log::*;
use serde_json::Value;
use stripe_tools::{
    helpers::stripe_currency,
    NewSku,
    NewTransfer,
    SkuInventory,
    SkuUpdate,
    StripeApi,
    StripeApiError,
};

use crate::{
    db_types::Amount,
    processor::{
        CatalogItem,
        CatalogMirror,
        PaymentProcessor,
        ProcessorError,
        ProcessorErrorBody,
        TransferReceipt,
        TransferRequest,
    },
};

impl From<StripeApiError> for ProcessorError {
    fn from(e: StripeApiError) -> Self {
        match e {
            StripeApiError::Api { status, error } => ProcessorError::Rejected(ProcessorErrorBody {
                status,
                kind: error.error_type,
                code: error.code,
                decline_code: error.decline_code,
                message: error.message,
                param: error.param,
                raw: error.raw,
            }),
            other => ProcessorError::Transport(other.to_string()),
        }
    }
}

impl PaymentProcessor for StripeApi {
    async fn confirm_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError> {
        Ok(self.confirm_payment_intent(payment_intent_id, idempotency_key).await?)
    }

    async fn cancel_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError> {
        Ok(self.cancel_payment_intent(payment_intent_id, idempotency_key).await?)
    }

    async fn refund_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError> {
        Ok(self.create_refund(payment_intent_id, idempotency_key).await?)
    }

    async fn create_transfer(
        &self,
        transfer: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<TransferReceipt, ProcessorError> {
        let request = NewTransfer {
            amount: transfer.amount.value(),
            currency: stripe_currency(&transfer.currency),
            destination: transfer.destination.clone(),
            transfer_group: transfer.transfer_group.clone(),
            description: transfer.description.clone(),
            metadata: transfer.metadata.clone(),
        };
        let result = StripeApi::create_transfer(self, &request, idempotency_key).await?;
        Ok(TransferReceipt { id: result.id, amount: Amount::from(result.amount), destination: result.destination })
    }

    async fn create_external_account(&self, account_id: &str, details: &Value) -> Result<Value, ProcessorError> {
        Ok(StripeApi::create_external_account(self, account_id, details).await?)
    }

    async fn retrieve_balance(&self, account_id: &str) -> Result<Value, ProcessorError> {
        let balance = StripeApi::retrieve_balance(self, account_id).await?;
        serde_json::to_value(balance).map_err(|e| ProcessorError::Transport(e.to_string()))
    }
}

impl CatalogMirror for StripeApi {
    async fn create_catalog_item(&self, item: &CatalogItem) -> Result<Value, ProcessorError> {
        let sku = NewSku {
            id: item.id.clone(),
            product: item.product.clone(),
            inventory: SkuInventory::finite(item.inventory),
            currency: stripe_currency(&item.currency),
            price: item.price.value(),
            active: item.active,
            metadata: item.metadata.clone(),
        };
        trace!("📦️ Mirroring new SKU {} to Stripe", item.id);
        Ok(self.create_sku(&sku).await?)
    }

    async fn update_catalog_item(&self, item: &CatalogItem) -> Result<Value, ProcessorError> {
        let update = SkuUpdate {
            inventory: SkuInventory::finite(item.inventory),
            currency: stripe_currency(&item.currency),
            price: item.price.value(),
            active: item.active,
            metadata: item.metadata.clone(),
        };
        trace!("📦️ Mirroring SKU update {} to Stripe", item.id);
        Ok(self.update_sku(&item.id, &update).await?)
    }
}

use mockall::mock;
use serde_json::Value;
use storefront_engine::{
    db_types::{ActorId, Order, PayoutAccount, ProviderId},
    processor::{PaymentProcessor, ProcessorError, TransferReceipt, TransferRequest},
    traits::{AccountApiError, AccountManagement, OrderLedgerError, OrderQueries, OrderQueryFilter},
};

mock! {
    pub Accounts {}
    impl AccountManagement for Accounts {
        async fn fetch_payout_account(&self, actor_id: &ActorId) -> Result<Option<PayoutAccount>, AccountApiError>;
        async fn upsert_payout_account(&self, actor_id: &ActorId, external_account_id: &str) -> Result<PayoutAccount, AccountApiError>;
    }
}

mock! {
    pub OrderStore {}
    impl OrderQueries for OrderStore {
        async fn fetch_orders_for_buyer(&self, buyer: &ActorId) -> Result<Vec<Order>, OrderLedgerError>;
        async fn search_provider_orders(&self, provider_id: &ProviderId, filter: OrderQueryFilter) -> Result<Vec<Order>, OrderLedgerError>;
    }
}

mock! {
    pub Processor {}
    impl PaymentProcessor for Processor {
        async fn confirm_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError>;
        async fn cancel_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError>;
        async fn refund_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError>;
        async fn create_transfer(&self, transfer: &TransferRequest, idempotency_key: &str) -> Result<TransferReceipt, ProcessorError>;
        async fn create_external_account(&self, account_id: &str, details: &Value) -> Result<Value, ProcessorError>;
        async fn retrieve_balance(&self, account_id: &str) -> Result<Value, ProcessorError>;
    }
}

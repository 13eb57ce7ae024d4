use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde_json::{json, Value};
use storefront_engine::processor::{
    CatalogItem,
    CatalogMirror,
    PaymentProcessor,
    ProcessorError,
    ProcessorErrorBody,
    TransferReceipt,
    TransferRequest,
    RESOURCE_MISSING,
};

/// One call made to the fake processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub target: String,
    pub key: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    failures: HashMap<&'static str, ProcessorError>,
    calls: Vec<Call>,
}

/// An in-memory processor. Calls succeed unless a failure has been scripted for the operation with
/// [`FakeProcessor::fail_next`], in which case the next call to it fails once.
#[derive(Debug, Clone, Default)]
pub struct FakeProcessor {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProcessor {
    pub fn fail_next(&self, op: &'static str, error: ProcessorError) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| c.op == op).count()
    }

    fn record(&self, op: &'static str, target: &str, key: Option<&str>) -> Result<(), ProcessorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call { op, target: target.to_string(), key: key.map(String::from) });
        match state.failures.remove(op) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub fn rejected(status: u16, kind: &str, code: Option<&str>, message: &str) -> ProcessorError {
    ProcessorError::Rejected(ProcessorErrorBody {
        status,
        kind: kind.to_string(),
        code: code.map(String::from),
        decline_code: None,
        message: message.to_string(),
        param: None,
        raw: json!({ "type": kind, "code": code, "message": message }),
    })
}

pub fn card_declined() -> ProcessorError {
    rejected(402, "card_error", Some("card_declined"), "Your card was declined.")
}

pub fn resource_missing() -> ProcessorError {
    rejected(404, "invalid_request_error", Some(RESOURCE_MISSING), "No such product: 'prod1'")
}

pub fn invalid_request(message: &str) -> ProcessorError {
    rejected(400, "invalid_request_error", Some("parameter_invalid"), message)
}

pub fn processor_down() -> ProcessorError {
    ProcessorError::Transport("connection refused".to_string())
}

impl PaymentProcessor for FakeProcessor {
    async fn confirm_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError> {
        self.record("confirm", payment_intent_id, Some(idempotency_key))?;
        Ok(json!({ "id": payment_intent_id, "object": "payment_intent", "status": "succeeded" }))
    }

    async fn cancel_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError> {
        self.record("cancel", payment_intent_id, Some(idempotency_key))?;
        Ok(json!({ "id": payment_intent_id, "object": "payment_intent", "status": "canceled" }))
    }

    async fn refund_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError> {
        self.record("refund", payment_intent_id, Some(idempotency_key))?;
        Ok(json!({ "id": format!("re_{payment_intent_id}"), "object": "refund", "payment_intent": payment_intent_id }))
    }

    async fn create_transfer(
        &self,
        transfer: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<TransferReceipt, ProcessorError> {
        self.record("transfer", &transfer.destination, Some(idempotency_key))?;
        Ok(TransferReceipt {
            id: format!("tr_{idempotency_key}"),
            amount: transfer.amount,
            destination: Some(transfer.destination.clone()),
        })
    }

    async fn create_external_account(&self, account_id: &str, details: &Value) -> Result<Value, ProcessorError> {
        self.record("external_account", account_id, None)?;
        Ok(json!({ "id": "ba_1", "account": account_id, "object": details["external_account"]["object"] }))
    }

    async fn retrieve_balance(&self, account_id: &str) -> Result<Value, ProcessorError> {
        self.record("balance", account_id, None)?;
        Ok(json!({ "object": "balance", "available": [{ "amount": 1200, "currency": "jpy" }] }))
    }
}

impl CatalogMirror for FakeProcessor {
    async fn create_catalog_item(&self, item: &CatalogItem) -> Result<Value, ProcessorError> {
        self.record("create_sku", &item.id, None)?;
        Ok(json!({ "id": item.id, "object": "sku", "product": item.product }))
    }

    async fn update_catalog_item(&self, item: &CatalogItem) -> Result<Value, ProcessorError> {
        self.record("update_sku", &item.id, None)?;
        Ok(json!({ "id": item.id, "object": "sku", "product": item.product }))
    }
}

use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    db_types::{Order, OrderId, PaymentStatus, PaymentUpdate, ProviderId},
    events::{EventProducers, OrderPaymentChangedEvent},
    processor::{FailureClass, PaymentProcessor, ProcessorError},
    sfe_api::{
        auth_context::AuthContext,
        errors::CommerceError,
        revenue_split::{RevenueSplit, TransferOutcome},
    },
    traits::{AccountManagement, OrderLedger, TransitionResult},
};

/// The result of a successful confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmResult {
    pub order: Order,
    pub transfers: Vec<TransferOutcome>,
}

/// `PaymentFlowApi` drives an order's payment through the processor.
///
/// Every status change goes through [`OrderLedger::apply_transition`], so both copies of the order always agree. The
/// legal moves are
/// * `processing` to `succeeded` or `payment_failed` ([`Self::confirm`]),
/// * `processing` to `canceled` ([`Self::cancel`]),
/// * `succeeded` to `canceled` ([`Self::refund`]).
///
/// Each call checks the order's status before talking to the processor, so a request that is bound to fail never
/// reaches it. The ledger re-checks inside its transaction, so a racing duplicate still fails cleanly.
pub struct PaymentFlowApi<B, P> {
    db: B,
    processor: P,
    producers: EventProducers,
    split: RevenueSplit,
}

impl<B, P> Debug for PaymentFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi (split {}%)", self.split.percent())
    }
}

impl<B, P> PaymentFlowApi<B, P> {
    pub fn new(db: B, processor: P, producers: EventProducers) -> Self {
        Self { db, processor, producers, split: RevenueSplit::default() }
    }

    pub fn with_revenue_split(mut self, split: RevenueSplit) -> Self {
        self.split = split;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }
}

impl<B, P> PaymentFlowApi<B, P>
where
    B: OrderLedger + AccountManagement,
    P: PaymentProcessor,
{
    /// Captures the payment for a `processing` order and marks it `succeeded`.
    ///
    /// Only the order's provider may confirm. The order id is the processor idempotency key, so a repeated capture is
    /// harmless even if it gets past the status check. Intermediaries are paid their share after the order commits.
    ///
    /// If the processor refuses the payment itself (a card error or a failed payment attempt), the order is moved to
    /// `payment_failed` and the processor's error is still returned.
    pub async fn confirm(
        &self,
        ctx: &AuthContext,
        order_id: &str,
        payment_intent_id: &str,
    ) -> Result<ConfirmResult, CommerceError> {
        let order_id = parse_order_id(order_id)?;
        if payment_intent_id.trim().is_empty() {
            return Err(CommerceError::InvalidArgument("This request does not contain a paymentIntentID.".into()));
        }
        let provider_id = ctx.require_provider()?.clone();
        let order = self.fetch_provider_order(&order_id, &provider_id).await?;
        expect_status(&order, PaymentStatus::Processing)?;
        trace!("🔄️✅️ Confirming payment {payment_intent_id} for order {order_id}");
        let intent = match self.processor.confirm_payment(payment_intent_id, order_id.as_str()).await {
            Ok(intent) => intent,
            Err(e) => return Err(self.payment_refused(&order_id, &provider_id, e).await),
        };
        let TransitionResult { previous_status, order } = self
            .db
            .apply_transition(&order_id, &provider_id, &[PaymentStatus::Processing], move |_| {
                PaymentUpdate::new(PaymentStatus::Succeeded).with_result(intent)
            })
            .await?;
        info!("🔄️✅️ Order {order_id} payment succeeded");
        self.notify(previous_status, &order).await;
        let transfers = self.split.distribute(&order, &self.db, &self.processor).await;
        Ok(ConfirmResult { order, transfers })
    }

    /// Cancels the payment of a `processing` order before it is captured.
    ///
    /// The order's provider, or the buyer who placed it, may cancel.
    pub async fn cancel(&self, ctx: &AuthContext, order_id: &str) -> Result<Order, CommerceError> {
        let order_id = parse_order_id(order_id)?;
        let order = self.locate_order(ctx, &order_id).await?;
        expect_status(&order, PaymentStatus::Processing)?;
        let payment_intent = payment_reference(&order)?;
        let key = format!("{order_id}-cancel");
        trace!("🔄️❌️ Cancelling payment {payment_intent} for order {order_id}");
        let result =
            self.processor.cancel_payment(&payment_intent, &key).await.map_err(|e| processor_error(&order_id, e))?;
        let TransitionResult { previous_status, order } = self
            .db
            .apply_transition(&order_id, &order.provided_by, &[PaymentStatus::Processing], move |_| {
                PaymentUpdate::new(PaymentStatus::Canceled).with_result(result)
            })
            .await?;
        info!("🔄️❌️ Order {order_id} canceled by {}", ctx.actor_id);
        self.notify(previous_status, &order).await;
        Ok(order)
    }

    /// Refunds a `succeeded` order in full and marks it `canceled`.
    ///
    /// The stored payment result is kept as is. Revenue-split transfers are not reversed.
    pub async fn refund(&self, ctx: &AuthContext, order_id: &str) -> Result<Order, CommerceError> {
        let order_id = parse_order_id(order_id)?;
        let order = self.locate_order(ctx, &order_id).await?;
        expect_status(&order, PaymentStatus::Succeeded)?;
        let payment_intent = payment_reference(&order)?;
        let key = format!("{order_id}-refund");
        trace!("🔄️💰️ Refunding payment {payment_intent} for order {order_id}");
        let refund =
            self.processor.refund_payment(&payment_intent, &key).await.map_err(|e| processor_error(&order_id, e))?;
        let refund_id = refund.get("id").and_then(Value::as_str).unwrap_or("unknown").to_string();
        let TransitionResult { previous_status, order } = self
            .db
            .apply_transition(&order_id, &order.provided_by, &[PaymentStatus::Succeeded], |_| {
                PaymentUpdate::new(PaymentStatus::Canceled)
            })
            .await?;
        info!("🔄️💰️ Order {order_id} refunded ({refund_id}) on behalf of {}", ctx.actor_id);
        self.notify(previous_status, &order).await;
        Ok(order)
    }

    async fn fetch_provider_order(&self, order_id: &OrderId, provider_id: &ProviderId) -> Result<Order, CommerceError> {
        self.db.fetch_order_for_provider(order_id, provider_id).await?.ok_or_else(|| {
            CommerceError::NotFound(format!("The order does not exist. providers/{provider_id}/orders/{order_id}"))
        })
    }

    /// Finds the order as the caller's provider, falling back to the caller's own purchases.
    async fn locate_order(&self, ctx: &AuthContext, order_id: &OrderId) -> Result<Order, CommerceError> {
        if let Some(provider_id) = &ctx.provider_id {
            if let Some(order) = self.db.fetch_order_for_provider(order_id, provider_id).await? {
                return Ok(order);
            }
        }
        match self.db.fetch_order_for_buyer(order_id, &ctx.actor_id).await? {
            Some(order) => Ok(order),
            None => Err(CommerceError::NotFound(format!("The order does not exist. {order_id}"))),
        }
    }

    /// Turns a failed confirmation into the error for the caller. A definitive refusal also fails the order.
    async fn payment_refused(&self, order_id: &OrderId, provider_id: &ProviderId, e: ProcessorError) -> CommerceError {
        if e.classify() == FailureClass::Definitive {
            warn!("🔄️⛔️ Payment for order {order_id} was refused. {e}");
            let raw = e.raw().cloned();
            let res = self
                .db
                .apply_transition(order_id, provider_id, &[PaymentStatus::Processing], move |_| {
                    let update = PaymentUpdate::new(PaymentStatus::PaymentFailed);
                    match raw {
                        Some(raw) => update.with_result(raw),
                        None => update,
                    }
                })
                .await;
            match res {
                Ok(TransitionResult { previous_status, order }) => self.notify(previous_status, &order).await,
                Err(err) => error!("🔄️⛔️ Could not mark order {order_id} as payment_failed. {err}"),
            }
        }
        processor_error(order_id, e)
    }

    async fn notify(&self, old_status: PaymentStatus, order: &Order) {
        let event = OrderPaymentChangedEvent::new(old_status, order.clone());
        self.producers.publish_payment_changed(event).await;
    }
}

fn parse_order_id(order_id: &str) -> Result<OrderId, CommerceError> {
    if order_id.trim().is_empty() {
        return Err(CommerceError::InvalidArgument("This request does not include an orderID.".into()));
    }
    order_id.parse::<OrderId>().map_err(|e| CommerceError::InvalidArgument(e.to_string()))
}

fn expect_status(order: &Order, status: PaymentStatus) -> Result<(), CommerceError> {
    if order.payment_status == status {
        Ok(())
    } else {
        debug!("🔄️ Order {} is {}, expected {status}", order.id, order.payment_status);
        Err(CommerceError::invalid_order_status(order.id.as_str()))
    }
}

fn payment_reference(order: &Order) -> Result<String, CommerceError> {
    order
        .payment_reference()
        .ok_or_else(|| CommerceError::InvalidArgument(format!("Order {} has no payment intent.", order.id)))
}

fn processor_error(order_id: &OrderId, e: ProcessorError) -> CommerceError {
    match e.classify() {
        FailureClass::Unrecognized => {
            error!("🔄️ Payment processor failure for order {order_id}. {e}");
            CommerceError::UnrecognizedProcessorError(e.to_string())
        },
        FailureClass::Definitive | FailureClass::Known => {
            warn!("🔄️ Payment processor rejected the request for order {order_id}. {e}");
            CommerceError::ExternalProcessorError {
                message: e.to_string(),
                target: Some(order_id.to_string()),
                raw: e.raw().cloned(),
            }
        },
    }
}

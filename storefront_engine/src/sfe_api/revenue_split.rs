//! Revenue sharing with intermediaries.
//!
//! Any line item that names a `mediated_by` actor earns that actor a share of the line's amount. The share is paid
//! out as a processor transfer once the order's payment has succeeded. Transfers happen outside the ledger
//! transaction, so a failed transfer never undoes the order; it is logged and reported in the outcome.
use std::collections::BTreeMap;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ActorId, Amount, LineItem, Order},
    processor::{PaymentProcessor, TransferReceipt, TransferRequest},
    traits::AccountManagement,
};

pub const DEFAULT_SPLIT_PERCENT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueSplit {
    percent: i64,
}

impl Default for RevenueSplit {
    fn default() -> Self {
        Self { percent: DEFAULT_SPLIT_PERCENT }
    }
}

/// What happened to the share of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum TransferOutcome {
    Issued { line_index: usize, receipt: TransferReceipt },
    /// The intermediary has no payout account
    Skipped { line_index: usize, actor_id: ActorId },
    /// The share rounds down to nothing, so no transfer was requested
    NothingToPay { line_index: usize, actor_id: ActorId },
    Failed { line_index: usize, actor_id: ActorId, reason: String },
}

impl RevenueSplit {
    /// `percent` is clamped to 0..=100
    pub fn new(percent: i64) -> Self {
        Self { percent: percent.clamp(0, 100) }
    }

    pub fn percent(&self) -> i64 {
        self.percent
    }

    /// The intermediary's share, rounded down. `None` if the share cannot be represented.
    pub fn transfer_amount(&self, amount: Amount) -> Option<Amount> {
        amount.percentage_floor(self.percent)
    }

    pub fn idempotency_key(order_id: &str, line_index: usize) -> String {
        format!("{order_id}-transfer-{line_index}")
    }

    /// Builds the transfer of `amount` for a mediated line item, paying into `destination`.
    pub fn transfer_request(
        order: &Order,
        item: &LineItem,
        actor_id: &ActorId,
        destination: &str,
        amount: Amount,
    ) -> TransferRequest {
        let mut metadata = BTreeMap::new();
        metadata.insert("uid".to_string(), actor_id.to_string());
        TransferRequest {
            amount,
            currency: item.currency.clone(),
            destination: destination.to_string(),
            transfer_group: order.id.to_string(),
            description: format!("Transfer from Order: [{}] to UID: [{actor_id}]", order.id),
            metadata,
        }
    }

    /// Pays every intermediary on the order their share. Each line item is handled independently: a missing payout
    /// account or a failed transfer does not stop the others.
    pub async fn distribute<B, P>(&self, order: &Order, db: &B, processor: &P) -> Vec<TransferOutcome>
    where
        B: AccountManagement,
        P: PaymentProcessor,
    {
        let mut outcomes = Vec::new();
        for (line_index, item) in order.items.iter().enumerate() {
            let Some(actor_id) = &item.mediated_by else { continue };
            let outcome = self.pay_line(order, line_index, item, actor_id, db, processor).await;
            outcomes.push(outcome);
        }
        if !outcomes.is_empty() {
            debug!("🔄️💸️ Revenue split for order {} complete: {} transfers considered", order.id, outcomes.len());
        }
        outcomes
    }

    async fn pay_line<B, P>(
        &self,
        order: &Order,
        line_index: usize,
        item: &LineItem,
        actor_id: &ActorId,
        db: &B,
        processor: &P,
    ) -> TransferOutcome
    where
        B: AccountManagement,
        P: PaymentProcessor,
    {
        let amount = match self.transfer_amount(item.amount) {
            Some(amount) if amount > Amount::from(0) => amount,
            Some(amount) => {
                debug!("🔄️💸️ {actor_id}'s share of line {line_index} of order {} is {amount}. Nothing to pay", order.id);
                return TransferOutcome::NothingToPay { line_index, actor_id: actor_id.clone() };
            },
            None => {
                error!("🔄️💸️ The share of line {line_index} of order {} overflows. Amount: {}", order.id, item.amount);
                let reason = format!("The share of {} cannot be represented.", item.amount);
                return TransferOutcome::Failed { line_index, actor_id: actor_id.clone(), reason };
            },
        };
        let account = match db.fetch_payout_account(actor_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                info!("🔄️💸️ {actor_id} has no payout account. No transfer for line {line_index} of order {}", order.id);
                return TransferOutcome::Skipped { line_index, actor_id: actor_id.clone() };
            },
            Err(e) => {
                error!("🔄️💸️ Could not look up the payout account for {actor_id}. {e}");
                return TransferOutcome::Failed { line_index, actor_id: actor_id.clone(), reason: e.to_string() };
            },
        };
        let request = Self::transfer_request(order, item, actor_id, &account.external_account_id, amount);
        let key = Self::idempotency_key(order.id.as_str(), line_index);
        match processor.create_transfer(&request, &key).await {
            Ok(receipt) => {
                info!("🔄️💸️ Transferred {} {} to {actor_id} for order {}", request.amount, request.currency, order.id);
                TransferOutcome::Issued { line_index, receipt }
            },
            Err(e) => {
                error!("🔄️💸️ Transfer {key} to {actor_id} failed. {e}");
                TransferOutcome::Failed { line_index, actor_id: actor_id.clone(), reason: e.to_string() }
            },
        }
    }
}

use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::StripeConfig,
    data_objects::{Balance, NewSku, NewTransfer, SkuUpdate, Transfer},
    helpers::to_form_params,
    StripeApiError,
    StripeError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

/// Per-request options that Stripe reads from headers rather than the body.
#[derive(Debug, Clone, Copy, Default)]
struct RequestOptions<'a> {
    idempotency_key: Option<&'a str>,
    stripe_account: Option<&'a str>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        if let Some(version) = &config.api_version {
            let val = HeaderValue::from_str(version).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
            headers.insert("Stripe-Version", val);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions<'_>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(key) = options.idempotency_key {
            req = req.header("Idempotency-Key", key);
        }
        if let Some(account) = options.stripe_account {
            req = req.header("Stripe-Account", account);
        }
        if let Some(body) = body {
            req = req.form(&to_form_params(body)?);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestRequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("REST query successful. {status}");
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let text = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            let error = StripeError::from_response_body(&text);
            debug!("REST query failed. {status}. {} ({:?})", error.message, error.code);
            Err(StripeApiError::Api { status: status.as_u16(), error })
        }
    }

    /// Confirms a payment intent. The full payment intent object is returned.
    pub async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, StripeApiError> {
        let path = format!("/payment_intents/{payment_intent_id}/confirm");
        debug!("Confirming payment intent {payment_intent_id}");
        let options = RequestOptions { idempotency_key: Some(idempotency_key), ..Default::default() };
        let result = self.rest_query::<Value, ()>(Method::POST, &path, None, options).await?;
        info!("Confirmed payment intent {payment_intent_id}");
        Ok(result)
    }

    pub async fn cancel_payment_intent(
        &self,
        payment_intent_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, StripeApiError> {
        let path = format!("/payment_intents/{payment_intent_id}/cancel");
        debug!("Cancelling payment intent {payment_intent_id}");
        let options = RequestOptions { idempotency_key: Some(idempotency_key), ..Default::default() };
        let result = self.rest_query::<Value, ()>(Method::POST, &path, None, options).await?;
        info!("Cancelled payment intent {payment_intent_id}");
        Ok(result)
    }

    /// Refunds the full captured amount of a payment intent.
    pub async fn create_refund(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, StripeApiError> {
        let body = serde_json::json!({ "payment_intent": payment_intent_id });
        debug!("Refunding payment intent {payment_intent_id}");
        let options = RequestOptions { idempotency_key: Some(idempotency_key), ..Default::default() };
        let result = self.rest_query::<Value, Value>(Method::POST, "/refunds", Some(&body), options).await?;
        info!("Refunded payment intent {payment_intent_id}");
        Ok(result)
    }

    pub async fn create_transfer(&self, transfer: &NewTransfer, idempotency_key: &str) -> Result<Transfer, StripeApiError> {
        debug!(
            "Transferring {} {} to {} (group {})",
            transfer.amount, transfer.currency, transfer.destination, transfer.transfer_group
        );
        let options = RequestOptions { idempotency_key: Some(idempotency_key), ..Default::default() };
        let result = self.rest_query::<Transfer, NewTransfer>(Method::POST, "/transfers", Some(transfer), options).await?;
        info!("Transfer {} created", result.id);
        Ok(result)
    }

    pub async fn create_sku(&self, sku: &NewSku) -> Result<Value, StripeApiError> {
        debug!("Creating SKU {}", sku.id);
        let key = format!("sku-create-{}", sku.id);
        let options = RequestOptions { idempotency_key: Some(&key), ..Default::default() };
        self.rest_query::<Value, NewSku>(Method::POST, "/skus", Some(sku), options).await
    }

    pub async fn update_sku(&self, id: &str, update: &SkuUpdate) -> Result<Value, StripeApiError> {
        debug!("Updating SKU {id}");
        let path = format!("/skus/{id}");
        self.rest_query::<Value, SkuUpdate>(Method::POST, &path, Some(update), RequestOptions::default()).await
    }

    /// Attaches a bank account or debit card to a connected account. `params` is passed through to Stripe as-is.
    pub async fn create_external_account(&self, account_id: &str, params: &Value) -> Result<Value, StripeApiError> {
        let path = format!("/accounts/{account_id}/external_accounts");
        debug!("Creating external account for {account_id}");
        self.rest_query::<Value, Value>(Method::POST, &path, Some(params), RequestOptions::default()).await
    }

    /// Retrieves the balance of a connected account.
    pub async fn retrieve_balance(&self, account_id: &str) -> Result<Balance, StripeApiError> {
        let options = RequestOptions { stripe_account: Some(account_id), ..Default::default() };
        self.rest_query::<Balance, ()>(Method::GET, "/balance", None, options).await
    }
}

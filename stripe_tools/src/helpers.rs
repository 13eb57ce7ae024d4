use serde::Serialize;
use serde_json::Value;

use crate::StripeApiError;

/// Stripe takes `application/x-www-form-urlencoded` bodies with nested objects written in bracket notation, e.g.
/// `metadata[sku_path]=...` or `inventory[quantity]=4`. `serde_urlencoded` cannot express nesting, so the body is
/// serialized to JSON first and flattened here. `null` values are dropped.
pub fn to_form_params<T: Serialize>(body: &T) -> Result<Vec<(String, String)>, StripeApiError> {
    let value = serde_json::to_value(body).map_err(|e| StripeApiError::JsonError(e.to_string()))?;
    let mut params = Vec::new();
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten(k, v, &mut params);
            }
        },
        Value::Null => {},
        other => {
            return Err(StripeApiError::RestRequestError(format!("Form body must be an object, not {other}")));
        },
    }
    Ok(params)
}

fn flatten(key: String, value: Value, params: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {},
        Value::Bool(b) => params.push((key, b.to_string())),
        Value::Number(n) => params.push((key, n.to_string())),
        Value::String(s) => params.push((key, s)),
        Value::Array(items) => {
            for (i, v) in items.into_iter().enumerate() {
                flatten(format!("{key}[{i}]"), v, params);
            }
        },
        Value::Object(map) => {
            for (k, v) in map {
                flatten(format!("{key}[{k}]"), v, params);
            }
        },
    }
}

/// Stripe only accepts lowercase ISO currency codes
pub fn stripe_currency(currency: &str) -> String {
    currency.trim().to_ascii_lowercase()
}

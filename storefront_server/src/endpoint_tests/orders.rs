use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::json;
use storefront_engine::{
    db_types::{Amount, DeliveryStatus, Order, OrderId, PaymentStatus, SalesMethod},
    traits::{OrderLedgerError, OrderQueryFilter},
    OrderHistoryApi,
};

use super::{
    helpers::{buyer_token, get_request, json, seller_token},
    mocks::MockOrderStore,
};
use crate::routes::{MyOrdersRoute, ProviderOrdersRoute};

fn order(id: &str, status: PaymentStatus) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    Order {
        id: OrderId::from(id),
        purchased_by: "buyer1".into(),
        provided_by: "p1".into(),
        items: vec![],
        amount: Amount::from(1500),
        currency: "JPY".into(),
        payment_status: status,
        delivery_status: DeliveryStatus::None,
        sales_method: SalesMethod::Online,
        payment_intent_id: Some(format!("pi_{id}")),
        payment_result: None,
        tags: vec![],
        created_at: ts,
        updated_at: ts,
    }
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store
        .expect_fetch_orders_for_buyer()
        .withf(|buyer| buyer.as_str() == "buyer1")
        .returning(|_| Ok(vec![order("o2", PaymentStatus::Processing), order("o1", PaymentStatus::Succeeded)]));
    store
        .expect_search_provider_orders()
        .withf(|provider, filter| {
            provider.as_str() == "p1" && filter.payment_status == Some(PaymentStatus::Succeeded)
        })
        .returning(|_, _| Ok(vec![order("o1", PaymentStatus::Succeeded)]));
    store
        .expect_search_provider_orders()
        .withf(|_, filter| filter == &OrderQueryFilter::default())
        .returning(|_, _| Err(OrderLedgerError::DatabaseError("disk on fire".into())));
    let api = OrderHistoryApi::new(store);
    cfg.service(MyOrdersRoute::<MockOrderStore>::new())
        .service(ProviderOrdersRoute::<MockOrderStore>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&buyer_token(), "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    let orders = body["result"].as_array().expect("Expected a list of orders");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], "o2");
    assert_eq!(orders[1]["paymentStatus"], "succeeded");
    assert_eq!(orders[1]["purchasedBy"], "buyer1");
}

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/orders", configure).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. No access token was provided."));
}

#[actix_web::test]
async fn fetch_my_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = buyer_token();
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let err = get_request(&token, "/orders", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Access token is invalid. The token signature is invalid.");
}

#[actix_web::test]
async fn provider_orders_with_filter() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(), "/provider/orders?payment_status=succeeded", configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["result"][0]["id"], "o1");
    assert_eq!(body["result"][0]["providedBy"], "p1");
}

#[actix_web::test]
async fn provider_orders_need_a_provider() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&buyer_token(), "/provider/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), json!({ "error": "Auth does not maintain a providerID." }));
}

#[actix_web::test]
async fn provider_orders_backend_failure() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(), "/provider/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("An error occurred on the backend of the server."));
}

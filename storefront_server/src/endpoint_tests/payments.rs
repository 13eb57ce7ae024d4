use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use storefront_engine::{
    db_types::{Amount, LineItem, NewOrder, OrderId, PaymentStatus},
    events::EventProducers,
    processor::{ProcessorError, ProcessorErrorBody},
    test_utils::prepare_env::{new_database, tear_down},
    traits::OrderLedger,
    PaymentFlowApi,
    SqliteDatabase,
};

use super::{
    helpers::{buyer_token, json, post_request, seller_token},
    mocks::MockProcessor,
};
use crate::routes::{CancelOrderRoute, ConfirmOrderRoute, RefundOrderRoute};

async fn setup(status: PaymentStatus) -> SqliteDatabase {
    let db = new_database().await;
    let order = NewOrder::new("o1".into(), "buyer1".into(), "p1".into(), Amount::from(1000), "JPY")
        .with_item(LineItem::new("providers/p1/products/prod1/skus/sku1", 1, Amount::from(1000), "JPY"))
        .with_payment_intent("pi_1")
        .with_payment_status(status);
    db.insert_order(order).await.expect("Error inserting order");
    db
}

fn configure(db: SqliteDatabase, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) + 'static {
    move |cfg: &mut ServiceConfig| {
        let api = PaymentFlowApi::new(db, processor, EventProducers::default());
        cfg.service(ConfirmOrderRoute::<SqliteDatabase, MockProcessor>::new())
            .service(CancelOrderRoute::<SqliteDatabase, MockProcessor>::new())
            .service(RefundOrderRoute::<SqliteDatabase, MockProcessor>::new())
            .app_data(web::Data::new(api));
    }
}

async fn status_of(db: &SqliteDatabase) -> (PaymentStatus, PaymentStatus) {
    let id = OrderId::from("o1");
    let provider_copy = db.fetch_order_for_provider(&id, &"p1".into()).await.unwrap().unwrap();
    let buyer_copy = db.fetch_order_for_buyer(&id, &"buyer1".into()).await.unwrap().unwrap();
    (provider_copy.payment_status, buyer_copy.payment_status)
}

fn confirming_processor() -> MockProcessor {
    let mut processor = MockProcessor::new();
    processor
        .expect_confirm_payment()
        .withf(|pi, key| pi == "pi_1" && key == "o1")
        .times(1)
        .returning(|pi, _| Ok(json!({ "id": pi, "object": "payment_intent", "status": "succeeded" })));
    processor
}

#[actix_web::test]
async fn confirm_order() {
    let db = setup(PaymentStatus::Processing).await;
    let body = json!({ "payment_intent_id": "pi_1" });
    let app = configure(db.clone(), confirming_processor());
    let (status, body) = post_request(&seller_token(), "/orders/o1/confirm", body, app).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["result"]["id"], "o1");
    assert_eq!(body["result"]["paymentStatus"], "succeeded");
    assert_eq!(body["result"]["paymentResult"]["id"], "pi_1");
    assert_eq!(status_of(&db).await, (PaymentStatus::Succeeded, PaymentStatus::Succeeded));
    tear_down(db).await;
}

#[actix_web::test]
async fn confirm_twice() {
    let db = setup(PaymentStatus::Processing).await;
    let body = json!({ "payment_intent_id": "pi_1" });
    post_request(&seller_token(), "/orders/o1/confirm", body.clone(), configure(db.clone(), confirming_processor()))
        .await
        .expect("Request failed");
    // The second attempt must not reach the processor
    let mut idle = MockProcessor::new();
    idle.expect_confirm_payment().never();
    let (status, body) = post_request(&seller_token(), "/orders/o1/confirm", body, configure(db.clone(), idle))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "error": { "message": "Invalid order status.", "target": "o1" } }));
    tear_down(db).await;
}

#[actix_web::test]
async fn confirm_without_payment_intent() {
    let db = setup(PaymentStatus::Processing).await;
    let app = configure(db.clone(), MockProcessor::new());
    let (status, body) =
        post_request(&seller_token(), "/orders/o1/confirm", json!({}), app).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), json!({ "error": "This request does not contain a paymentIntentID." }));
    assert_eq!(status_of(&db).await, (PaymentStatus::Processing, PaymentStatus::Processing));
    tear_down(db).await;
}

#[actix_web::test]
async fn confirm_by_buyer_is_refused() {
    let db = setup(PaymentStatus::Processing).await;
    let body = json!({ "payment_intent_id": "pi_1" });
    let app = configure(db.clone(), MockProcessor::new());
    let (status, _) = post_request(&buyer_token(), "/orders/o1/confirm", body, app).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    tear_down(db).await;
}

#[actix_web::test]
async fn declined_card_fails_the_order() {
    let db = setup(PaymentStatus::Processing).await;
    let mut processor = MockProcessor::new();
    processor.expect_confirm_payment().returning(|_, _| {
        Err(ProcessorError::Rejected(ProcessorErrorBody {
            status: 402,
            kind: "card_error".into(),
            code: Some("card_declined".into()),
            decline_code: Some("insufficient_funds".into()),
            message: "Your card has insufficient funds.".into(),
            param: None,
            raw: json!({ "type": "card_error", "code": "card_declined", "decline_code": "insufficient_funds" }),
        }))
    });
    let body = json!({ "payment_intent_id": "pi_1" });
    let (status, body) = post_request(&seller_token(), "/orders/o1/confirm", body, configure(db.clone(), processor))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        json!({ "error": { "message": "Your card has insufficient funds.", "target": "o1" } })
    );
    assert_eq!(status_of(&db).await, (PaymentStatus::PaymentFailed, PaymentStatus::PaymentFailed));
    tear_down(db).await;
}

#[actix_web::test]
async fn processor_outage_is_a_bad_gateway() {
    let db = setup(PaymentStatus::Processing).await;
    let mut processor = MockProcessor::new();
    processor.expect_confirm_payment().returning(|_, _| Err(ProcessorError::Transport("connection reset".into())));
    let body = json!({ "payment_intent_id": "pi_1" });
    let (status, _) = post_request(&seller_token(), "/orders/o1/confirm", body, configure(db.clone(), processor))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(status_of(&db).await, (PaymentStatus::Processing, PaymentStatus::Processing));
    tear_down(db).await;
}

#[actix_web::test]
async fn buyer_cancels_order() {
    let db = setup(PaymentStatus::Processing).await;
    let mut processor = MockProcessor::new();
    processor
        .expect_cancel_payment()
        .withf(|pi, key| pi == "pi_1" && key == "o1-cancel")
        .times(1)
        .returning(|pi, _| Ok(json!({ "id": pi, "status": "canceled" })));
    let (status, body) = post_request(&buyer_token(), "/orders/o1/cancel", json!({}), configure(db.clone(), processor))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["result"]["paymentStatus"], "canceled");
    assert_eq!(status_of(&db).await, (PaymentStatus::Canceled, PaymentStatus::Canceled));
    tear_down(db).await;
}

#[actix_web::test]
async fn refund_succeeded_order() {
    let db = setup(PaymentStatus::Succeeded).await;
    let mut processor = MockProcessor::new();
    processor
        .expect_refund_payment()
        .withf(|pi, key| pi == "pi_1" && key == "o1-refund")
        .times(1)
        .returning(|_, _| Ok(json!({ "id": "re_1", "object": "refund", "status": "succeeded" })));
    let (status, body) = post_request(&seller_token(), "/orders/o1/refund", json!({}), configure(db.clone(), processor))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["result"]["paymentStatus"], "canceled");
    assert_eq!(status_of(&db).await, (PaymentStatus::Canceled, PaymentStatus::Canceled));
    tear_down(db).await;
}

#[actix_web::test]
async fn refund_processing_order_is_a_conflict() {
    let db = setup(PaymentStatus::Processing).await;
    let mut processor = MockProcessor::new();
    processor.expect_refund_payment().never();
    let (status, body) = post_request(&buyer_token(), "/orders/o1/refund", json!({}), configure(db.clone(), processor))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "error": { "message": "Invalid order status.", "target": "o1" } }));
    tear_down(db).await;
}

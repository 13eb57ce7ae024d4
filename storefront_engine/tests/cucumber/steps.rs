use cucumber::{then, when};
use storefront_engine::{
    db_types::{OrderId, PaymentStatus, ProviderId},
    traits::{CatalogManagement, OrderLedger},
};

use crate::cucumber::{storefront_world::seller, StorefrontWorld};

#[when(expr = "seller '{word}' of provider '{word}' confirms order {word} with {word}")]
async fn confirm_order(world: &mut StorefrontWorld, actor: String, provider: String, order_id: String, pi: String) {
    let ctx = seller(&actor, &provider);
    let result = world.system().payments.confirm(&ctx, &order_id, &pi).await.map(|r| r.order);
    world.record(result);
}

#[when(expr = "seller '{word}' of provider '{word}' cancels order {word}")]
async fn cancel_order(world: &mut StorefrontWorld, actor: String, provider: String, order_id: String) {
    let ctx = seller(&actor, &provider);
    let result = world.system().payments.cancel(&ctx, &order_id).await;
    world.record(result);
}

#[when(expr = "seller '{word}' of provider '{word}' refunds order {word}")]
async fn refund_order(world: &mut StorefrontWorld, actor: String, provider: String, order_id: String) {
    let ctx = seller(&actor, &provider);
    let result = world.system().payments.refund(&ctx, &order_id).await;
    world.record(result);
}

#[when(expr = "provider '{word}' publishes {string}")]
async fn publish(world: &mut StorefrontWorld, provider: String, path: String) {
    let ctx = seller(&provider, &provider);
    let result = world.system().publish.publish(&ctx, &path).await;
    world.record(result);
}

#[then(expr = "the result is order {word} with payment status {word}")]
async fn result_is_order(world: &mut StorefrontWorld, order_id: String, status: String) {
    let result = &world.response()["result"];
    assert_eq!(result["id"], order_id.as_str(), "Unexpected response {}", world.response());
    assert_eq!(result["paymentStatus"], status.as_str());
}

#[then(expr = "the error has target {word} and message {string}")]
async fn error_with_target(world: &mut StorefrontWorld, target: String, message: String) {
    let error = &world.response()["error"];
    assert_eq!(error["target"], target.as_str(), "Unexpected response {}", world.response());
    assert_eq!(error["message"], message.as_str());
}

#[then(expr = "the error message is {string}")]
async fn error_message(world: &mut StorefrontWorld, message: String) {
    let error = &world.response()["error"];
    assert_eq!(error["message"], message.as_str(), "Unexpected response {}", world.response());
}

#[then(expr = "both copies of order {word} have payment status {word}")]
async fn both_copies(world: &mut StorefrontWorld, order_id: String, status: String) {
    let status = status.parse::<PaymentStatus>().expect("Not a payment status");
    let db = &world.system().db;
    let id = OrderId::from(order_id);
    let provider_copy = db.fetch_order_for_provider(&id, &"p1".into()).await.unwrap().expect("No provider copy");
    let buyer_copy =
        db.fetch_order_for_buyer(&id, &provider_copy.purchased_by).await.unwrap().expect("No buyer copy");
    assert_eq!(provider_copy.payment_status, status);
    assert_eq!(buyer_copy.payment_status, status);
    assert_eq!(provider_copy.payment_result, buyer_copy.payment_result);
    assert_eq!(provider_copy.updated_at, buyer_copy.updated_at);
}

#[then(expr = "the payment result of order {word} is {word}")]
async fn payment_result(world: &mut StorefrontWorld, order_id: String, pi: String) {
    let db = &world.system().db;
    let order = db.fetch_order_for_provider(&order_id.into(), &"p1".into()).await.unwrap().expect("No order");
    let result = order.payment_result.expect("No payment result");
    assert_eq!(result["id"], pi.as_str());
}

#[then(expr = "the processor was asked to {word} {int} time(s)")]
async fn processor_calls(world: &mut StorefrontWorld, op: String, count: usize) {
    assert_eq!(world.system().processor.count(&op), count);
}

#[then(expr = "the result lists {int} published paths")]
async fn published_paths(world: &mut StorefrontWorld, count: usize) {
    let paths = world.response()["result"].as_array().expect("Expected a list of paths");
    assert_eq!(paths.len(), count);
}

#[then(expr = "provider '{word}' has {int} live SKUs for {word}")]
async fn live_skus(world: &mut StorefrontWorld, provider: String, count: usize, product_id: String) {
    let skus = world.system().db.fetch_skus(&provider.into(), &product_id).await.unwrap();
    assert_eq!(skus.len(), count);
}

#[then(expr = "provider '{word}' has no drafts for {word}")]
async fn no_drafts(world: &mut StorefrontWorld, provider: String, product_id: String) {
    let db = &world.system().db;
    let provider_id = ProviderId::from(provider);
    assert!(db.fetch_product_draft(&provider_id, &product_id).await.unwrap().is_none());
    assert!(db.fetch_sku_drafts(&provider_id, &product_id).await.unwrap().is_empty());
}

use cucumber::given;
use storefront_engine::{
    db_types::{Amount, LineItem, NewOrder, ProductInput, ProviderId, SkuInput},
    traits::OrderLedger,
};

use crate::cucumber::{
    storefront_world::{seller, StorefrontSystem},
    StorefrontWorld,
};

#[given("a fresh install")]
async fn fresh_database(world: &mut StorefrontWorld) {
    let system = StorefrontSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "an order {word} from buyer '{word}' with provider '{word}' for {int} {word} paid with {word}")]
async fn an_order(
    world: &mut StorefrontWorld,
    order_id: String,
    buyer: String,
    provider: String,
    amount: i64,
    currency: String,
    payment_intent: String,
) {
    let sku = format!("providers/{provider}/products/prod1/skus/sku1");
    let order = NewOrder::new(order_id.into(), buyer.into(), provider.into(), Amount::from(amount), &currency)
        .with_item(LineItem::new(&sku, 1, Amount::from(amount), &currency))
        .with_payment_intent(&payment_intent);
    world.system().db.insert_order(order).await.expect("Error inserting order");
}

#[given(expr = "provider '{word}' has a product draft {word} with {int} SKUs")]
async fn a_product_draft(world: &mut StorefrontWorld, provider: String, product_id: String, sku_count: i64) {
    let owner = seller(&provider, &provider);
    let provider_id = ProviderId::from(provider.as_str());
    let catalog = &world.system().catalog;
    let input = ProductInput { name: format!("Product {product_id}"), ..Default::default() };
    catalog.save_product_draft(&owner, &provider_id, &product_id, input).await.expect("Error saving draft");
    for i in 0..sku_count {
        let sku = SkuInput { inventory: 5, price: Amount::from(100 + i), currency: "JPY".into(), is_available: true };
        catalog
            .save_sku_draft(&owner, &provider_id, &product_id, &format!("sku{i}"), sku)
            .await
            .expect("Error saving SKU draft");
    }
}

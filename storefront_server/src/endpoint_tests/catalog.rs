use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use storefront_engine::{
    api_errors::NO_SKU_MESSAGE,
    db_types::ProviderId,
    events::EventProducers,
    test_utils::prepare_env::{new_database, tear_down},
    traits::CatalogManagement,
    CatalogApi,
    PublishApi,
    SqliteDatabase,
};

use super::helpers::{issue_token, json, post_request, put_request};
use crate::{
    auth::JwtClaims,
    routes::{PublishProductRoute, SaveProductDraftRoute, SaveSkuDraftRoute, UpsertSkuRoute},
};

const DRAFT_PATH: &str = "providers/p1/productDrafts/prod1";

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) + 'static {
    move |cfg: &mut ServiceConfig| {
        let catalog_api = CatalogApi::new(db.clone(), EventProducers::default());
        let publish_api = PublishApi::new(db, EventProducers::default());
        cfg.service(SaveProductDraftRoute::<SqliteDatabase>::new())
            .service(SaveSkuDraftRoute::<SqliteDatabase>::new())
            .service(UpsertSkuRoute::<SqliteDatabase>::new())
            .service(PublishProductRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(publish_api));
    }
}

fn owner_token() -> String {
    issue_token(JwtClaims::new("p1".into(), Some("p1".into()), vec![]))
}

async fn save_draft(db: &SqliteDatabase, skus: &[&str]) {
    let product = json!({ "name": "Matcha", "caption": "Uji", "description": "Stone ground" });
    let (status, body) = put_request(&owner_token(), "/provider/product_drafts/prod1", product, configure(db.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK, "{body}");
    for sku in skus {
        let path = format!("/provider/product_drafts/prod1/skus/{sku}");
        let input = json!({ "inventory": 5, "price": 1200, "currency": "JPY", "isAvailable": true });
        let (status, body) =
            put_request(&owner_token(), &path, input, configure(db.clone())).await.expect("Request failed");
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(json(&body)["result"]["id"], *sku);
    }
}

#[actix_web::test]
async fn publish_product_draft() {
    let db = new_database().await;
    save_draft(&db, &["sku_a", "sku_b"]).await;
    let body = json!({ "product_draft_path": DRAFT_PATH });
    let (status, body) =
        post_request(&owner_token(), "/products/publish", body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        json!({ "result": [
            "providers/p1/products/prod1",
            "providers/p1/products/prod1/skus/sku_a",
            "providers/p1/products/prod1/skus/sku_b"
        ] })
    );
    let p1 = ProviderId::from("p1");
    assert!(db.fetch_product(&p1, "prod1").await.unwrap().is_some());
    assert!(db.fetch_product_draft(&p1, "prod1").await.unwrap().is_none());
    tear_down(db).await;
}

#[actix_web::test]
async fn publish_draft_without_skus() {
    let db = new_database().await;
    save_draft(&db, &[]).await;
    let body = json!({ "product_draft_path": DRAFT_PATH });
    let (status, body) =
        post_request(&owner_token(), "/products/publish", body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "error": { "message": NO_SKU_MESSAGE } }));
    tear_down(db).await;
}

#[actix_web::test]
async fn publish_with_a_bad_path() {
    let db = new_database().await;
    let body = json!({ "product_draft_path": "providers/p1/products/prod1" });
    let (status, body) =
        post_request(&owner_token(), "/products/publish", body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), json!({ "error": "Invalid path." }));
    tear_down(db).await;
}

#[actix_web::test]
async fn operators_without_grants_cannot_edit() {
    let db = new_database().await;
    let token = issue_token(JwtClaims::new("op1".into(), Some("p1".into()), vec![]));
    let product = json!({ "name": "Hojicha" });
    let (status, body) = put_request(&token, "/provider/product_drafts/prod2", product, configure(db.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Insufficient Permissions."));
    tear_down(db).await;
}

#[actix_web::test]
async fn upsert_live_sku() {
    let db = new_database().await;
    save_draft(&db, &["sku_a"]).await;
    let body = json!({ "product_draft_path": DRAFT_PATH });
    post_request(&owner_token(), "/products/publish", body, configure(db.clone())).await.expect("Request failed");
    let input = json!({ "inventory": 0, "price": 1500, "currency": "JPY", "isAvailable": false });
    let (status, body) =
        put_request(&owner_token(), "/provider/products/prod1/skus/sku_a", input, configure(db.clone()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["result"]["price"], 1500);
    assert_eq!(body["result"]["isAvailable"], false);
    let skus = db.fetch_skus(&"p1".into(), "prod1").await.unwrap();
    assert_eq!(skus[0].inventory, 0);
    tear_down(db).await;
}

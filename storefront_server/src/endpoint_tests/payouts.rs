use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::json;
use storefront_engine::{
    db_types::{ActorId, PayoutAccount, Role},
    processor::{ProcessorError, ProcessorErrorBody},
    PayoutAccountApi,
};

use super::{
    helpers::{get_request, issue_token, json, post_request},
    mocks::{MockAccounts, MockProcessor},
};
use crate::{
    auth::JwtClaims,
    routes::{LinkExternalAccountRoute, PayoutBalanceRoute, RegisterPayoutAccountRoute},
};

type Api = PayoutAccountApi<MockAccounts, MockProcessor>;

fn account(actor: &ActorId, external: &str) -> PayoutAccount {
    let now = Utc::now();
    PayoutAccount {
        actor_id: actor.clone(),
        external_account_id: external.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn accounts() -> MockAccounts {
    let mut accounts = MockAccounts::new();
    accounts.expect_fetch_payout_account().returning(|actor| match actor.as_str() {
        "mediator1" => Ok(Some(account(actor, "acct_mediator1"))),
        _ => Ok(None),
    });
    accounts
}

fn rejected_account() -> ProcessorError {
    let raw = json!({
        "type": "invalid_request_error",
        "code": "account_number_invalid",
        "message": "The account number is invalid.",
        "param": "external_account"
    });
    ProcessorError::Rejected(ProcessorErrorBody {
        status: 400,
        kind: "invalid_request_error".into(),
        code: Some("account_number_invalid".into()),
        decline_code: None,
        message: "The account number is invalid.".into(),
        param: Some("external_account".into()),
        raw,
    })
}

fn register(cfg: &mut ServiceConfig, api: Api) {
    cfg.service(LinkExternalAccountRoute::<MockAccounts, MockProcessor>::new())
        .service(PayoutBalanceRoute::<MockAccounts, MockProcessor>::new())
        .service(RegisterPayoutAccountRoute::<MockAccounts, MockProcessor>::new())
        .app_data(web::Data::new(api));
}

fn configure(cfg: &mut ServiceConfig) {
    let mut processor = MockProcessor::new();
    processor
        .expect_create_external_account()
        .withf(|account, details| account == "acct_mediator1" && details["external_account"] == "btok_good")
        .returning(|_, _| Ok(json!({ "id": "ba_1", "object": "bank_account", "last4": "6789" })));
    processor.expect_create_external_account().returning(|_, _| Err(rejected_account()));
    processor
        .expect_retrieve_balance()
        .withf(|account| account == "acct_mediator1")
        .returning(|_| Ok(json!({ "object": "balance", "available": [{ "amount": 400, "currency": "jpy" }] })));
    register(cfg, PayoutAccountApi::new(accounts(), processor));
}

fn mediator_token() -> String {
    issue_token(JwtClaims::new("mediator1".into(), None, vec![Role::User]))
}

#[actix_web::test]
async fn link_external_account() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "external_account": "btok_good", "default_for_currency": true });
    let (status, body) = post_request(&mediator_token(), "/payout_account/external_account", body, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "result": { "id": "ba_1", "object": "bank_account", "last4": "6789" } }));
}

#[actix_web::test]
async fn link_external_account_rejected_by_processor() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "external_account": "btok_bad" });
    let (status, body) = post_request(&mediator_token(), "/payout_account/external_account", body, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["error"]["code"], "account_number_invalid");
    assert_eq!(body["error"]["param"], "external_account");
}

#[actix_web::test]
async fn link_external_account_without_details() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(&mediator_token(), "/payout_account/external_account", json!({ "currency": "jpy" }), configure)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), json!({ "error": "This request does not include an external_account." }));
}

#[actix_web::test]
async fn link_external_account_without_payout_account() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(JwtClaims::new("stranger".into(), None, vec![Role::User]));
    let (status, body) =
        post_request(&token, "/payout_account/external_account", json!({ "external_account": "btok_good" }), configure)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), json!({ "error": "Auth does not maintain a accountID." }));
}

#[actix_web::test]
async fn fetch_balance() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&mediator_token(), "/payout_account/balance", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["result"]["available"][0]["amount"], 400);
}

#[actix_web::test]
async fn register_requires_admin() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "actor_id": "mediator2", "external_account_id": "acct_2" });
    let err = post_request(&mediator_token(), "/payout_account", body, configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This route requires [Admin].");
}

#[actix_web::test]
async fn register_as_admin() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(JwtClaims::new("admin1".into(), None, vec![Role::Admin]));
    let body = json!({ "actor_id": "mediator2", "external_account_id": "acct_2" });
    let (status, body) = post_request(&token, "/payout_account", body, |cfg| {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_upsert_payout_account()
            .withf(|actor, external| actor.as_str() == "mediator2" && external == "acct_2")
            .times(1)
            .returning(|actor, external| Ok(account(actor, external)));
        register(cfg, PayoutAccountApi::new(accounts, MockProcessor::new()));
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["result"]["actorId"], "mediator2");
    assert_eq!(body["result"]["externalAccountId"], "acct_2");
}

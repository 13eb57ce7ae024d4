use actix_web::{http::StatusCode, web::ServiceConfig};
use chrono::Duration;
use serde_json::json;
use storefront_engine::db_types::Role;

use super::helpers::{get_auth_config, get_request, issue_token, json};
use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
    routes::check_token,
};

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(check_token);
}

#[actix_web::test]
async fn check_token_echoes_claims() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(JwtClaims::new("op1".into(), Some("p1".into()), vec![Role::User, Role::Admin]));
    let (status, body) = get_request(&token, "/check_token", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["result"]["actor_id"], "op1");
    assert_eq!(body["result"]["provider_id"], "p1");
    assert_eq!(body["result"]["roles"], json!(["user", "admin"]));
}

#[actix_web::test]
async fn no_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/check_token", configure).await.expect_err("Expected error");
    assert_eq!(
        err,
        "Authentication Error. No access token was provided. Send one in the Authorization header as a bearer token."
    );
}

#[actix_web::test]
async fn expired_token() {
    let _ = env_logger::try_init().ok();
    let token = TokenIssuer::new(&get_auth_config())
        .issue_token(JwtClaims::new("op1".into(), None, vec![]), Some(Duration::hours(-3)))
        .unwrap();
    let err = get_request(&token, "/check_token", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Access token is invalid. The token has expired.");
}

#[actix_web::test]
async fn token_from_another_issuer() {
    let _ = env_logger::try_init().ok();
    let other = AuthConfig::new("a-different-secret-that-nobody-here-knows");
    let token = TokenIssuer::new(&other).issue_token(JwtClaims::new("op1".into(), None, vec![]), None).unwrap();
    let err = get_request(&token, "/check_token", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Access token is invalid. The token signature is invalid.");
}

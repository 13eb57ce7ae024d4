use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;
use serde_json::Value;

use crate::{
    auth::{JwtClaims, TokenIssuer, TokenVerifier},
    config::AuthConfig,
    middleware::JwtMiddlewareFactory,
};

// Signs test tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-test-secret-do-not-use-in-production")
}

pub fn issue_token(claims: JwtClaims) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(claims, None).expect("Failed to sign token")
}

pub fn seller_token() -> String {
    issue_token(JwtClaims::new("seller1".into(), Some("p1".into()), vec![]))
}

pub fn buyer_token() -> String {
    issue_token(JwtClaims::new("buyer1".into(), None, vec![]))
}

pub async fn get_request(
    token: &str,
    path: &str,
    configure: impl FnOnce(&mut ServiceConfig) + 'static,
) -> Result<(StatusCode, String), String> {
    send(TestRequest::get().uri(path), token, configure).await
}

pub async fn post_request(
    token: &str,
    path: &str,
    body: Value,
    configure: impl FnOnce(&mut ServiceConfig) + 'static,
) -> Result<(StatusCode, String), String> {
    send(TestRequest::post().uri(path).set_json(body), token, configure).await
}

pub async fn put_request(
    token: &str,
    path: &str,
    body: Value,
    configure: impl FnOnce(&mut ServiceConfig) + 'static,
) -> Result<(StatusCode, String), String> {
    send(TestRequest::put().uri(path).set_json(body), token, configure).await
}

async fn send(
    mut req: TestRequest,
    token: &str,
    configure: impl FnOnce(&mut ServiceConfig) + 'static,
) -> Result<(StatusCode, String), String> {
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    let req = req.to_request();
    let verifier = TokenVerifier::new(&get_auth_config());
    let app = App::new().wrap(JwtMiddlewareFactory::new(verifier, false, false)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("Response is not JSON")
}

//! Access tokens.
//!
//! Callers authenticate with an HS256-signed JWT in the `Authorization: Bearer <token>` header. The token's claims are
//! the caller's authorization context: who they are, which provider (if any) they work for, and their roles.
//! [`crate::middleware::JwtMiddlewareFactory`] verifies the token and stores the claims in the request extensions,
//! where handlers pick them up by taking a [`JwtClaims`] argument.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
#[cfg(test)]
use chrono::{Duration, Utc};
#[cfg(test)]
use jsonwebtoken::{encode, EncodingKey, Header};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use storefront_engine::{
    db_types::{ActorId, ProviderId, Role},
    AuthContext,
};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The actor id
    pub sub: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Expiry, in seconds since the epoch
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: ActorId, provider_id: Option<ProviderId>, roles: Vec<Role>) -> Self {
        Self { sub, provider_id, roles, exp: 0 }
    }
}

impl From<JwtClaims> for AuthContext {
    fn from(claims: JwtClaims) -> Self {
        let ctx = AuthContext::new(claims.sub).with_roles(claims.roles);
        match claims.provider_id {
            Some(provider_id) => ctx.with_provider(provider_id),
            None => ctx,
        }
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
            warn!("🔐️ No JWT claims found in request extensions. Is the route outside the /api scope?");
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

/// Signs access tokens. Tokens are issued by the identity provider in production, so this only backs the tests.
#[cfg(test)]
pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

#[cfg(test)]
impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, lifetime: Duration::hours(config.token_lifetime_hours) }
    }

    /// Issue a new access token for the given claims, valid for `lifetime` or the configured token lifetime.
    ///
    /// This method DOES NOT check that the claims are legitimate. Whoever calls it vouches for the caller's identity.
    pub fn issue_token(&self, mut claims: JwtClaims, lifetime: Option<Duration>) -> Result<String, AuthError> {
        claims.exp = (Utc::now() + lifetime.unwrap_or(self.lifetime)).timestamp();
        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }
}

/// Checks access token signatures and expiry.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, validation: Validation::new(Algorithm::HS256) }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ValidationError("The token has expired.".into()),
            ErrorKind::InvalidSignature => AuthError::ValidationError("The token signature is invalid.".into()),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        Ok(data.claims)
    }

    /// Extracts and verifies the bearer token from an `Authorization` header value.
    pub fn verify_header(&self, header: Option<&str>) -> Result<JwtClaims, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected 'Bearer <token>'.".into()))?;
        self.verify(token)
    }
}

//! Bearer token middleware.
//!
//! Wrap a scope with [`JwtMiddlewareFactory`] and every request into it must carry a valid access token in the
//! `Authorization` header. The verified [`JwtClaims`] are stored in the request extensions for the ACL middleware and
//! route handlers. Requests without a valid token are rejected with a 401 before reaching any handler.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{auth::TokenVerifier, errors::ServerError, helpers::get_remote_ip};

pub struct JwtMiddlewareFactory {
    verifier: TokenVerifier,
    use_x_forwarded_for: bool,
    use_forwarded: bool,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenVerifier, use_x_forwarded_for: bool, use_forwarded: bool) -> Self {
        JwtMiddlewareFactory { verifier, use_x_forwarded_for, use_forwarded }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService {
            verifier: self.verifier.clone(),
            use_x_forwarded_for: self.use_x_forwarded_for,
            use_forwarded: self.use_forwarded,
            service: Rc::new(service),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: TokenVerifier,
    use_x_forwarded_for: bool,
    use_forwarded: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let verified = self.verifier.verify_header(header);
        let (use_x_forwarded_for, use_forwarded) = (self.use_x_forwarded_for, self.use_forwarded);
        Box::pin(async move {
            match verified {
                Ok(claims) => {
                    trace!("🔐️ Access token for {} ✅️", claims.sub);
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                },
                Err(e) => {
                    let ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded)
                        .map(|ip| ip.to_string())
                        .unwrap_or_else(|| "unknown".into());
                    info!("🔐️ Rejected request to {} from {ip}. {e}", req.path());
                    Err(ServerError::AuthenticationError(e).into())
                },
            }
        })
    }
}

/// JWT authentication middleware
///
/// Validates bearer access tokens from the Authorization header and injects
/// the decoded claims into request extensions for route handlers. Refresh
/// tokens are not accepted here; they are only good for the refresh
/// endpoint.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{TokenService, TokenType};

/// Guard for routes that require a valid access token.
pub struct JwtMiddleware {
    tokens: web::Data<TokenService>,
}

impl JwtMiddleware {
    pub fn new(tokens: web::Data<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    tokens: web::Data<TokenService>,
}

fn unauthorized(message: &str, code: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header(("WWW-Authenticate", "Bearer"))
        .json(serde_json::json!({
            "error": message,
            "code": code
        }))
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.to_string());

        let token = match bearer {
            Some(token) => token,
            None => {
                tracing::warn!("Missing or invalid Authorization header");
                let response = unauthorized("Missing or invalid authorization header", "UNAUTHORIZED");
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Unauthorized", response).into())
                });
            }
        };

        match self.tokens.decode_token(&token) {
            Ok(claims) if claims.typ == TokenType::Access => {
                tracing::debug!(user_name = %claims.sub, "Access token validated");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Ok(claims) => {
                tracing::warn!(
                    user_name = %claims.sub,
                    "Refresh token presented on a protected route"
                );
                let response = unauthorized("Invalid or expired token", "TOKEN_INVALID");
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Invalid token", response).into())
                })
            }
            Err(e) => {
                tracing::warn!("Access token validation failed: {}", e);
                let response = unauthorized("Invalid or expired token", "TOKEN_INVALID");
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Invalid token", response).into())
                })
            }
        }
    }
}

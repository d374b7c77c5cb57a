/// Authentication routes
///
/// Login with a form-encoded username/password, refresh with the refresh
/// token as a bearer credential in the Authorization header. Both return the
/// same three-field token pair response. Every failure is a plain 401 with
/// a challenge header; the client learns nothing about why.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{verify_password, TokenService};
use crate::error::{AppError, AuthError};
use crate::store;

/// Login form body (OAuth2 password-grant shape)
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Token pair response
#[derive(Serialize)]
pub struct TokenPairResponse {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPairResponse {
    fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            token_type: "bearer".to_string(),
            access_token,
            refresh_token,
        }
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .ok_or(AppError::Auth(AuthError::MissingToken))
}

/// POST /auth/login
///
/// Submit username and password as a form. Returns an access token and a
/// single-use refresh token; present the access token as a bearer
/// credential on every authenticated request and exchange the refresh token
/// at /auth/refresh when the access token expires.
///
/// # Errors
/// - 401: unknown user or wrong password (indistinguishable by design)
pub async fn login(
    form: web::Form<LoginForm>,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let user = store::find_user_by_name(pool.get_ref(), &form.username)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&form.password, &user.password_hash) {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let access_token = tokens.issue_access_token(&user.user_name)?;
    let refresh_token = tokens.issue_refresh_token(&user.user_name)?;

    tracing::info!(user_name = %user.user_name, "User logged in");

    Ok(HttpResponse::Ok().json(TokenPairResponse::bearer(access_token, refresh_token)))
}

/// POST /auth/refresh
///
/// Exchange a refresh token (bearer credential in the Authorization header)
/// for a new access/refresh pair. A refresh token is valid exactly once: if
/// a valid-looking token comes back 401, either the server restarted or
/// someone else already spent it.
///
/// # Errors
/// - 401: invalid, expired, replayed, or wrong-type token; or the subject
///   no longer exists
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req)?;

    let (access_token, refresh_token) = tokens.refresh(&token, pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TokenPairResponse::bearer(access_token, refresh_token)))
}

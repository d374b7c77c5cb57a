/// Token issuance, validation, and one-time refresh exchange
///
/// Access tokens are short-lived (configured TTL); refresh tokens live for a
/// fixed seven days and may be exchanged for a new pair exactly once. Both
/// are HMAC-signed JWTs keyed by a process-wide secret: when no secret is
/// configured one is generated at startup, so a restart invalidates every
/// outstanding token.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::str::FromStr;

use crate::auth::claims::{Claims, TokenType};
use crate::auth::revocation::RevocationList;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};
use crate::store::CredentialStore;

/// Refresh token lifetime, fixed at seven days.
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl_seconds: i64,
    revoked: RevocationList,
}

impl TokenService {
    /// Build the service from configuration.
    ///
    /// # Errors
    /// Fails on an unknown algorithm name or a non-HMAC algorithm; the
    /// signing key is a shared secret, so only HS256/HS384/HS512 are usable.
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, AppError> {
        let algorithm = Algorithm::from_str(&settings.algorithm).map_err(|_| {
            AppError::Config(ConfigError::InvalidValue(format!(
                "unknown JWT algorithm {:?}",
                settings.algorithm
            )))
        })?;

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AppError::Config(ConfigError::InvalidValue(format!(
                "JWT algorithm {:?} requires a key pair; only HMAC algorithms are supported",
                settings.algorithm
            ))));
        }

        let secret = match &settings.secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "No JWT secret configured; generated one for this process. \
                     Outstanding tokens will not survive a restart."
                );
                generate_secret()
            }
        };

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            access_ttl_seconds: settings.access_token_expiry,
            revoked: RevocationList::new(),
        })
    }

    /// Issue a short-lived access token for `user_name`.
    pub fn issue_access_token(&self, user_name: &str) -> Result<String, AppError> {
        self.sign(Claims::new(user_name, TokenType::Access, self.access_ttl_seconds))
    }

    /// Issue a seven-day, single-use refresh token for `user_name`.
    pub fn issue_refresh_token(&self, user_name: &str) -> Result<String, AppError> {
        self.sign(Claims::new(
            user_name,
            TokenType::Refresh,
            REFRESH_TOKEN_TTL_SECONDS,
        ))
    }

    fn sign(&self, claims: Claims) -> Result<String, AppError> {
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify signature, algorithm, and expiry, and return the claims.
    ///
    /// # Errors
    /// Any verification failure (bad signature, algorithm mismatch, expired
    /// token, malformed input) surfaces as an authentication error carrying
    /// the verifier's own message for the logs.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Auth(AuthError::TokenInvalid(e.to_string())))
    }

    /// Exchange a refresh token for a fresh access/refresh pair.
    ///
    /// The token is marked spent before the new pair is issued, so a second
    /// presentation of the same token value fails even if the exchange
    /// itself fails later (e.g. the subject was deleted).
    pub async fn refresh(
        &self,
        token: &str,
        store: &dyn CredentialStore,
    ) -> Result<(String, String), AppError> {
        let claims = self.decode_token(token)?;

        if claims.typ != TokenType::Refresh {
            return Err(AppError::Auth(AuthError::WrongTokenType));
        }

        if !self.revoked.check_and_insert(token) {
            tracing::warn!(
                user_name = %claims.sub,
                "Replayed refresh token; possible theft or a client retrying after a lost response"
            );
            return Err(AppError::Auth(AuthError::TokenReplayed));
        }

        let user = store
            .find_user_by_name(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Auth(AuthError::UnknownSubject(claims.sub.clone())))?;

        let access_token = self.issue_access_token(&user.user_name)?;
        let refresh_token = self.issue_refresh_token(&user.user_name)?;

        Ok((access_token, refresh_token))
    }
}

/// Random 64-character alphanumeric secret for processes without a
/// configured one.
fn generate_secret() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// JWT claims structure
///
/// Payload of both access and refresh tokens: the subject is the user name,
/// `typ` distinguishes the two token kinds, `iat`/`exp` are Unix timestamps.

use serde::{Deserialize, Serialize};

/// Token kind carried in the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user name)
    pub sub: String,
    /// Token kind
    pub typ: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_name` expiring `ttl_seconds` from now.
    pub fn new(user_name: &str, typ: TokenType, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_name.to_string(),
            typ,
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}

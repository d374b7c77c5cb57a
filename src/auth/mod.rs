/// Authentication module
///
/// JWT issuance and validation, single-use refresh exchange, and bcrypt
/// password verification.

mod claims;
mod password;
mod revocation;
mod token_service;

pub use claims::Claims;
pub use claims::TokenType;
pub use password::hash_password;
pub use password::verify_password;
pub use revocation::RevocationList;
pub use token_service::TokenService;
pub use token_service::REFRESH_TOKEN_TTL_SECONDS;

/// Relational store access
///
/// All SQL lives in this module. The authentication core does not issue
/// queries itself; it depends on the `CredentialStore` contract, which the
/// Postgres pool implements. Rows are mapped into typed structs at this
/// boundary, so a missing or mistyped column fails the query instead of a
/// later field access.

mod downtime;
mod users;

pub use downtime::create_downtime;
pub use downtime::delete_downtime;
pub use downtime::list_downtimes;
pub use downtime::DowntimeRecord;
pub use users::create_user;
pub use users::delete_user;
pub use users::find_user_by_name;
pub use users::list_role_names;
pub use users::list_roles;
pub use users::list_user_names;
pub use users::resolve_role_id;
pub use users::update_user;
pub use users::Role;
pub use users::User;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;

/// Credential lookups needed by the authentication core.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Case-insensitive lookup of a user record by name.
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError>;

    /// Names of all known roles.
    async fn list_role_names(&self) -> Result<Vec<String>, AppError>;

    /// Resolve a role name to its primary key.
    async fn resolve_role_id(&self, role_name: &str) -> Result<Option<i32>, AppError>;
}

#[async_trait]
impl CredentialStore for PgPool {
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        users::find_user_by_name(self, name).await
    }

    async fn list_role_names(&self) -> Result<Vec<String>, AppError> {
        users::list_role_names(self).await
    }

    async fn resolve_role_id(&self, role_name: &str) -> Result<Option<i32>, AppError> {
        users::resolve_role_id(self, role_name).await
    }
}

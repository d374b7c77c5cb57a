/// User and role queries
///
/// User names are normalized to lowercase on write and compared
/// case-insensitively on read.

use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, DatabaseError};

/// A user record joined with its role.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    pub user_name: String,
    pub role_name: String,
    pub role_description: Option<String>,
    pub password_hash: String,
}

/// Immutable role reference record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Role {
    pub role_id: i32,
    pub role_name: String,
    pub role_description: String,
}

/// Look up a user by name, case-insensitively.
pub async fn find_user_by_name(pool: &PgPool, name: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, user_name, role_name, role_description, password_hash
        FROM users
        LEFT JOIN roles ON users.user_role_id = roles.role_id
        WHERE user_name = LOWER($1)
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Names of all users.
pub async fn list_user_names(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let names = sqlx::query_scalar::<_, String>("SELECT user_name FROM users ORDER BY user_name")
        .fetch_all(pool)
        .await?;

    Ok(names)
}

/// All role records.
pub async fn list_roles(pool: &PgPool) -> Result<Vec<Role>, AppError> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT role_id, role_name, role_description FROM roles ORDER BY role_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

/// Names of all roles.
pub async fn list_role_names(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let names = sqlx::query_scalar::<_, String>("SELECT role_name FROM roles ORDER BY role_id")
        .fetch_all(pool)
        .await?;

    Ok(names)
}

/// Resolve a role name to its primary key.
pub async fn resolve_role_id(pool: &PgPool, role_name: &str) -> Result<Option<i32>, AppError> {
    let role_id =
        sqlx::query_scalar::<_, i32>("SELECT role_id FROM roles WHERE role_name = $1")
            .bind(role_name)
            .fetch_optional(pool)
            .await?;

    Ok(role_id)
}

/// Insert a new user.
///
/// # Errors
/// A duplicate user name surfaces as a unique constraint violation (409).
pub async fn create_user(
    pool: &PgPool,
    user_name: &str,
    role_id: i32,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (user_name, user_role_id, password_hash)
        VALUES (LOWER($1), $2, $3)
        "#,
    )
    .bind(user_name)
    .bind(role_id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an existing user's role and password hash.
///
/// # Errors
/// Fails with `NotFound` if no user with that name exists.
pub async fn update_user(
    pool: &PgPool,
    user_name: &str,
    role_id: i32,
    password_hash: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET user_role_id = $2, password_hash = $3
        WHERE user_name = LOWER($1)
        "#,
    )
    .bind(user_name)
    .bind(role_id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(format!(
            "user {}",
            user_name
        ))));
    }

    Ok(())
}

/// Delete a user by name.
///
/// # Errors
/// Fails with `NotFound` if no user with that name exists.
pub async fn delete_user(pool: &PgPool, user_name: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE user_name = LOWER($1)")
        .bind(user_name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(format!(
            "user {}",
            user_name
        ))));
    }

    Ok(())
}

/// User and role administration routes
///
/// Thin CRUD over the store; passwords are hashed server-side before they
/// touch the database. All of these sit behind the access-token guard.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::hash_password;
use crate::error::{AppError, DatabaseError};
use crate::store;
use crate::validators::is_valid_user_name;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub user_name: String,
    pub role_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub role_name: String,
    pub password: String,
}

/// GET /users — list all user names.
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let names = store::list_user_names(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(names))
}

/// GET /roles — list the role reference set.
pub async fn list_roles(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let roles = store::list_roles(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(roles))
}

/// POST /users — create a user.
///
/// # Errors
/// - 400: invalid user name or weak password
/// - 404: unknown role name
/// - 409: user name already taken
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_name = is_valid_user_name(&form.user_name)?;
    let role_id = store::resolve_role_id(pool.get_ref(), &form.role_name)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(format!("role {}", form.role_name)))
        })?;
    let password_hash = hash_password(&form.password)?;

    store::create_user(pool.get_ref(), &user_name, role_id, &password_hash).await?;

    tracing::info!(user_name = %user_name, role = %form.role_name, "User created");

    Ok(HttpResponse::Created().finish())
}

/// PUT /users/{user_name} — update a user's role and password.
///
/// # Errors
/// - 404: unknown user or role name
pub async fn update_user(
    path: web::Path<String>,
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_name = path.into_inner();
    let role_id = store::resolve_role_id(pool.get_ref(), &form.role_name)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(format!("role {}", form.role_name)))
        })?;
    let password_hash = hash_password(&form.password)?;

    store::update_user(pool.get_ref(), &user_name, role_id, &password_hash).await?;

    tracing::info!(user_name = %user_name, "User updated");

    Ok(HttpResponse::Ok().finish())
}

/// DELETE /users/{user_name}
///
/// # Errors
/// - 404: unknown user
pub async fn delete_user(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_name = path.into_inner();

    store::delete_user(pool.get_ref(), &user_name).await?;

    tracing::info!(user_name = %user_name, "User deleted");

    Ok(HttpResponse::NoContent().finish())
}

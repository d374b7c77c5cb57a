/// Downtime schedule routes
///
/// Downtime windows are created by authenticated users and attributed to
/// the subject of the presented access token.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::Claims;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store;

#[derive(Deserialize)]
pub struct CreateDowntimeRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub comment: String,
}

/// GET /downtime — list all recorded downtime windows.
pub async fn list_downtime(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let records = store::list_downtimes(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// POST /downtime — record a downtime window for the authenticated user.
///
/// # Errors
/// - 400: end does not come after start
/// - 401: the token subject no longer exists
pub async fn create_downtime(
    claims: web::ReqData<Claims>,
    form: web::Json<CreateDowntimeRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if form.end_time <= form.start_time {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "end_time must be after start_time".to_string(),
        )));
    }

    let user = store::find_user_by_name(pool.get_ref(), &claims.sub)
        .await?
        .ok_or_else(|| AppError::Auth(AuthError::UnknownSubject(claims.sub.clone())))?;

    store::create_downtime(
        pool.get_ref(),
        user.user_id,
        form.start_time,
        form.end_time,
        &form.comment,
    )
    .await?;

    tracing::info!(
        user_name = %user.user_name,
        start = %form.start_time,
        end = %form.end_time,
        "Downtime window recorded"
    );

    Ok(HttpResponse::Created().finish())
}

/// DELETE /downtime/{downtime_id}
///
/// # Errors
/// - 404: unknown downtime id
pub async fn delete_downtime(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let downtime_id = path.into_inner();

    store::delete_downtime(pool.get_ref(), downtime_id).await?;

    tracing::info!(downtime_id, "Downtime window deleted");

    Ok(HttpResponse::NoContent().finish())
}

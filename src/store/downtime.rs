/// Downtime window queries

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, DatabaseError};

/// A recorded downtime window, attributed to the user who created it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DowntimeRecord {
    pub downtime_id: i32,
    pub downtime_start: DateTime<Utc>,
    pub downtime_end: DateTime<Utc>,
    pub user_id: i32,
    pub comment: String,
}

/// All recorded downtime windows, oldest first.
pub async fn list_downtimes(pool: &PgPool) -> Result<Vec<DowntimeRecord>, AppError> {
    let records = sqlx::query_as::<_, DowntimeRecord>(
        r#"
        SELECT downtime_id, downtime_start, downtime_end, user_id, comment
        FROM downtime
        ORDER BY downtime_start
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Record a downtime window for `user_id`.
pub async fn create_downtime(
    pool: &PgPool,
    user_id: i32,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    comment: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO downtime (downtime_start, downtime_end, user_id, comment)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(start_time)
    .bind(end_time)
    .bind(user_id)
    .bind(comment)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a downtime window by id.
///
/// # Errors
/// Fails with `NotFound` if no record with that id exists.
pub async fn delete_downtime(pool: &PgPool, downtime_id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM downtime WHERE downtime_id = $1")
        .bind(downtime_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(format!(
            "downtime record {}",
            downtime_id
        ))));
    }

    Ok(())
}

//! Persistence for the per-series reception profile.
//!
//! The profile lives in the `series.reception_profile` JSONB column and is
//! replaced wholesale on each recomputation. Its embedded `last_analyzed`
//! timestamp drives the staleness rule: absent or older than 7 days means
//! eligible for recomputation.

use serde_json::Value;
use sqlx::PgPool;

use crate::series::SeriesRow;
use crate::DbError;

/// Age (in days) past which a stored profile counts as stale.
const STALE_AFTER_DAYS: i32 = 7;

/// Replace the stored reception profile for a series.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the series does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_reception_profile(
    pool: &PgPool,
    series_id: i64,
    profile: &Value,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE series \
         SET reception_profile = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(profile)
    .bind(series_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns the stored reception profile for a series, or `None` if the
/// series has none (or does not exist).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_reception_profile(
    pool: &PgPool,
    series_id: i64,
) -> Result<Option<Value>, DbError> {
    let profile: Option<Option<Value>> =
        sqlx::query_scalar("SELECT reception_profile FROM series WHERE id = $1")
            .bind(series_id)
            .fetch_optional(pool)
            .await?;

    Ok(profile.flatten())
}

/// Returns series that have at least one review and whose profile is
/// missing or older than 7 days, most popular first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reception_stale(pool: &PgPool, limit: i64) -> Result<Vec<SeriesRow>, DbError> {
    let rows = sqlx::query_as::<_, SeriesRow>(
        "SELECT id, public_id, source_series_id, title, slug, status, follower_count, \
                reception_profile, created_at, updated_at \
         FROM series s \
         WHERE EXISTS (SELECT 1 FROM reviews r WHERE r.series_id = s.id) \
           AND (reception_profile IS NULL \
                OR (reception_profile->>'last_analyzed')::timestamptz \
                    < NOW() - make_interval(days => $1)) \
         ORDER BY follower_count DESC, id \
         LIMIT $2",
    )
    .bind(STALE_AFTER_DAYS)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

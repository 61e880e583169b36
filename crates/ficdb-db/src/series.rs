//! Database operations for the `series` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `series` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeriesRow {
    pub id: i64,
    pub public_id: Uuid,
    /// Identifier the review source uses in its API paths.
    pub source_series_id: String,
    pub title: String,
    pub slug: String,
    pub status: String,
    pub follower_count: i64,
    pub reception_profile: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns crawl candidates: series with no stored reviews yet, most
/// popular first, bounded by `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_crawl_candidates(pool: &PgPool, limit: i64) -> Result<Vec<SeriesRow>, DbError> {
    let rows = sqlx::query_as::<_, SeriesRow>(
        "SELECT id, public_id, source_series_id, title, slug, status, follower_count, \
                reception_profile, created_at, updated_at \
         FROM series s \
         WHERE NOT EXISTS (SELECT 1 FROM reviews r WHERE r.series_id = s.id) \
         ORDER BY follower_count DESC, id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single series by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_series_by_id(pool: &PgPool, series_id: i64) -> Result<Option<SeriesRow>, DbError> {
    let row = sqlx::query_as::<_, SeriesRow>(
        "SELECT id, public_id, source_series_id, title, slug, status, follower_count, \
                reception_profile, created_at, updated_at \
         FROM series \
         WHERE id = $1",
    )
    .bind(series_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a single series by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_series_by_slug(pool: &PgPool, slug: &str) -> Result<Option<SeriesRow>, DbError> {
    let row = sqlx::query_as::<_, SeriesRow>(
        "SELECT id, public_id, source_series_id, title, slug, status, follower_count, \
                reception_profile, created_at, updated_at \
         FROM series \
         WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

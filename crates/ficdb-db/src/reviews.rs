//! Database operations for the `reviews` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub series_id: i64,
    pub reviewer_name: String,
    pub score: Option<f64>,
    pub body: String,
    pub helpful_count: i32,
    pub is_preliminary: bool,
    pub posted_at: Option<DateTime<Utc>>,
    pub text_length: i32,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The per-review columns the reception aggregator reads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewSampleRow {
    pub score: Option<f64>,
    pub body: String,
    pub text_length: i32,
    pub sentiment_score: f64,
    pub is_preliminary: bool,
}

/// Fields for inserting or updating one review.
#[derive(Debug, Clone)]
pub struct NewReview<'a> {
    pub series_id: i64,
    pub reviewer_name: &'a str,
    pub score: Option<f64>,
    pub body: &'a str,
    pub helpful_count: i32,
    pub is_preliminary: bool,
    pub posted_at: Option<DateTime<Utc>>,
    pub text_length: i32,
    pub sentiment_score: f64,
    pub sentiment_label: &'a str,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a review, or update it in place when the (series, reviewer) pair
/// already exists. Re-ingestion never duplicates a reviewer's row.
///
/// Returns the review's id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_review(pool: &PgPool, review: &NewReview<'_>) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO reviews \
             (series_id, reviewer_name, score, body, helpful_count, is_preliminary, \
              posted_at, text_length, sentiment_score, sentiment_label) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (series_id, reviewer_name) DO UPDATE SET \
             score = EXCLUDED.score, \
             body = EXCLUDED.body, \
             helpful_count = EXCLUDED.helpful_count, \
             is_preliminary = EXCLUDED.is_preliminary, \
             posted_at = EXCLUDED.posted_at, \
             text_length = EXCLUDED.text_length, \
             sentiment_score = EXCLUDED.sentiment_score, \
             sentiment_label = EXCLUDED.sentiment_label, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(review.series_id)
    .bind(review.reviewer_name)
    .bind(review.score)
    .bind(review.body)
    .bind(review.helpful_count)
    .bind(review.is_preliminary)
    .bind(review.posted_at)
    .bind(review.text_length)
    .bind(review.sentiment_score)
    .bind(review.sentiment_label)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns `true` if a review by this reviewer already exists for the series.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn review_exists(
    pool: &PgPool,
    series_id: i64,
    reviewer_name: &str,
) -> Result<bool, DbError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM reviews WHERE series_id = $1 AND reviewer_name = $2)",
    )
    .bind(series_id)
    .bind(reviewer_name)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Count stored reviews for a series.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_reviews_for_series(pool: &PgPool, series_id: i64) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE series_id = $1")
        .bind(series_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Returns the aggregation inputs for every review of a series, in
/// ingestion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_review_samples(
    pool: &PgPool,
    series_id: i64,
) -> Result<Vec<ReviewSampleRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewSampleRow>(
        "SELECT score, body, text_length, sentiment_score, is_preliminary \
         FROM reviews \
         WHERE series_id = $1 \
         ORDER BY id",
    )
    .bind(series_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

//! Live integration tests for ficdb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/ficdb-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use ficdb_db::{
    count_reviews_for_series, get_reception_profile, get_series_by_slug, list_crawl_candidates,
    list_reception_stale, list_review_samples, review_exists, update_reception_profile,
    upsert_review, NewReview,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a minimal series row and return its generated `id`.
async fn insert_test_series(pool: &sqlx::PgPool, slug: &str, follower_count: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO series (source_series_id, title, slug, follower_count) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(format!("src-{slug}"))
    .bind(format!("Test Series {slug}"))
    .bind(slug)
    .bind(follower_count)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_test_series failed for slug '{slug}': {e}"))
}

fn make_review(series_id: i64, reviewer: &'static str, score: Option<f64>) -> NewReview<'static> {
    NewReview {
        series_id,
        reviewer_name: reviewer,
        score,
        body: "A perfectly serviceable review body.",
        helpful_count: 2,
        is_preliminary: false,
        posted_at: None,
        text_length: 37,
        sentiment_score: 0.4,
        sentiment_label: "positive",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn upsert_review_updates_in_place_on_conflict(pool: sqlx::PgPool) {
    let series_id = insert_test_series(&pool, "upsert-target", 100).await;

    let first = make_review(series_id, "prolific_reader", Some(6.0));
    let first_id = upsert_review(&pool, &first).await.expect("first upsert");

    let mut second = make_review(series_id, "prolific_reader", Some(9.0));
    second.body = "Revised after the latest arc: much better.";
    second.sentiment_score = 0.8;
    let second_id = upsert_review(&pool, &second).await.expect("second upsert");

    // Same row, updated values, no duplicate.
    assert_eq!(first_id, second_id);
    assert_eq!(count_reviews_for_series(&pool, series_id).await.unwrap(), 1);

    let samples = list_review_samples(&pool, series_id).await.unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].score, Some(9.0));
    assert_eq!(samples[0].body, "Revised after the latest arc: much better.");
    assert!((samples[0].sentiment_score - 0.8).abs() < f64::EPSILON);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn review_exists_distinguishes_reviewers(pool: sqlx::PgPool) {
    let series_id = insert_test_series(&pool, "exists-check", 10).await;
    upsert_review(&pool, &make_review(series_id, "seen_before", Some(7.0)))
        .await
        .unwrap();

    assert!(review_exists(&pool, series_id, "seen_before").await.unwrap());
    assert!(!review_exists(&pool, series_id, "never_seen").await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn crawl_candidates_exclude_series_with_reviews(pool: sqlx::PgPool) {
    let reviewed = insert_test_series(&pool, "already-reviewed", 500).await;
    let fresh_popular = insert_test_series(&pool, "fresh-popular", 300).await;
    let fresh_niche = insert_test_series(&pool, "fresh-niche", 30).await;
    upsert_review(&pool, &make_review(reviewed, "somebody", Some(8.0)))
        .await
        .unwrap();

    let candidates = list_crawl_candidates(&pool, 10).await.unwrap();
    let ids: Vec<i64> = candidates.iter().map(|s| s.id).collect();

    // Popularity descending, reviewed series absent.
    assert_eq!(ids, vec![fresh_popular, fresh_niche]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn reception_profile_round_trips_and_clears_staleness(pool: sqlx::PgPool) {
    let series_id = insert_test_series(&pool, "profiled", 50).await;
    upsert_review(&pool, &make_review(series_id, "reader_one", Some(8.0)))
        .await
        .unwrap();

    // With a review but no profile, the series is stale.
    let stale = list_reception_stale(&pool, 10).await.unwrap();
    assert!(stale.iter().any(|s| s.id == series_id));

    let profile = serde_json::json!({
        "review_count": 1,
        "sentiment_ratio": 1.0,
        "last_analyzed": chrono::Utc::now(),
    });
    update_reception_profile(&pool, series_id, &profile)
        .await
        .expect("profile update");

    let stored = get_reception_profile(&pool, series_id).await.unwrap();
    assert_eq!(stored.unwrap()["review_count"], 1);

    // Freshly analyzed: no longer stale.
    let stale = list_reception_stale(&pool, 10).await.unwrap();
    assert!(!stale.iter().any(|s| s.id == series_id));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn old_profiles_become_stale_again(pool: sqlx::PgPool) {
    let series_id = insert_test_series(&pool, "aging", 50).await;
    upsert_review(&pool, &make_review(series_id, "reader_two", Some(5.0)))
        .await
        .unwrap();

    let eight_days_ago = chrono::Utc::now() - chrono::Duration::days(8);
    let profile = serde_json::json!({ "review_count": 1, "last_analyzed": eight_days_ago });
    update_reception_profile(&pool, series_id, &profile)
        .await
        .unwrap();

    let stale = list_reception_stale(&pool, 10).await.unwrap();
    assert!(stale.iter().any(|s| s.id == series_id));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn get_series_by_slug_finds_the_row(pool: sqlx::PgPool) {
    let series_id = insert_test_series(&pool, "findable", 1).await;
    let row = get_series_by_slug(&pool, "findable").await.unwrap().unwrap();
    assert_eq!(row.id, series_id);
    assert_eq!(row.source_series_id, "src-findable");
    assert!(row.reception_profile.is_none());

    assert!(get_series_by_slug(&pool, "missing").await.unwrap().is_none());
}

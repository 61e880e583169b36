//! The per-series crawl pipeline: paginate, classify, upsert, checkpoint.

use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;

use ficdb_crawler::{CheckpointStore, CrawlErrorKind, CrawlProgress, CrawlerError};
use ficdb_db::{NewReview, SeriesRow};

/// Why pagination for a series stopped.
enum StopReason {
    /// 404, empty page, exhausted pages, or the per-series target reached:
    /// the series may be marked processed.
    Complete,
    /// Page-level fetch failure: the series stays eligible for a later run.
    Abandoned,
    /// Shutdown or run budget: stop with the cursor intact.
    Interrupted,
}

/// Crawl one series' reviews from its checkpointed cursor.
///
/// Returns the number of reviews newly ingested for the series this run.
///
/// # Errors
///
/// Returns an error only when a checkpoint save fails — fetch errors are
/// logged to the error ring and abandon just this series, and item errors
/// skip just that item.
#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
pub(super) async fn crawl_series_reviews(
    pool: &sqlx::PgPool,
    client: &ficdb_crawler::ReviewSourceClient,
    store: &CheckpointStore<CrawlProgress>,
    progress: &mut CrawlProgress,
    series: &SeriesRow,
    save_every: u64,
    budget_left: u64,
    shutdown: &watch::Receiver<bool>,
) -> anyhow::Result<u64> {
    if progress.is_processed(series.id) {
        tracing::debug!(series = %series.slug, "series already processed — skipping");
        return Ok(0);
    }

    progress.begin_series(series.id);
    let mut page = progress.resume_page(series.id);
    let target = u64::from(progress.config.reviews_per_series);
    let inter_request_delay = Duration::from_millis(progress.config.inter_request_delay_ms);

    let mut newly_ingested: u64 = 0;
    let mut since_save: u64 = 0;

    tracing::info!(series = %series.slug, page, "crawling series reviews");

    let stop = 'pages: loop {
        if *shutdown.borrow() {
            break 'pages StopReason::Interrupted;
        }

        let reviews_page = match client
            .fetch_reviews_page(&series.source_series_id, page)
            .await
        {
            Ok(Some(p)) => p,
            // 404: the review stream is exhausted, not an error.
            Ok(None) => break 'pages StopReason::Complete,
            Err(err) => {
                tracing::warn!(
                    series = %series.slug,
                    page,
                    error = %err,
                    "page fetch failed — abandoning series for this run"
                );
                progress.push_error(fetch_error_kind(&err), Some(series.id), err.to_string());
                break 'pages StopReason::Abandoned;
            }
        };

        if reviews_page.data.is_empty() {
            break 'pages StopReason::Complete;
        }
        let has_next_page = reviews_page.pagination.has_next_page;

        for item in reviews_page.data {
            if !progress.config.include_preliminary && item.is_preliminary {
                tracing::trace!(series = %series.slug, reviewer = %item.reviewer,
                    "preliminary review excluded by config");
                continue;
            }

            match ingest_review(pool, series.id, &item).await {
                Ok(true) => {
                    progress.record_review();
                    newly_ingested += 1;
                    since_save += 1;
                    if since_save >= save_every.max(1) {
                        store.save(progress).context("throttled checkpoint save failed")?;
                        since_save = 0;
                    }
                }
                Ok(false) => {
                    // Duplicate reviewer — overlapping pages after a retry.
                    tracing::trace!(series = %series.slug, reviewer = %item.reviewer,
                        "duplicate review skipped");
                }
                Err(e) => {
                    progress.push_error(
                        CrawlErrorKind::Item,
                        Some(series.id),
                        format!("reviewer {}: {e:#}", item.reviewer),
                    );
                }
            }

            let series_total = progress
                .current
                .map_or(newly_ingested, |c| c.reviews_ingested);
            if series_total >= target {
                break 'pages StopReason::Complete;
            }
            if newly_ingested >= budget_left {
                break 'pages StopReason::Interrupted;
            }
        }

        if !has_next_page {
            break 'pages StopReason::Complete;
        }

        page += 1;
        progress.advance_page(page);
        tokio::time::sleep(inter_request_delay).await;
    };

    match stop {
        StopReason::Complete => {
            if newly_ingested > 0 {
                if let Err(e) = crate::reception::recompute_series_profile(pool, series.id).await {
                    tracing::warn!(series = %series.slug, error = %e,
                        "reception aggregation failed after ingest");
                    progress.push_error(
                        CrawlErrorKind::Aggregation,
                        Some(series.id),
                        format!("{e:#}"),
                    );
                }
            }
            progress.complete_series(series.id);
            tracing::info!(series = %series.slug, newly_ingested, "series complete");
        }
        StopReason::Abandoned | StopReason::Interrupted => {
            // Cursor stays in place so the next run resumes here.
        }
    }

    // Unconditional boundary save.
    store.save(progress).context("checkpoint save failed at series boundary")?;
    Ok(newly_ingested)
}

/// Classify, persist, and count one review item.
///
/// Returns `Ok(false)` for a duplicate (series, reviewer) pair — skipped,
/// not an error — and `Ok(true)` when a new row was written.
async fn ingest_review(
    pool: &sqlx::PgPool,
    series_id: i64,
    item: &ficdb_crawler::SourceReview,
) -> anyhow::Result<bool> {
    if ficdb_db::review_exists(pool, series_id, &item.reviewer).await? {
        return Ok(false);
    }

    let sentiment = ficdb_sentiment::analyze(&item.text);
    let text_length = i32::try_from(item.text.chars().count()).unwrap_or(i32::MAX);

    let review = NewReview {
        series_id,
        reviewer_name: &item.reviewer,
        score: item.score,
        body: &item.text,
        helpful_count: item.helpful_count,
        is_preliminary: item.is_preliminary,
        posted_at: item.posted_at,
        text_length,
        sentiment_score: sentiment.score,
        sentiment_label: sentiment.label.as_str(),
    };
    ficdb_db::upsert_review(pool, &review).await?;
    Ok(true)
}

fn fetch_error_kind(err: &CrawlerError) -> CrawlErrorKind {
    match err {
        CrawlerError::RateLimited { .. } => CrawlErrorKind::RateLimit,
        CrawlerError::Http(_) => CrawlErrorKind::Network,
        CrawlerError::Deserialize { .. } => CrawlErrorKind::Parse,
        _ => CrawlErrorKind::Status,
    }
}

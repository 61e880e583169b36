//! Crawl command handlers: the orchestrator run loop plus checkpoint
//! status/reset/export utilities.
//!
//! Fetch errors at the page level abort only the affected series (it stays
//! eligible for the next run); item-level errors skip the item. Only a
//! checkpoint save failure aborts the whole run, since progress can no
//! longer be durably tracked.

mod series;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use tokio::sync::watch;

use ficdb_core::AppConfig;
use ficdb_crawler::{
    CheckpointStore, CrawlProgress, CrawlRunConfig, RateLimiter, ReviewSourceClient,
};

/// Sub-commands available under `crawl`.
#[derive(Debug, Subcommand)]
pub enum CrawlCommands {
    /// Crawl reviews for series that have none yet, resuming from the checkpoint
    Reviews {
        /// Maximum number of series to process this run
        #[arg(long, default_value_t = 20)]
        max_series: i64,

        /// Overall review budget for this run (0 = unbounded)
        #[arg(long, default_value_t = 0)]
        max_reviews: u64,

        /// List the series that would be crawled and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the checkpoint summary without crawling
    Status,
    /// Discard the checkpoint and start the next run from scratch
    Reset,
    /// Write a read-only checkpoint snapshot (summary + raw state) to a file
    Export {
        /// Destination file for the snapshot
        #[arg(long)]
        out: PathBuf,
    },
}

pub(crate) async fn run(config: &AppConfig, command: CrawlCommands) -> anyhow::Result<()> {
    let store: CheckpointStore<CrawlProgress> = CheckpointStore::new(&config.checkpoint_path);
    match command {
        CrawlCommands::Reviews {
            max_series,
            max_reviews,
            dry_run,
        } => {
            let pool = crate::connect_pool(config).await?;
            run_crawl_reviews(&pool, config, &store, max_series, max_reviews, dry_run).await
        }
        CrawlCommands::Status => {
            let progress = store.load();
            print_summary(&progress);
            Ok(())
        }
        CrawlCommands::Reset => {
            store.reset().context("failed to reset checkpoint")?;
            println!("checkpoint reset: {}", store.path().display());
            Ok(())
        }
        CrawlCommands::Export { out } => {
            let progress = store.load();
            store
                .export(&progress, progress.summary(), &out)
                .context("failed to export checkpoint snapshot")?;
            println!("checkpoint snapshot written to {}", out.display());
            Ok(())
        }
    }
}

/// The orchestrator run loop: select candidates, crawl each one through the
/// shared client/limiter, and keep the checkpoint current.
///
/// # Errors
///
/// Returns an error only when the checkpoint itself cannot be persisted;
/// all fetch and item failures are absorbed into the checkpoint error ring.
async fn run_crawl_reviews(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    store: &CheckpointStore<CrawlProgress>,
    max_series: i64,
    max_reviews: u64,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut progress = store.load();
    progress.config = CrawlRunConfig {
        reviews_per_series: config.crawler_reviews_per_series,
        include_preliminary: config.crawler_include_preliminary,
        inter_request_delay_ms: config.crawler_inter_request_delay_ms,
        inter_series_delay_ms: config.crawler_inter_series_delay_ms,
    };

    let candidates = select_candidates(pool, &progress, max_series).await?;
    if candidates.is_empty() {
        println!("no eligible series to crawl");
        return Ok(());
    }

    if dry_run {
        println!("dry-run: would crawl {} series:", candidates.len());
        for s in &candidates {
            println!("  {} ({} followers, resume page {})", s.slug, s.follower_count,
                progress.resume_page(s.id));
        }
        return Ok(());
    }

    let limiter = RateLimiter::new(
        config.crawler_max_per_second,
        config.crawler_max_per_minute,
    );
    let client = ReviewSourceClient::new(
        &config.review_source_base_url,
        config.crawler_request_timeout_secs,
        &config.crawler_user_agent,
        config.crawler_max_retries,
        config.crawler_retry_backoff_base_secs,
        limiter,
    )?;

    let shutdown = spawn_shutdown_listener();
    let mut ingested_this_run: u64 = 0;
    let series_count = candidates.len();

    for (i, s) in candidates.iter().enumerate() {
        if *shutdown.borrow() {
            tracing::info!("shutdown requested — stopping before the next series");
            break;
        }
        let budget_left = if max_reviews == 0 {
            u64::MAX
        } else {
            max_reviews.saturating_sub(ingested_this_run)
        };
        if budget_left == 0 {
            tracing::info!(max_reviews, "run review budget exhausted");
            break;
        }

        let newly_ingested = series::crawl_series_reviews(
            pool,
            &client,
            store,
            &mut progress,
            s,
            config.checkpoint_save_every,
            budget_left,
            &shutdown,
        )
        .await?;
        ingested_this_run += newly_ingested;

        if i + 1 < series_count {
            tokio::time::sleep(Duration::from_millis(
                progress.config.inter_series_delay_ms,
            ))
            .await;
        }
    }

    // Final checkpoint flush; failure here is fatal.
    store
        .save(&progress)
        .context("final checkpoint save failed")?;

    print_summary(&progress);
    Ok(())
}

/// Assemble this run's work list: the checkpointed in-flight series first
/// (so its cursor is honored), then fresh candidates by popularity.
async fn select_candidates(
    pool: &sqlx::PgPool,
    progress: &CrawlProgress,
    max_series: i64,
) -> anyhow::Result<Vec<ficdb_db::SeriesRow>> {
    let mut candidates: Vec<ficdb_db::SeriesRow> = Vec::new();

    if let Some(cursor) = progress.current {
        if !progress.is_processed(cursor.series_id) {
            match ficdb_db::get_series_by_id(pool, cursor.series_id).await? {
                Some(row) => candidates.push(row),
                None => tracing::warn!(
                    series_id = cursor.series_id,
                    "checkpointed series no longer exists — skipping"
                ),
            }
        }
    }

    for row in ficdb_db::list_crawl_candidates(pool, max_series).await? {
        if progress.is_processed(row.id) || candidates.iter().any(|c| c.id == row.id) {
            continue;
        }
        candidates.push(row);
    }

    candidates.truncate(usize::try_from(max_series).unwrap_or(usize::MAX));
    Ok(candidates)
}

fn print_summary(progress: &CrawlProgress) {
    println!(
        "crawl progress: {} series completed, {} reviews ingested, {} errors logged",
        progress.totals.series_completed,
        progress.totals.reviews_ingested,
        progress.errors.len()
    );
    if let Some(cursor) = progress.current {
        println!(
            "in progress: series {} at page {} ({} reviews so far)",
            cursor.series_id, cursor.next_page, cursor.reviews_ingested
        );
    }
    for entry in progress.recent_errors(5) {
        println!(
            "  [{}] {:?} series={:?}: {}",
            entry.at.format("%Y-%m-%d %H:%M:%S"),
            entry.kind,
            entry.series_id,
            entry.message
        );
    }
}

/// Flip a watch flag when ctrl-c or SIGTERM arrives, so the run loop can
/// stop at the next page/series boundary and flush the checkpoint.
fn spawn_shutdown_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = tx.send(true);
    });
    rx
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, finishing current page");
}

//! Analyze command handlers: recompute stored reception profiles.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use serde_json::Value;

use ficdb_core::AppConfig;

/// A profile older than this is eligible for recomputation.
const STALE_AFTER_DAYS: i64 = 7;

/// Sub-commands available under `analyze`.
#[derive(Debug, Subcommand)]
pub enum AnalyzeCommands {
    /// Recompute reception profiles from stored reviews
    Reception {
        /// Recompute a single series by slug instead of scanning for stale ones
        #[arg(long)]
        series: Option<String>,

        /// Recompute even when the stored profile is still fresh
        #[arg(long)]
        force: bool,

        /// Maximum number of stale series to process in one invocation
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

pub(crate) async fn run(config: &AppConfig, command: AnalyzeCommands) -> anyhow::Result<()> {
    match command {
        AnalyzeCommands::Reception {
            series,
            force,
            limit,
        } => {
            let pool = crate::connect_pool(config).await?;
            run_analyze_reception(&pool, series.as_deref(), force, limit).await
        }
    }
}

/// Recompute profiles for one series (by slug) or for every stale series.
///
/// # Errors
///
/// Fails on database errors, on an unknown slug, or when the targeted
/// series has no reviews to aggregate.
async fn run_analyze_reception(
    pool: &sqlx::PgPool,
    slug: Option<&str>,
    force: bool,
    limit: i64,
) -> anyhow::Result<()> {
    if let Some(slug) = slug {
        let series = ficdb_db::get_series_by_slug(pool, slug)
            .await?
            .with_context(|| format!("no series with slug '{slug}'"))?;

        if !force && !profile_is_stale(series.reception_profile.as_ref()) {
            println!("profile for '{slug}' is fresh; use --force to recompute");
            return Ok(());
        }

        let profile = recompute_series_profile(pool, series.id).await?;
        println!(
            "recomputed '{slug}': {} reviews, sentiment ratio {:.2}",
            profile.review_count, profile.sentiment_ratio
        );
        return Ok(());
    }

    let stale = ficdb_db::list_reception_stale(pool, limit).await?;
    if stale.is_empty() {
        println!("no series need reception analysis");
        return Ok(());
    }

    let mut updated = 0usize;
    for series in &stale {
        match recompute_series_profile(pool, series.id).await {
            Ok(profile) => {
                tracing::info!(
                    series = %series.slug,
                    review_count = profile.review_count,
                    "reception profile updated"
                );
                updated += 1;
            }
            Err(e) => {
                tracing::warn!(series = %series.slug, error = %e, "reception analysis failed");
            }
        }
    }
    println!("updated {updated} of {} stale series", stale.len());
    Ok(())
}

/// Recompute and persist the reception profile for one series.
///
/// # Errors
///
/// Fails when the series has no reviews, or on database errors.
pub(crate) async fn recompute_series_profile(
    pool: &sqlx::PgPool,
    series_id: i64,
) -> anyhow::Result<ficdb_sentiment::ReceptionProfile> {
    let samples = ficdb_db::list_review_samples(pool, series_id).await?;
    let reviews: Vec<ficdb_sentiment::ReviewSample> = samples
        .into_iter()
        .map(|row| ficdb_sentiment::ReviewSample {
            score: row.score,
            text: row.body,
            text_length: row.text_length,
            sentiment_score: row.sentiment_score,
            is_preliminary: row.is_preliminary,
        })
        .collect();

    let profile = ficdb_sentiment::compute_profile(&reviews)
        .with_context(|| format!("cannot aggregate reception for series {series_id}"))?;
    let value = serde_json::to_value(&profile).context("failed to encode reception profile")?;
    ficdb_db::update_reception_profile(pool, series_id, &value).await?;
    Ok(profile)
}

/// A profile is stale when it is absent, carries no parseable
/// `last_analyzed`, or was analyzed more than 7 days ago.
fn profile_is_stale(profile: Option<&Value>) -> bool {
    let Some(profile) = profile else {
        return true;
    };
    let Some(last_analyzed) = profile
        .get("last_analyzed")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())
    else {
        return true;
    };
    last_analyzed < Utc::now() - Duration::days(STALE_AFTER_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_profile_is_stale() {
        assert!(profile_is_stale(None));
    }

    #[test]
    fn profile_without_timestamp_is_stale() {
        let profile = json!({ "review_count": 3 });
        assert!(profile_is_stale(Some(&profile)));
    }

    #[test]
    fn unparseable_timestamp_is_stale() {
        let profile = json!({ "last_analyzed": "yesterday-ish" });
        assert!(profile_is_stale(Some(&profile)));
    }

    #[test]
    fn fresh_profile_is_not_stale() {
        let profile = json!({ "last_analyzed": Utc::now() });
        assert!(!profile_is_stale(Some(&profile)));
    }

    #[test]
    fn eight_day_old_profile_is_stale() {
        let profile = json!({ "last_analyzed": Utc::now() - Duration::days(8) });
        assert!(profile_is_stale(Some(&profile)));
    }
}

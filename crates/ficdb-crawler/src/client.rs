//! HTTP client for the review source's paginated listing endpoint.

use std::time::Duration;

use reqwest::Client;

use crate::error::CrawlerError;
use crate::rate_limit::RateLimiter;
use crate::retry::retry_with_backoff;
use crate::types::ReviewsPage;

/// Retry-after fallback when a 429 response omits the header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Client for `GET {base}/series/{source_id}/reviews?page=N`.
///
/// Every attempt — retries included — first acquires one admission from the
/// process-wide [`RateLimiter`], so the configured request ceiling holds no
/// matter how aggressively callers page. Transient errors (429, network
/// failures) are retried with exponential backoff; 404 is surfaced as
/// `Ok(None)` to mean "no more data".
pub struct ReviewSourceClient {
    client: Client,
    base_url: String,
    limiter: RateLimiter,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl ReviewSourceClient {
    /// Creates a client with configured timeout, `User-Agent`, retry policy,
    /// and the shared rate limiter the orchestrator constructed.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
        limiter: RateLimiter,
    ) -> Result<Self, CrawlerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            limiter,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of reviews for a series, with automatic retry on
    /// transient errors.
    ///
    /// Returns `Ok(None)` on HTTP 404 — the series' review stream is
    /// exhausted (or the series is unknown to the source); callers must
    /// treat this as end-of-data, not as a failure.
    ///
    /// # Errors
    ///
    /// - [`CrawlerError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`CrawlerError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`CrawlerError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`CrawlerError::Deserialize`] — response body is not a valid page (not retried).
    pub async fn fetch_reviews_page(
        &self,
        source_series_id: &str,
        page: u32,
    ) -> Result<Option<ReviewsPage>, CrawlerError> {
        let url = self.reviews_url(source_series_id, page);

        let result = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                self.limiter.admit().await;

                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(CrawlerError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(CrawlerError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(CrawlerError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                let parsed = serde_json::from_str::<ReviewsPage>(&body).map_err(|e| {
                    CrawlerError::Deserialize {
                        context: format!("reviews page {page} for series {source_series_id}"),
                        source: e,
                    }
                })?;

                Ok(parsed)
            }
        })
        .await;

        match result {
            Ok(page) => Ok(Some(page)),
            // End of data, not an error.
            Err(CrawlerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Builds the listing URL for a series and 1-based page number.
    fn reviews_url(&self, source_series_id: &str, page: u32) -> String {
        format!(
            "{}/series/{source_series_id}/reviews?page={page}",
            self.base_url
        )
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

//! Exponential-backoff retry for transient review-source errors.
//!
//! Retries 429s and network-level failures with a doubling delay; 404s
//! (end of data), unexpected statuses, and parse failures are propagated
//! immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::CrawlerError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`CrawlerError::RateLimited`] — HTTP 429; the source asked us to back off.
/// - [`CrawlerError::Http`] — network-level failure (connection reset, timeout, DNS).
///
/// Non-retriable errors (propagated immediately):
/// - [`CrawlerError::NotFound`] — 404 signals end of data; retrying would
///   return the same result.
/// - [`CrawlerError::UnexpectedStatus`] — non-retriable HTTP status.
/// - [`CrawlerError::Deserialize`] — response body does not parse; retrying won't fix it.
/// - checkpoint errors — not produced by fetches at all.
fn is_retriable(err: &CrawlerError) -> bool {
    matches!(
        err,
        CrawlerError::RateLimited { .. } | CrawlerError::Http(_)
    )
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
/// Non-retriable errors are returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CrawlerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CrawlerError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt seconds, overflow-capped.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

//! Resumable, rate-limited review crawler plumbing for FICDB.
//!
//! Provides the shared request rate limiter, the retrying HTTP client for
//! the paginated review source, the generic file-backed checkpoint store,
//! and the crawl progress document the orchestrator persists through it.

pub mod checkpoint;
pub mod client;
pub mod error;
pub mod progress;
pub mod rate_limit;
pub mod types;

mod retry;

pub use checkpoint::CheckpointStore;
pub use client::ReviewSourceClient;
pub use error::CrawlerError;
pub use progress::{
    CrawlErrorEntry, CrawlErrorKind, CrawlProgress, CrawlRunConfig, CrawlTotals, SeriesCursor,
};
pub use rate_limit::RateLimiter;
pub use types::{PageInfo, ReviewsPage, SourceReview};

//! Wire types for the paginated review source.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of the review listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewsPage {
    pub data: Vec<SourceReview>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
}

/// A single review item as returned by the source.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReview {
    pub reviewer: String,
    /// Numeric score on the source's 0–10 scale; absent for text-only reviews.
    pub score: Option<f64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub helpful_count: i32,
    #[serde(default)]
    pub is_preliminary: bool,
    pub posted_at: Option<DateTime<Utc>>,
}

//! The crawl progress document persisted through the checkpoint store.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Cap on the checkpoint error log: a bounded ring, not a growing log.
pub(crate) const ERROR_LOG_CAP: usize = 100;

/// Set of series ids that stays a genuine `HashSet` in business logic but
/// serializes as a sorted sequence, since JSON has no set type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(HashSet<i64>);

impl IdSet {
    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for IdSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut ids: Vec<i64> = self.0.iter().copied().collect();
        ids.sort_unstable();
        ids.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IdSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<i64>::deserialize(deserializer)?;
        Ok(IdSet(ids.into_iter().collect()))
    }
}

/// Category for entries in the checkpoint error ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlErrorKind {
    RateLimit,
    Network,
    Status,
    Parse,
    Item,
    Aggregation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlErrorEntry {
    pub at: DateTime<Utc>,
    pub kind: CrawlErrorKind,
    pub series_id: Option<i64>,
    pub message: String,
}

/// Run-level counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrawlTotals {
    pub series_completed: u64,
    pub reviews_ingested: u64,
}

/// Cursor into the series currently being paginated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesCursor {
    pub series_id: i64,
    /// Next page to request (1-based).
    pub next_page: u32,
    /// Reviews ingested for this series so far, across runs.
    pub reviews_ingested: u64,
}

/// Run parameters recorded alongside progress so a resumed run can report
/// what it was started with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRunConfig {
    pub reviews_per_series: u32,
    pub include_preliminary: bool,
    pub inter_request_delay_ms: u64,
    pub inter_series_delay_ms: u64,
}

impl Default for CrawlRunConfig {
    fn default() -> Self {
        Self {
            reviews_per_series: 50,
            include_preliminary: true,
            inter_request_delay_ms: 500,
            inter_series_delay_ms: 2000,
        }
    }
}

/// Durable progress record for one crawl, enabling resume-after-crash.
///
/// Invariants upheld by the mutating methods below:
/// - a series id lands in `processed_series_ids` only via [`Self::complete_series`],
///   i.e. after its pages were exhausted or a terminal 404 was seen;
/// - `current`, when present, is never also in the processed set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlProgress {
    pub processed_series_ids: IdSet,
    pub current: Option<SeriesCursor>,
    pub totals: CrawlTotals,
    pub errors: VecDeque<CrawlErrorEntry>,
    pub config: CrawlRunConfig,
}

impl CrawlProgress {
    #[must_use]
    pub fn new(config: CrawlRunConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_processed(&self, series_id: i64) -> bool {
        self.processed_series_ids.contains(series_id)
    }

    /// Mark a series as the one being paginated, resuming its existing
    /// cursor if it is already current. No-op for processed series.
    pub fn begin_series(&mut self, series_id: i64) {
        if self.is_processed(series_id) {
            return;
        }
        match self.current {
            Some(cursor) if cursor.series_id == series_id => {}
            _ => {
                self.current = Some(SeriesCursor {
                    series_id,
                    next_page: 1,
                    reviews_ingested: 0,
                });
            }
        }
    }

    /// The page to request next for `series_id` (1 if it is not current).
    #[must_use]
    pub fn resume_page(&self, series_id: i64) -> u32 {
        match self.current {
            Some(cursor) if cursor.series_id == series_id => cursor.next_page,
            _ => 1,
        }
    }

    pub fn record_review(&mut self) {
        if let Some(cursor) = self.current.as_mut() {
            cursor.reviews_ingested += 1;
        }
        self.totals.reviews_ingested += 1;
    }

    pub fn advance_page(&mut self, next_page: u32) {
        if let Some(cursor) = self.current.as_mut() {
            cursor.next_page = next_page;
        }
    }

    /// Move the current series into the processed set.
    pub fn complete_series(&mut self, series_id: i64) {
        if let Some(cursor) = self.current {
            if cursor.series_id == series_id {
                self.current = None;
            }
        }
        if self.processed_series_ids.insert(series_id) {
            self.totals.series_completed += 1;
        }
    }

    /// Append to the bounded error ring, dropping the oldest entry at cap.
    pub fn push_error(&mut self, kind: CrawlErrorKind, series_id: Option<i64>, message: String) {
        if self.errors.len() >= ERROR_LOG_CAP {
            self.errors.pop_front();
        }
        self.errors.push_back(CrawlErrorEntry {
            at: Utc::now(),
            kind,
            series_id,
            message,
        });
    }

    /// Computed summary for status output and checkpoint exports.
    #[must_use]
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "series_completed": self.totals.series_completed,
            "reviews_ingested": self.totals.reviews_ingested,
            "processed_series": self.processed_series_ids.len(),
            "current": self.current,
            "error_count": self.errors.len(),
        })
    }

    /// The most recent `n` error entries, newest last.
    #[must_use]
    pub fn recent_errors(&self, n: usize) -> Vec<&CrawlErrorEntry> {
        let skip = self.errors.len().saturating_sub(n);
        self.errors.iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_ring_keeps_only_the_most_recent_hundred() {
        let mut progress = CrawlProgress::default();
        for i in 0..150 {
            progress.push_error(CrawlErrorKind::Network, Some(i), format!("error {i}"));
        }
        assert_eq!(progress.errors.len(), ERROR_LOG_CAP);
        assert_eq!(progress.errors.front().unwrap().message, "error 50");
        assert_eq!(progress.errors.back().unwrap().message, "error 149");
    }

    #[test]
    fn complete_series_clears_current_and_marks_processed() {
        let mut progress = CrawlProgress::default();
        progress.begin_series(7);
        assert!(progress.current.is_some());

        progress.complete_series(7);
        assert!(progress.current.is_none());
        assert!(progress.is_processed(7));
        assert_eq!(progress.totals.series_completed, 1);

        // Completing again is idempotent.
        progress.complete_series(7);
        assert_eq!(progress.totals.series_completed, 1);
    }

    #[test]
    fn begin_series_is_a_no_op_for_processed_series() {
        let mut progress = CrawlProgress::default();
        progress.begin_series(3);
        progress.complete_series(3);

        progress.begin_series(3);
        assert!(progress.current.is_none(), "processed series must not become current");
    }

    #[test]
    fn begin_series_resumes_an_existing_cursor() {
        let mut progress = CrawlProgress::default();
        progress.begin_series(5);
        progress.advance_page(4);
        progress.record_review();

        // A restart calls begin_series again; the cursor must survive.
        progress.begin_series(5);
        assert_eq!(progress.resume_page(5), 4);
        assert_eq!(progress.current.unwrap().reviews_ingested, 1);
    }

    #[test]
    fn resume_page_defaults_to_one_for_fresh_series() {
        let progress = CrawlProgress::default();
        assert_eq!(progress.resume_page(42), 1);
    }

    #[test]
    fn id_set_serializes_as_a_sorted_sequence() {
        let mut progress = CrawlProgress::default();
        for id in [9, 2, 5] {
            progress.begin_series(id);
            progress.complete_series(id);
        }
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(
            json["processed_series_ids"],
            serde_json::json!([2, 5, 9])
        );

        let back: CrawlProgress = serde_json::from_value(json).unwrap();
        assert!(back.is_processed(5));
        assert_eq!(back.processed_series_ids.len(), 3);
    }

    #[test]
    fn counters_track_reviews_and_pages() {
        let mut progress = CrawlProgress::default();
        progress.begin_series(1);
        progress.record_review();
        progress.record_review();
        progress.advance_page(2);

        assert_eq!(progress.totals.reviews_ingested, 2);
        let cursor = progress.current.unwrap();
        assert_eq!(cursor.next_page, 2);
        assert_eq!(cursor.reviews_ingested, 2);
    }

    #[test]
    fn summary_reports_counts() {
        let mut progress = CrawlProgress::default();
        progress.begin_series(1);
        progress.record_review();
        progress.push_error(CrawlErrorKind::Item, Some(1), "bad item".to_string());

        let summary = progress.summary();
        assert_eq!(summary["reviews_ingested"], 1);
        assert_eq!(summary["error_count"], 1);
        assert_eq!(summary["current"]["series_id"], 1);
    }

    #[test]
    fn recent_errors_returns_the_tail() {
        let mut progress = CrawlProgress::default();
        for i in 0..10 {
            progress.push_error(CrawlErrorKind::Status, None, format!("e{i}"));
        }
        let recent = progress.recent_errors(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].message, "e7");
        assert_eq!(recent[2].message, "e9");
    }
}

//! Per-series reception statistics, recomputed wholesale from all reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReceptionError;
use crate::themes::{extract_themes, ThemeCount, COMPLAINT_THEMES, PRAISE_THEMES};

/// Sentiment-score cutoffs used when classifying reviews for the ratio.
const RATIO_POSITIVE_CUTOFF: f64 = 0.2;
const RATIO_NEGATIVE_CUTOFF: f64 = -0.2;

/// The per-review inputs the aggregator needs, detached from any storage row.
#[derive(Debug, Clone)]
pub struct ReviewSample {
    /// Reviewer's numeric score, if one was given.
    pub score: Option<f64>,
    /// Full review text.
    pub text: String,
    /// Stored text length (0 when the text was missing at ingest time).
    pub text_length: i32,
    /// Sentiment score assigned at ingest time, in [-1.0, 1.0].
    pub sentiment_score: f64,
    pub is_preliminary: bool,
}

/// Denormalized reception summary for one series.
///
/// Persisted wholesale as JSONB on the series row; `last_analyzed` drives
/// the 7-day staleness rule applied by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceptionProfile {
    pub review_count: u64,
    pub mean_score: Option<f64>,
    pub score_variance: Option<f64>,
    pub sentiment_ratio: f64,
    pub preliminary_count: u64,
    pub avg_review_length: f64,
    pub top_complaints: Vec<ThemeCount>,
    pub top_praises: Vec<ThemeCount>,
    pub last_analyzed: DateTime<Utc>,
}

/// Recompute a series' reception profile from all of its reviews.
///
/// Mean and variance are computed over reviews that carry a numeric score
/// (population variance: mean of squared deviations). The sentiment ratio
/// divides positively-classified reviews (sentiment score > 0.2) by
/// negatively-classified ones (< −0.2), with the denominator floored at 1
/// so a series with no negative reviews reports its positive count rather
/// than infinity. Themes are extracted from the combined lowercased corpus
/// of all review texts.
///
/// # Errors
///
/// Returns [`ReceptionError::NoReviews`] when `reviews` is empty.
pub fn compute_profile(reviews: &[ReviewSample]) -> Result<ReceptionProfile, ReceptionError> {
    if reviews.is_empty() {
        return Err(ReceptionError::NoReviews);
    }

    let scores: Vec<f64> = reviews.iter().filter_map(|r| r.score).collect();
    let (mean_score, score_variance) = mean_and_variance(&scores);

    let positives = reviews
        .iter()
        .filter(|r| r.sentiment_score > RATIO_POSITIVE_CUTOFF)
        .count();
    let negatives = reviews
        .iter()
        .filter(|r| r.sentiment_score < RATIO_NEGATIVE_CUTOFF)
        .count();
    #[allow(clippy::cast_precision_loss)]
    let sentiment_ratio = positives as f64 / negatives.max(1) as f64;

    let preliminary_count = reviews.iter().filter(|r| r.is_preliminary).count() as u64;

    #[allow(clippy::cast_precision_loss)]
    let avg_review_length = reviews
        .iter()
        .map(|r| f64::from(r.text_length.max(0)))
        .sum::<f64>()
        / reviews.len() as f64;

    let corpus = reviews
        .iter()
        .map(|r| r.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let top_complaints = extract_themes(&corpus, COMPLAINT_THEMES);
    let top_praises = extract_themes(&corpus, PRAISE_THEMES);

    Ok(ReceptionProfile {
        review_count: reviews.len() as u64,
        mean_score,
        score_variance,
        sentiment_ratio,
        preliminary_count,
        avg_review_length,
        top_complaints,
        top_praises,
        last_analyzed: Utc::now(),
    })
}

/// Population mean and variance; `(None, None)` when no scores exist.
fn mean_and_variance(scores: &[f64]) -> (Option<f64>, Option<f64>) {
    if scores.is_empty() {
        return (None, None);
    }
    #[allow(clippy::cast_precision_loss)]
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (Some(mean), Some(variance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: Option<f64>, sentiment_score: f64, text: &str) -> ReviewSample {
        ReviewSample {
            score,
            text: text.to_string(),
            text_length: i32::try_from(text.len()).unwrap_or(0),
            sentiment_score,
            is_preliminary: false,
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = compute_profile(&[]);
        assert!(matches!(result, Err(ReceptionError::NoReviews)));
    }

    #[test]
    fn variance_is_population_variance() {
        let reviews = vec![
            sample(Some(8.0), 0.5, "solid"),
            sample(Some(9.0), 0.5, "great"),
            sample(Some(4.0), -0.5, "weak"),
        ];
        let profile = compute_profile(&reviews).unwrap();
        let mean = profile.mean_score.unwrap();
        let variance = profile.score_variance.unwrap();
        assert!((mean - 7.0).abs() < 1e-9, "mean was {mean}");
        // ((1)^2 + (2)^2 + (-3)^2) / 3 = 14/3
        assert!((variance - 14.0 / 3.0).abs() < 1e-9, "variance was {variance}");
    }

    #[test]
    fn zero_negative_reviews_floor_the_denominator() {
        let reviews = vec![
            sample(Some(9.0), 0.5, "a"),
            sample(Some(8.0), 0.6, "b"),
            sample(Some(7.0), 0.3, "c"),
        ];
        let profile = compute_profile(&reviews).unwrap();
        assert!((profile.sentiment_ratio - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_counts_only_past_the_cutoffs() {
        // 0.1 and -0.1 fall inside the neutral band and count for neither side.
        let reviews = vec![
            sample(None, 0.5, "a"),
            sample(None, 0.1, "b"),
            sample(None, -0.1, "c"),
            sample(None, -0.5, "d"),
        ];
        let profile = compute_profile(&reviews).unwrap();
        assert!((profile.sentiment_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_scores_are_excluded_from_variance() {
        let reviews = vec![
            sample(Some(6.0), 0.0, "a"),
            sample(None, 0.0, "b"),
            sample(Some(6.0), 0.0, "c"),
        ];
        let profile = compute_profile(&reviews).unwrap();
        assert_eq!(profile.mean_score, Some(6.0));
        assert_eq!(profile.score_variance, Some(0.0));
        assert_eq!(profile.review_count, 3);
    }

    #[test]
    fn no_scores_at_all_yields_none() {
        let reviews = vec![sample(None, 0.0, "a"), sample(None, 0.0, "b")];
        let profile = compute_profile(&reviews).unwrap();
        assert_eq!(profile.mean_score, None);
        assert_eq!(profile.score_variance, None);
    }

    #[test]
    fn preliminary_reviews_are_counted() {
        let mut reviews = vec![sample(Some(7.0), 0.0, "a"), sample(Some(8.0), 0.0, "b")];
        reviews[1].is_preliminary = true;
        let profile = compute_profile(&reviews).unwrap();
        assert_eq!(profile.preliminary_count, 1);
    }

    #[test]
    fn avg_review_length_uses_stored_lengths() {
        let mut reviews = vec![sample(Some(7.0), 0.0, "abcd"), sample(Some(8.0), 0.0, "ab")];
        reviews[0].text_length = 100;
        reviews[1].text_length = 50;
        let profile = compute_profile(&reviews).unwrap();
        assert!((profile.avg_review_length - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn themes_come_from_the_combined_corpus() {
        let reviews = vec![
            sample(Some(9.0), 0.8, "The world building is incredible."),
            sample(Some(3.0), -0.6, "Too many plot holes and the slow pacing drags."),
        ];
        let profile = compute_profile(&reviews).unwrap();
        assert!(profile.top_praises.iter().any(|t| t.theme == "world building"));
        assert!(profile.top_complaints.iter().any(|t| t.theme == "plot holes"));
        assert!(profile.top_complaints.iter().any(|t| t.theme == "slow pacing"));
    }

    #[test]
    fn profile_round_trips_through_json() {
        let reviews = vec![sample(Some(7.5), 0.4, "good stuff")];
        let profile = compute_profile(&reviews).unwrap();
        let value = serde_json::to_value(&profile).unwrap();
        let back: ReceptionProfile = serde_json::from_value(value).unwrap();
        assert_eq!(back.review_count, 1);
        assert_eq!(back.last_analyzed, profile.last_analyzed);
    }
}

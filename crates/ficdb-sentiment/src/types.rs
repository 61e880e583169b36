use serde::{Deserialize, Serialize};

/// Classification of a single review text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one review text.
///
/// `score` is the mean contribution of sentiment-bearing words, clamped to
/// `[-1.0, 1.0]`. `confidence` reflects the density of sentiment words in
/// the text, in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    pub score: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl SentimentResult {
    pub(crate) const NEUTRAL: SentimentResult = SentimentResult {
        score: 0.0,
        label: SentimentLabel::Neutral,
        confidence: 0.0,
    };
}

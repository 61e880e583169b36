//! Deterministic, rule-based sentiment classification of review text.

use crate::lexicon::{is_intensifier, is_negative, is_negator, is_positive};
use crate::types::{SentimentLabel, SentimentResult};

/// Minimum text length (in characters) before any scoring is attempted.
const MIN_TEXT_CHARS: usize = 10;

/// Multiplier applied when the preceding word is an intensifier.
const INTENSIFIER_FACTOR: f64 = 1.5;

/// Label cutoffs on the normalized score.
const POSITIVE_THRESHOLD: f64 = 0.3;
const NEGATIVE_THRESHOLD: f64 = -0.3;

/// Classify the sentiment of a review text.
///
/// Pure and deterministic: identical input always yields identical output.
///
/// Texts shorter than 10 characters score neutral with zero confidence.
/// Otherwise the text is split into sentences and lowercased words; each
/// word in the positive lexicon contributes +1 and each in the negative
/// lexicon −1. The immediately preceding word (within the same sentence)
/// modifies the contribution: a negator flips the sign first, then an
/// intensifier scales by 1.5. The final score is the mean contribution over
/// sentiment-bearing words, clamped to `[-1.0, 1.0]`; confidence is the
/// share of sentiment words relative to a tenth of the total word count,
/// clamped to `[0.1, 1.0]`.
#[must_use]
pub fn analyze(text: &str) -> SentimentResult {
    if text.chars().count() < MIN_TEXT_CHARS {
        return SentimentResult::NEUTRAL;
    }

    let mut total = 0.0_f64;
    let mut sentiment_words = 0usize;
    let mut total_words = 0usize;

    for sentence in text.split(['.', '!', '?']) {
        let words: Vec<String> = sentence
            .split_whitespace()
            .map(normalize_word)
            .filter(|w| !w.is_empty())
            .collect();
        total_words += words.len();

        for (i, word) in words.iter().enumerate() {
            let base = if is_positive(word) {
                1.0
            } else if is_negative(word) {
                -1.0
            } else {
                continue;
            };

            let mut contribution = base;
            if i > 0 {
                let prev = words[i - 1].as_str();
                // Flip-then-scale: negation acts on the raw sign, the
                // intensifier multiplies whatever sign results.
                if is_negator(prev) {
                    contribution = -contribution;
                }
                if is_intensifier(prev) {
                    contribution *= INTENSIFIER_FACTOR;
                }
            }

            total += contribution;
            sentiment_words += 1;
        }
    }

    if sentiment_words == 0 {
        return SentimentResult {
            score: 0.0,
            label: SentimentLabel::Neutral,
            confidence: 0.1,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let score = (total / sentiment_words as f64).clamp(-1.0, 1.0);
    #[allow(clippy::cast_precision_loss)]
    let confidence = (sentiment_words as f64 / (total_words as f64 * 0.1)).clamp(0.1, 1.0);

    let label = if score > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    SentimentResult {
        score,
        label,
        confidence,
    }
}

/// Lowercase a token and trim surrounding punctuation, keeping inner
/// apostrophes so contractions like "isn't" survive as negators.
fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .trim_matches('\'')
        .to_lowercase()
}

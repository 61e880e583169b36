//! Fixed lexicons for the rule-based analyzer.
//!
//! Words are lowercase and matched after punctuation trimming. Each match
//! contributes ±1 to the raw sentiment total; modifiers act on the
//! immediately preceding word only.

pub(crate) const POSITIVE_WORDS: &[&str] = &[
    "amazing",
    "addictive",
    "beautiful",
    "best",
    "brilliant",
    "captivating",
    "clever",
    "compelling",
    "delightful",
    "engaging",
    "enjoyable",
    "epic",
    "excellent",
    "fantastic",
    "favorite",
    "fresh",
    "fun",
    "good",
    "great",
    "gripping",
    "heartwarming",
    "hilarious",
    "immersive",
    "incredible",
    "love",
    "loved",
    "masterpiece",
    "memorable",
    "original",
    "polished",
    "refreshing",
    "satisfying",
    "solid",
    "superb",
    "unique",
    "witty",
    "wonderful",
];

pub(crate) const NEGATIVE_WORDS: &[&str] = &[
    "annoying",
    "awful",
    "bad",
    "bland",
    "boring",
    "cliche",
    "confusing",
    "cringe",
    "disappointing",
    "dreadful",
    "dropped",
    "dull",
    "forgettable",
    "frustrating",
    "generic",
    "hate",
    "hated",
    "inconsistent",
    "lazy",
    "mediocre",
    "messy",
    "pretentious",
    "predictable",
    "repetitive",
    "rushed",
    "shallow",
    "slow",
    "stale",
    "tedious",
    "terrible",
    "unreadable",
    "weak",
    "worst",
];

/// Preceding-word modifiers that scale the contribution by 1.5.
pub(crate) const INTENSIFIERS: &[&str] = &[
    "very",
    "extremely",
    "really",
    "incredibly",
    "absolutely",
    "truly",
    "so",
];

/// Preceding-word modifiers that flip the contribution's sign.
pub(crate) const NEGATORS: &[&str] = &[
    "not", "never", "no", "hardly", "barely", "isn't", "isnt", "wasn't", "wasnt", "don't", "dont",
    "didn't", "didnt", "can't", "cant",
];

pub(crate) fn is_positive(word: &str) -> bool {
    POSITIVE_WORDS.contains(&word)
}

pub(crate) fn is_negative(word: &str) -> bool {
    NEGATIVE_WORDS.contains(&word)
}

pub(crate) fn is_intensifier(word: &str) -> bool {
    INTENSIFIERS.contains(&word)
}

pub(crate) fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word)
}

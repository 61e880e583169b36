//! Recurring-theme extraction over a series' combined review corpus.
//!
//! Each candidate phrase is matched against several surface variants —
//! exact ("slow pacing"), no-space ("slowpacing"), hyphenated
//! ("slow-pacing"), and loosely joined ("slow ... pacing") — with word
//! boundaries anchored on both sides. A theme counts as found if any
//! variant matches; occurrences are then counted over the whole corpus.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of themes reported per direction (complaints/praises).
pub(crate) const TOP_THEMES: usize = 5;

/// Complaint phrases commonly raised in serial-fiction reviews.
pub(crate) const COMPLAINT_THEMES: &[&str] = &[
    "slow pacing",
    "plot holes",
    "grammar errors",
    "flat characters",
    "info dumps",
    "rushed ending",
    "filler chapters",
    "power creep",
    "dropped plot lines",
    "inconsistent updates",
    "wish fulfillment",
    "head hopping",
];

/// Praise phrases commonly raised in serial-fiction reviews.
pub(crate) const PRAISE_THEMES: &[&str] = &[
    "world building",
    "character development",
    "plot twists",
    "magic system",
    "power system",
    "fight scenes",
    "slow burn",
    "found family",
    "comedic timing",
    "emotional depth",
    "tight prose",
    "satisfying payoff",
];

/// One extracted theme with its raw occurrence count in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: u64,
}

/// Extract the top themes from a lowercased corpus, in descending count
/// order with ties broken by position in `candidates`.
pub(crate) fn extract_themes(corpus: &str, candidates: &[&str]) -> Vec<ThemeCount> {
    let mut found: Vec<ThemeCount> = Vec::new();

    for phrase in candidates {
        let Some(re) = phrase_regex(phrase) else {
            tracing::warn!(phrase, "unbuildable theme pattern — skipping");
            continue;
        };
        let count = re.find_iter(corpus).count() as u64;
        if count > 0 {
            found.push(ThemeCount {
                theme: (*phrase).to_string(),
                count,
            });
        }
    }

    // Stable sort keeps candidate-list order among equal counts.
    found.sort_by_key(|t| std::cmp::Reverse(t.count));
    found.truncate(TOP_THEMES);
    found
}

/// Build the boundary-anchored variant pattern for one theme phrase.
fn phrase_regex(phrase: &str) -> Option<Regex> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }

    let pattern = if words.len() == 1 {
        format!(r"\b{}\b", words[0])
    } else {
        let exact = words.join(" ");
        let no_space = words.join("");
        let hyphenated = words.join("-");
        let joined = words.join(r"\W{1,3}");
        format!(r"\b(?:{exact}|{no_space}|{hyphenated}|{joined})\b")
    };

    Regex::new(&pattern).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_phrase_is_found() {
        let themes = extract_themes("the slow pacing ruined it for me", COMPLAINT_THEMES);
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].theme, "slow pacing");
        assert_eq!(themes[0].count, 1);
    }

    #[test]
    fn no_space_variant_is_found() {
        let themes = extract_themes("incredible worldbuilding in this one", PRAISE_THEMES);
        assert!(themes.iter().any(|t| t.theme == "world building"));
    }

    #[test]
    fn hyphenated_variant_is_found() {
        let themes = extract_themes("classic slow-pacing complaints apply", COMPLAINT_THEMES);
        assert!(themes.iter().any(|t| t.theme == "slow pacing"));
    }

    #[test]
    fn boundary_anchoring_rejects_substrings() {
        // "plot holes" must not match inside unrelated longer words.
        let themes = extract_themes("the plotholesque style is intentional", COMPLAINT_THEMES);
        assert!(themes.is_empty(), "got: {themes:?}");
    }

    #[test]
    fn occurrences_are_counted_across_the_corpus() {
        let corpus = "plot holes everywhere. more plot holes in book two. plot holes again";
        let themes = extract_themes(corpus, COMPLAINT_THEMES);
        assert_eq!(themes[0].theme, "plot holes");
        assert_eq!(themes[0].count, 3);
    }

    #[test]
    fn results_are_sorted_by_count_then_list_order() {
        let corpus = "world building world building plot twists magic system magic system";
        let themes = extract_themes(corpus, PRAISE_THEMES);
        assert_eq!(themes[0].theme, "world building");
        assert_eq!(themes[0].count, 2);
        // magic system also has 2 but appears later in the candidate list.
        assert_eq!(themes[1].theme, "magic system");
        assert_eq!(themes[2].theme, "plot twists");
    }

    #[test]
    fn at_most_five_themes_returned() {
        let corpus = "slow pacing plot holes grammar errors flat characters \
                      info dumps rushed ending filler chapters";
        let themes = extract_themes(corpus, COMPLAINT_THEMES);
        assert_eq!(themes.len(), TOP_THEMES);
    }

    #[test]
    fn empty_corpus_yields_nothing() {
        assert!(extract_themes("", COMPLAINT_THEMES).is_empty());
    }
}

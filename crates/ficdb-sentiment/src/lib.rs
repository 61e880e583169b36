//! Rule-based sentiment analysis and reception aggregation for FICDB.
//!
//! Scores review text against fixed positive/negative lexicons with simple
//! negation and intensifier rules, and folds per-review results into a
//! denormalized per-series reception profile (score variance, sentiment
//! ratio, recurring complaint/praise themes).

pub mod analyzer;
pub mod error;
pub mod reception;
pub mod themes;
pub mod types;

mod lexicon;

pub use analyzer::analyze;
pub use error::ReceptionError;
pub use reception::{compute_profile, ReceptionProfile, ReviewSample};
pub use themes::ThemeCount;
pub use types::{SentimentLabel, SentimentResult};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceptionError {
    #[error("no reviews available to aggregate")]
    NoReviews,
}

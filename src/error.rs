use thiserror::Error;

/// Why a set of field values cannot become a meal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("meal name must not be empty")]
    EmptyName,

    #[error("rating must not be negative (got {0})")]
    NegativeRating(i64),

    #[error("rating {rating} exceeds the maximum of {max}")]
    RatingTooHigh { rating: i64, max: i64 },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed meal data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported archive version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("photo payload is not valid base64")]
    Photo,

    #[error("meal #{index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: ValidationError },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no meal archive found")]
    Missing,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("reading meal archive failed: {0:#}")]
    Io(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("encoding meal archive failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("writing meal archive failed after {attempts} attempt(s): {cause:#}")]
    Io { attempts: u32, cause: anyhow::Error },

    #[error("save queue is closed")]
    QueueClosed,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index {index} out of range for {len} meal(s)")]
    IndexOutOfRange { index: usize, len: usize },
}

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_ARCHIVE_PATH: &str = "meals.json";
pub const DEFAULT_MAX_RATING: i64 = 5;
pub const DEFAULT_SAVE_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Where the whole meal collection is archived.
    pub archive_path: PathBuf,
    /// Upper bound enforced by the edit form. The record itself only requires `rating >= 0`.
    #[serde(default = "default_max_rating")]
    pub max_rating: Option<i64>,
    /// Total write attempts for a single save, first try included.
    #[serde(default = "default_save_attempts")]
    pub save_attempts: u32,
}

fn default_max_rating() -> Option<i64> {
    Some(DEFAULT_MAX_RATING)
}

fn default_save_attempts() -> u32 {
    DEFAULT_SAVE_ATTEMPTS
}

impl StoreConfig {
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            max_rating: Some(DEFAULT_MAX_RATING),
            save_attempts: DEFAULT_SAVE_ATTEMPTS,
        }
    }

    pub fn with_max_rating(mut self, max_rating: Option<i64>) -> Self {
        self.max_rating = max_rating;
        self
    }

    pub fn with_save_attempts(mut self, attempts: u32) -> Self {
        self.save_attempts = attempts.max(1);
        self
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let archive_path = std::env::var("FOODTRACKER_ARCHIVE_PATH")
            .unwrap_or_else(|_| DEFAULT_ARCHIVE_PATH.into());
        let max_rating = match std::env::var("FOODTRACKER_MAX_RATING") {
            Ok(v) if v.eq_ignore_ascii_case("none") => None,
            Ok(v) => {
                let max = v.parse::<i64>()?;
                anyhow::ensure!(max >= 0, "FOODTRACKER_MAX_RATING must not be negative (got {max})");
                Some(max)
            }
            Err(_) => Some(DEFAULT_MAX_RATING),
        };
        let save_attempts = std::env::var("FOODTRACKER_SAVE_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_SAVE_ATTEMPTS);

        Ok(Self::new(archive_path)
            .with_max_rating(max_rating)
            .with_save_attempts(save_attempts))
    }
}

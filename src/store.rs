use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::config::StoreConfig;
use crate::error::{LoadError, SaveError, StoreError};
use crate::meals::{codec, samples, Meal, MealDraft};
use crate::persist::ArchiveWriter;
use crate::state::AppState;
use crate::storage::ArchiveBackend;

const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Which row an edited meal goes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Archive,
    Samples,
}

/// Owns the ordered meal collection. Mutations only touch memory; call
/// [`MealStore::save_all`] afterwards to persist the whole collection.
pub struct MealStore {
    meals: Vec<Meal>,
    config: Arc<StoreConfig>,
    archive: Arc<dyn ArchiveBackend>,
    writer: Arc<ArchiveWriter>,
}

impl MealStore {
    pub fn new(state: &AppState) -> Self {
        Self {
            meals: Vec::new(),
            config: state.config.clone(),
            archive: state.archive.clone(),
            writer: Arc::new(ArchiveWriter::new(
                state.archive.clone(),
                state.config.save_attempts,
            )),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The single writer shared by `save_all` and any attached `SaveQueue`.
    pub fn writer(&self) -> Arc<ArchiveWriter> {
        self.writer.clone()
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Meal> {
        self.meals.get(index)
    }

    /// Appends `meal` and returns its index.
    pub fn insert(&mut self, meal: Meal) -> usize {
        self.meals.push(meal);
        self.meals.len() - 1
    }

    /// Overwrites the meal at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, meal: Meal) -> Result<Meal, StoreError> {
        let len = self.meals.len();
        let slot = self.meals.get_mut(index).ok_or_else(|| {
            warn!(index, len, "replace with stale index");
            StoreError::IndexOutOfRange { index, len }
        })?;
        Ok(std::mem::replace(slot, meal))
    }

    /// Removes the meal at `index`; later meals shift down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<Meal, StoreError> {
        let len = self.meals.len();
        if index >= len {
            warn!(index, len, "remove with stale index");
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        Ok(self.meals.remove(index))
    }

    pub fn apply_edit(&mut self, target: EditTarget, meal: Meal) -> Result<usize, StoreError> {
        match target {
            EditTarget::New => Ok(self.insert(meal)),
            EditTarget::Existing(index) => self.replace(index, meal).map(|_| index),
        }
    }

    /// Form state for adding a meal or editing the one at `index`, carrying
    /// the configured rating cap.
    pub fn draft(&self, target: EditTarget) -> Result<MealDraft, StoreError> {
        let max_rating = self.config.max_rating;
        match target {
            EditTarget::New => Ok(MealDraft::new(max_rating)),
            EditTarget::Existing(index) => self
                .meals
                .get(index)
                .map(|m| MealDraft::from_meal(m, max_rating))
                .ok_or(StoreError::IndexOutOfRange {
                    index,
                    len: self.meals.len(),
                }),
        }
    }

    /// Replaces the whole in-memory collection.
    pub fn reset(&mut self, meals: Vec<Meal>) {
        self.meals = meals;
    }

    #[instrument(skip(self), fields(archive = %self.archive.describe()))]
    pub async fn load_all(&self) -> Result<Vec<Meal>, LoadError> {
        let raw = self
            .archive
            .read()
            .await
            .map_err(LoadError::Io)?
            .ok_or(LoadError::Missing)?;
        let meals = codec::decode_archive(&raw)?;
        info!(count = meals.len(), "meals loaded");
        Ok(meals)
    }

    /// Startup path: saved meals if they load, otherwise the built-in samples.
    pub async fn load_or_samples(&mut self) -> LoadSource {
        match self.load_all().await {
            Ok(meals) => {
                self.meals = meals;
                LoadSource::Archive
            }
            Err(e) => {
                warn!(error = %e, "using sample meals");
                self.meals = samples::sample_meals();
                LoadSource::Samples
            }
        }
    }

    #[instrument(skip(self), fields(archive = %self.archive.describe(), count = self.meals.len()))]
    pub async fn save_all(&self) -> Result<(), SaveError> {
        let snapshot = self.writer.snapshot(self.meals.clone());
        self.writer.write(snapshot).await
    }
}

/// Encodes `meals` and writes them, retrying I/O failures up to `attempts` times in total.
pub(crate) async fn write_snapshot(
    archive: &dyn ArchiveBackend,
    meals: &[Meal],
    attempts: u32,
) -> Result<(), SaveError> {
    let body = codec::encode_archive(meals)?;
    let attempts = attempts.max(1);

    let mut attempt = 1;
    loop {
        match archive.write(body.clone()).await {
            Ok(()) => {
                info!(count = meals.len(), attempt, "meals saved");
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                warn!(error = %e, attempt, "saving meals failed; retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => {
                error!(error = %e, attempts, "saving meals failed; changes may be lost");
                return Err(SaveError::Io { attempts, cause: e });
            }
        }
    }
}

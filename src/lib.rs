//! Meal journal core: validated meal records, an ordered in-memory
//! collection, and whole-collection persistence to a single archive.

pub mod config;
pub mod error;
pub mod meals;
pub mod persist;
pub mod rating;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use config::StoreConfig;
pub use error::{DecodeError, LoadError, SaveError, StoreError, ValidationError};
pub use meals::{Meal, MealDraft};
pub use persist::{ArchiveWriter, SaveQueue, SaveTicket};
pub use rating::StarRating;
pub use state::AppState;
pub use storage::{ArchiveBackend, FileArchive, MemoryArchive};
pub use store::{EditTarget, LoadSource, MealStore};

use crate::config::StoreConfig;
use crate::storage::{ArchiveBackend, FileArchive, MemoryArchive};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StoreConfig>,
    pub archive: Arc<dyn ArchiveBackend>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = StoreConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    /// File-backed state for an explicit configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let archive = Arc::new(FileArchive::new(config.archive_path.clone())) as Arc<dyn ArchiveBackend>;
        Self {
            config: Arc::new(config),
            archive,
        }
    }

    pub fn from_parts(config: Arc<StoreConfig>, archive: Arc<dyn ArchiveBackend>) -> Self {
        Self { config, archive }
    }

    pub fn fake() -> Self {
        let config = Arc::new(StoreConfig::new("memory://meals"));
        let archive = Arc::new(MemoryArchive::new()) as Arc<dyn ArchiveBackend>;
        Self { config, archive }
    }
}

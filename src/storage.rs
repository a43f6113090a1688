use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Where the meal archive lives. One backend holds exactly one archive.
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn read(&self) -> anyhow::Result<Option<Bytes>>;
    /// Replaces the archive. A failed write must leave the previous one intact.
    async fn write(&self, body: Bytes) -> anyhow::Result<()>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileArchive {
    path: PathBuf,
}

impl FileArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "meals".into());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}

async fn write_synced(path: &Path, body: &[u8]) -> anyhow::Result<()> {
    let mut file = fs::File::create(path)
        .await
        .with_context(|| format!("create {}", path.display()))?;
    file.write_all(body)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    file.sync_all()
        .await
        .with_context(|| format!("sync {}", path.display()))?;
    Ok(())
}

/// Makes the rename itself durable.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    fs::File::open(dir)
        .await
        .with_context(|| format!("open dir {}", dir.display()))?
        .sync_all()
        .await
        .with_context(|| format!("sync dir {}", dir.display()))?;
    Ok(())
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

#[async_trait]
impl ArchiveBackend for FileArchive {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> anyhow::Result<Option<Bytes>> {
        match fs::read(&self.path).await {
            Ok(raw) => Ok(Some(Bytes::from(raw))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }

    #[instrument(skip(self, body), fields(path = %self.path.display(), len = body.len()))]
    async fn write(&self, body: Bytes) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create dir {}", dir.display()))?;
        }

        let tmp = self.temp_path();
        let result = match write_synced(&tmp, &body).await {
            Ok(()) => fs::rename(&tmp, &self.path)
                .await
                .with_context(|| format!("rename {} -> {}", tmp.display(), self.path.display())),
            Err(e) => Err(e),
        };
        if result.is_err() {
            // leftover temp file is harmless but noisy
            let _ = fs::remove_file(&tmp).await;
        }
        result?;
        sync_parent_dir(&self.path).await?;

        debug!("archive replaced");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Keeps the archive in memory. Used by tests and previews.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    body: Mutex<Option<Bytes>>,
    writes: Mutex<usize>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(body: impl Into<Bytes>) -> Self {
        Self {
            body: Mutex::new(Some(body.into())),
            writes: Mutex::new(0),
        }
    }

    pub async fn contents(&self) -> Option<Bytes> {
        self.body.lock().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl ArchiveBackend for MemoryArchive {
    async fn read(&self) -> anyhow::Result<Option<Bytes>> {
        Ok(self.body.lock().await.clone())
    }

    async fn write(&self, body: Bytes) -> anyhow::Result<()> {
        *self.body.lock().await = Some(body);
        *self.writes.lock().await += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

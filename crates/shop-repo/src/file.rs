use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shop_types::domain::entity::Entity;
use shop_types::ports::repository::{EntityStore, StoreError};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// A flat JSON file holding one serialized container, rewritten in full on
/// every save. All access through one instance is serialized.
pub struct JsonFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create the file holding `[]` when it is absent. Existing content is
    /// left untouched.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;
        match created {
            Ok(mut file) => {
                file.write_all(b"[]").await?;
                file.flush().await?;
                tracing::debug!(path = %self.path.display(), "created empty store file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace `target` with the file content. A missing or blank file
    /// yields `T::default()`.
    pub async fn load_into<T>(&self, target: &mut T) -> Result<(), StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let _guard = self.lock.lock().await;

        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                *target = T::default();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            *target = T::default();
            return Ok(());
        }

        *target = serde_json::from_slice(&data)?;
        Ok(())
    }

    /// Write `value` pretty-printed. The bytes land in a sibling temp file,
    /// are flushed to disk, and only then renamed over the target.
    pub async fn save<T>(&self, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let _guard = self.lock.lock().await;

        let data = serde_json::to_vec_pretty(value)?;
        let tmp = self.tmp_path();
        let written = match write_synced(&tmp, &data).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl<E: Entity> EntityStore<E> for JsonFile {
    async fn prepare(&self) -> Result<(), StoreError> {
        self.ensure_exists().await
    }

    async fn load(&self) -> Result<Vec<E>, StoreError> {
        let mut items = Vec::new();
        self.load_into(&mut items).await?;
        Ok(items)
    }

    async fn save(&self, items: &[E]) -> Result<(), StoreError> {
        JsonFile::save(self, items).await
    }
}

//! File-backed key/value store
//!
//! Directory layout:
//! ```text
//! <base_dir>/
//! ├── policy/
//! │   ├── <base64url(key)>.json
//! │   └── ...
//! └── protected_data/
//!     └── ...
//! ```
//!
//! Every write lands in a temp file first. `put` renames it over the target
//! (atomic replace, last writer wins); `insert` hard-links it to the target,
//! which fails if the target already exists.

use super::{validate_key, Entry, KeyValueStore, StoreError, StoreProvider};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Keys longer than this would overflow common file name limits once encoded
const MAX_KEY_LEN: usize = 180;

const TEMP_PREFIX: &str = ".tmp-";
const EXTENSION: &str = "json";

/// Store persisting one file per key under a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub async fn open(dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Directory holding this store's files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        if key.len() > MAX_KEY_LEN {
            return Err(StoreError::InvalidKey(format!(
                "key exceeds {} bytes",
                MAX_KEY_LEN
            )));
        }
        let name = format!("{}.{}", URL_SAFE_NO_PAD.encode(key.as_bytes()), EXTENSION);
        Ok(self.dir.join(name))
    }

    /// Write `value` to a fresh temp file in the store directory
    async fn write_temp(&self, value: &[u8]) -> Result<PathBuf, StoreError> {
        let tmp = self
            .dir
            .join(format!("{}{}", TEMP_PREFIX, uuid::Uuid::new_v4()));
        let mut file = tokio::fs::File::create(&tmp).await?;
        let written = async {
            file.write_all(value).await?;
            file.sync_all().await
        }
        .await;
        if let Err(e) = written {
            remove_quietly(&tmp).await;
            return Err(e.into());
        }
        Ok(tmp)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self.write_temp(&value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            remove_quietly(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self.write_temp(&value).await?;
        let linked = tokio::fs::hard_link(&tmp, &path).await;
        remove_quietly(&tmp).await;
        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<Entry>, StoreError> {
        let mut found = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            let Some(key) = decode_file_name(&path) else {
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            match tokio::fs::read(&path).await {
                Ok(value) => found.push(Entry { key, value }),
                // Raced with a concurrent replace; the rename target is read next scan
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        found.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(found)
    }
}

/// Recover the key from a store file name, skipping temp and foreign files
fn decode_file_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with(TEMP_PREFIX) {
        return None;
    }
    match URL_SAFE_NO_PAD
        .decode(stem)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(key) => Some(key),
        None => {
            tracing::warn!("Skipping unrecognized store file {}", path.display());
            None
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }
}

/// Provider opening one [`FileStore`] directory per store name
pub struct FileStoreProvider {
    base_dir: PathBuf,
}

impl FileStoreProvider {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Default base directory (~/.gatekeeper/data/)
    pub fn default_dir() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gatekeeper")
            .join("data")
    }
}

#[async_trait]
impl StoreProvider for FileStoreProvider {
    async fn open_store(&self, name: &str) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(format!(
                "invalid store name '{}'",
                name
            )));
        }
        let store = FileStore::open(self.base_dir.join(name)).await?;
        Ok(Arc::new(store))
    }
}

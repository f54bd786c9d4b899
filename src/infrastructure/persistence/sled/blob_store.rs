//! Sled-based Blob Store Implementation

use sled::Db;
use std::path::Path;

use crate::application::ports::{BlobStorePort, StoreError};

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/vellum.sled".to_string(),
        }
    }
}

/// Sled 键值文本存储
///
/// 每次 put 都同步 flush, 返回即落盘
pub struct SledBlobStore {
    db: Db,
}

impl SledBlobStore {
    /// 创建新的存储实例
    pub fn new(config: &SledStoreConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.db_path).map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!(db_path = %config.db_path, "SledBlobStore initialized");

        Ok(Self { db })
    }

    /// 打开指定路径的存储
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let config = SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }
}

impl BlobStorePort for SledBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| StoreError::Utf8(e.to_string()))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SledBlobStore) {
        let dir = TempDir::new().unwrap();
        let store = SledBlobStore::open(dir.path().join("test.sled")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_key_is_none() {
        let (_dir, store) = temp_store();
        assert!(store.get("absent").unwrap().is_none());
    }

    #[test]
    fn test_put_get_round_trip() {
        let (_dir, store) = temp_store();
        store.put("novels", r#"[{"title":"Draft"}]"#).unwrap();
        assert_eq!(
            store.get("novels").unwrap().as_deref(),
            Some(r#"[{"title":"Draft"}]"#)
        );
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (_dir, store) = temp_store();
        store.put("k", "old").unwrap();
        store.put("k", "new").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.sled");
        {
            let store = SledBlobStore::open(&path).unwrap();
            store.put("k", "persisted").unwrap();
        }
        let store = SledBlobStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("persisted"));
    }
}
